use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use depot_rebalancer::{
    config::RebalanceConfig,
    oracle::{FxRate, QuoteSheet},
    portfolio::{PortfolioState, Snapshot},
    schedule::MonthlyPlan,
    store::{CsvHoldingStore, HoldingStore},
};
use directories::ProjectDirs;
use tabled::{Table, Tabled, settings::Style};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Command;

mod cli;

#[derive(Tabled)]
struct HoldingRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Sector")]
    sector: String,
    #[tabled(rename = "Shares")]
    shares: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Price (EUR)")]
    price: String,
    #[tabled(rename = "Market value")]
    market_value: String,
}

#[derive(Tabled)]
struct SectorRow {
    #[tabled(rename = "Sector")]
    sector: String,
    #[tabled(rename = "Market value")]
    market_value: String,
    #[tabled(rename = "Share")]
    percent: String,
}

struct Paths {
    holdings: PathBuf,
    config: Option<PathBuf>,
    plan: PathBuf,
}

impl Paths {
    fn resolve(opts: &cli::Cli) -> anyhow::Result<Self> {
        let dirs = ProjectDirs::from("org", "quotidian", "depot-rebalancer");
        let default_in = |dir: Option<&Path>, file: &str| {
            dir.map(|d| d.join(file))
                .ok_or_else(|| anyhow::anyhow!("Failed to get default path for {file}"))
        };
        let holdings = match &opts.holdings {
            Some(p) => p.clone(),
            None => default_in(dirs.as_ref().map(|d| d.data_dir()), "depot_data.csv")?,
        };
        let plan = match &opts.plan {
            Some(p) => p.clone(),
            None => default_in(dirs.as_ref().map(|d| d.data_dir()), "plan.yml")?,
        };
        let config = opts.config.clone().or_else(|| {
            dirs.as_ref()
                .map(|d| d.config_dir().join("rebalance.yml"))
                .filter(|p| p.exists())
        });
        Ok(Self {
            holdings,
            config,
            plan,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let opts = cli::Cli::parse();
    let paths = Paths::resolve(&opts)?;
    let store = CsvHoldingStore::new(&paths.holdings);

    match opts.command {
        Command::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut cli::Cli::command(),
                "depot-rebalancer",
                &mut std::io::stdout(),
            );
        }
        Command::SetShares { ticker, shares } => {
            let mut state = load_state(&store)?;
            state.set_shares(&ticker, shares)?;
            store
                .save(state.holdings())
                .with_context(|| format!("Failed to save holdings to {:?}", store.path()))?;
            println!("{ticker}: {shares} shares");
        }
        Command::Report {
            quotes,
            eurusd,
            today,
            skip_contributions,
        } => {
            let config = match &paths.config {
                Some(path) => RebalanceConfig::load_from_file(path)
                    .with_context(|| format!("Failed to load configuration {path:?}"))?,
                None => {
                    info!("No rebalancing configuration found, using default sector targets");
                    RebalanceConfig::default()
                }
            };
            let mut state = load_state(&store)?;
            if let Some(quotes) = quotes {
                let fx = FxRate::new(eurusd);
                info!(eur_usd = fx.eur_usd(), "normalizing USD closes");
                let sheet = QuoteSheet::load_from_file(&quotes, fx)
                    .with_context(|| format!("Failed to read quotes {quotes:?}"))?;
                state.refresh_prices(&sheet);
            }
            let mut executed = Vec::new();
            let mut plan = None;
            if !skip_contributions {
                let mut loaded = MonthlyPlan::load_from_file(&paths.plan)
                    .with_context(|| format!("Failed to load savings plan {:?}", paths.plan))?;
                let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
                executed = state.run_contributions(&mut loaded, today);
                plan = Some(loaded);
            }
            store
                .save(state.holdings())
                .with_context(|| format!("Failed to save holdings to {:?}", store.path()))?;
            if let Some(plan) = plan.filter(|_| !executed.is_empty()) {
                plan.save(&paths.plan)
                    .with_context(|| format!("Failed to save savings plan {:?}", paths.plan))?;
            }
            for date in executed {
                println!("Savings plan executed for {date}");
            }
            print_report(&state.snapshot(&config));
        }
    }
    Ok(())
}

fn load_state(store: &CsvHoldingStore) -> anyhow::Result<PortfolioState> {
    let holdings = store
        .load()
        .with_context(|| format!("Failed to load holdings from {:?}", store.path()))?;
    Ok(PortfolioState::new(holdings)?)
}

fn print_report(snapshot: &Snapshot) {
    let valuation = &snapshot.valuation;
    let holdings = valuation.holdings.iter().map(|vh| HoldingRow {
        name: vh.holding.name.clone(),
        ticker: vh.holding.ticker.clone(),
        sector: vh.holding.sector.clone(),
        shares: format!("{:.4}", vh.holding.shares),
        currency: vh.holding.currency.to_string(),
        price: vh
            .holding
            .price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string()),
        market_value: vh.market_value.to_string(),
    });
    println!("Holdings");
    println!("{}", Table::new(holdings).with(Style::rounded()));
    println!();

    println!("Sector allocation (without legacy holdings)");
    let allocation = valuation.allocation();
    if allocation.is_empty() {
        println!("No market values available for a sector breakdown.");
    } else {
        let rows = valuation
            .sectors
            .iter()
            .zip(allocation)
            .map(|(agg, (_, percent))| SectorRow {
                sector: agg.sector.clone(),
                market_value: agg.market_value.to_string(),
                percent: format!("{percent:.2}%"),
            });
        println!("{}", Table::new(rows).with(Style::rounded()));
        println!("Total: {}", valuation.total);
    }
    println!();

    println!("Rebalancing suggestions");
    if snapshot.suggestions.is_empty() {
        println!(" - All targets are within tolerance.");
    }
    snapshot
        .suggestions
        .iter()
        .for_each(|s| println!(" - {s}"));
}
