use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = "depot-rebalancer",
    version,
    about = "Track a savings portfolio and suggest rebalancing moves"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, help = "Holdings CSV")]
    pub holdings: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Rebalancing configuration")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Savings plan state")]
    pub plan: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Refresh prices, run due contributions and print the rebalancing report
    Report {
        #[arg(short, long, help = "CSV of Ticker,Close quotes in each ticker's currency")]
        quotes: Option<PathBuf>,
        #[arg(long, help = "EUR/USD rate used to convert USD quotes")]
        eurusd: Option<f64>,
        #[arg(long, help = "Evaluate the savings plan as of this date (YYYY-MM-DD)")]
        today: Option<NaiveDate>,
        #[arg(long, help = "Do not execute due savings plan contributions")]
        skip_contributions: bool,
    },
    /// Set the share count of a holding
    SetShares { ticker: String, shares: f64 },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
