use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    Error, Euro, Result,
    advisor::{self, Suggestion},
    config::RebalanceConfig,
    holding::Holding,
    oracle::PriceOracle,
    schedule::ContributionScheduler,
    valuation::{self, Valuation},
};

/// Holdings owned by the current session. All mutation goes through here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioState {
    holdings: Vec<Holding>,
}

/// Read-only result of one valuation and advisory pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub valuation: Valuation,
    pub suggestions: Vec<Suggestion>,
}

impl PortfolioState {
    pub fn new(holdings: Vec<Holding>) -> Result<Self> {
        for h in &holdings {
            h.validate()?;
        }
        Ok(Self { holdings })
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn set_shares(&mut self, ticker: &str, shares: f64) -> Result<()> {
        let holding = self
            .holdings
            .iter_mut()
            .find(|h| h.ticker.eq_ignore_ascii_case(ticker))
            .ok_or_else(|| Error::UnknownTicker(ticker.to_string()))?;
        if !shares.is_finite() || shares < 0.0 {
            return Err(Error::InvalidShares {
                ticker: holding.ticker.clone(),
                shares,
            });
        }
        debug!(ticker = %holding.ticker, from = holding.shares, to = shares, "edited shares");
        holding.shares = shares;
        Ok(())
    }

    /// Asks `oracle` for every price. Holdings without a quote keep their
    /// cached price. Returns how many prices were updated.
    pub fn refresh_prices(&mut self, oracle: &dyn PriceOracle) -> usize {
        let mut refreshed = 0;
        for h in self.holdings.iter_mut() {
            match oracle.price_of(&h.ticker, h.currency) {
                Some(price) => {
                    h.price = Some(price);
                    refreshed += 1;
                }
                None => warn!(ticker = %h.ticker, cached = ?h.price, "No price available"),
            }
        }
        info!(refreshed, total = self.holdings.len(), "refreshed prices");
        refreshed
    }

    /// Executes every contribution `scheduler` reports as due by `today` and
    /// returns their due dates. Legacy and unpriced holdings are skipped.
    ///
    /// A month in which no holding could be bought is left due, so it runs
    /// once prices are available.
    pub fn run_contributions(
        &mut self,
        scheduler: &mut dyn ContributionScheduler,
        today: NaiveDate,
    ) -> Vec<NaiveDate> {
        let mut executed = Vec::new();
        while scheduler.is_contribution_due(today) {
            let mut bought = 0;
            let eligible = self
                .holdings
                .iter_mut()
                .filter(|h| !h.is_legacy() && h.monthly_contribution > Euro::ZERO);
            for h in eligible {
                let Some(price) = h.price else {
                    warn!(ticker = %h.ticker, "No price, skipping contribution");
                    continue;
                };
                if let Some(shares) = scheduler.contribution_shares(h, price) {
                    h.shares += shares;
                    bought += 1;
                }
            }
            if bought == 0 {
                warn!("Nothing could be bought, savings plan stays due");
                break;
            }
            let due = scheduler.record_execution();
            info!(%due, "executed savings plan");
            executed.push(due);
        }
        executed
    }

    pub fn valuation(&self) -> Valuation {
        valuation::value(&self.holdings)
    }

    pub fn snapshot(&self, config: &RebalanceConfig) -> Snapshot {
        let valuation = self.valuation();
        let suggestions = advisor::advise(&valuation, config);
        Snapshot {
            valuation,
            suggestions,
        }
    }
}
