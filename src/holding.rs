use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{Error, Euro, Result};

/// Sector label of positions kept outside of rebalancing and the savings plan.
pub const LEGACY_SECTOR: &str = "Bestand";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Currency {
    #[display("EUR")]
    #[serde(rename = "EUR")]
    Eur,
    #[display("USD")]
    #[serde(rename = "USD")]
    Usd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub name: String,
    pub ticker: String,
    pub sector: String,
    pub monthly_contribution: Euro,
    pub shares: f64,
    pub currency: Currency,
    /// Last fetched unit price, already converted to euros.
    pub price: Option<Euro>,
}

impl Holding {
    pub fn new(
        name: impl Into<String>,
        ticker: impl Into<String>,
        sector: impl Into<String>,
        monthly_contribution: f64,
        shares: f64,
        currency: Currency,
    ) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            sector: sector.into(),
            monthly_contribution: Euro(monthly_contribution),
            shares,
            currency,
            price: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(Euro(price));
        self
    }

    pub fn is_legacy(&self) -> bool {
        self.sector == LEGACY_SECTOR
    }

    /// `shares * price` rounded to cents, zero while the price is unknown.
    pub fn market_value(&self) -> Euro {
        match self.price {
            Some(price) => (price * self.shares).round_cents(),
            None => Euro::ZERO,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidHolding {
            ticker: self.ticker.clone(),
            reason: reason.to_string(),
        };
        if self.ticker.trim().is_empty() {
            return Err(invalid("ticker is empty"));
        }
        if !self.shares.is_finite() || self.shares < 0.0 {
            return Err(invalid("share count must be a non-negative number"));
        }
        if !self.monthly_contribution.0.is_finite() || self.monthly_contribution < Euro::ZERO {
            return Err(invalid("monthly contribution must be a non-negative amount"));
        }
        if self.is_legacy() && self.monthly_contribution > Euro::ZERO {
            return Err(invalid("legacy holdings cannot have a monthly contribution"));
        }
        Ok(())
    }
}

/// Starting portfolio used when no holdings have been persisted yet.
pub fn seed() -> Vec<Holding> {
    use Currency::{Eur, Usd};

    let tech = "Technologie & KI";
    let cloud = "Cybersecurity / Cloud";
    let energy = "Erneuerbare Energien & Infra";
    let disruption = "Zukunft / Disruption";
    let health = "Gesundheit / Stabilität";
    let consumer = "Konsum & Industrie";
    vec![
        Holding::new("NVIDIA", "NVDA", tech, 75.0, 0.0, Usd),
        Holding::new("Microsoft", "MSFT", tech, 50.0, 0.0, Usd),
        Holding::new("Alphabet", "GOOGL", tech, 50.0, 0.0, Usd),
        Holding::new("ASML", "ASML", tech, 25.0, 0.0, Eur),
        Holding::new("CrowdStrike", "CRWD", cloud, 25.0, 0.0, Usd),
        Holding::new("ServiceNow", "NOW", cloud, 25.0, 0.0, Usd),
        Holding::new("First Solar", "FSLR", energy, 50.0, 0.0, Usd),
        Holding::new("NextEra Energy", "NEE", energy, 25.0, 0.0, Usd),
        Holding::new("Brookfield Renewable", "BEPC", energy, 25.0, 0.0, Usd),
        Holding::new("Tesla", "TSLA", disruption, 37.5, 0.0, Usd),
        Holding::new("Palantir", "PLTR", disruption, 25.0, 0.0, Usd),
        Holding::new("Super Micro Computer", "SMCI", disruption, 12.5, 0.0, Usd),
        Holding::new("Johnson & Johnson", "JNJ", health, 25.0, 0.0, Usd),
        Holding::new("Novo Nordisk", "NVO", health, 25.0, 0.0, Usd),
        Holding::new("Apple", "AAPL", consumer, 25.0, 0.0, Usd),
        Holding::new("Volkswagen", "VOW3.DE", LEGACY_SECTOR, 0.0, 57.213, Eur),
    ]
}
