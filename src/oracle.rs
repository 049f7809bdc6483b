use std::{collections::HashMap, path::Path};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Euro, Result, holding::Currency};

/// EUR/USD rate used whenever no usable rate was supplied.
pub const FALLBACK_EUR_USD: f64 = 1.08;

/// Source of unit prices already converted to euros.
pub trait PriceOracle {
    fn price_of(&self, ticker: &str, currency: Currency) -> Option<Euro>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxRate {
    eur_usd: f64,
}

impl Default for FxRate {
    fn default() -> Self {
        Self {
            eur_usd: FALLBACK_EUR_USD,
        }
    }
}

impl FxRate {
    /// Uses `eur_usd` when it is a positive number, the fallback otherwise.
    pub fn new(eur_usd: Option<f64>) -> Self {
        match eur_usd {
            Some(rate) if rate.is_finite() && rate > 0.0 => Self { eur_usd: rate },
            Some(rate) => {
                warn!(rate, fallback = FALLBACK_EUR_USD, "Unusable EUR/USD rate");
                Self::default()
            }
            None => {
                debug!(fallback = FALLBACK_EUR_USD, "No EUR/USD rate supplied");
                Self::default()
            }
        }
    }

    pub fn eur_usd(&self) -> f64 {
        self.eur_usd
    }

    /// Converts a close quoted in `currency` into euros, rounded to cents.
    pub fn normalize(&self, close: f64, currency: Currency) -> Euro {
        let price = match currency {
            Currency::Eur => close,
            Currency::Usd => close / self.eur_usd,
        };
        Euro(price).round_cents()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QuoteRecord {
    ticker: String,
    close: Option<f64>,
}

/// Closing prices in each ticker's own currency, e.g. exported from a broker.
#[derive(Debug, Clone, Default)]
pub struct QuoteSheet {
    closes: HashMap<String, f64>,
    fx: FxRate,
}

impl QuoteSheet {
    pub fn new(fx: FxRate) -> Self {
        Self {
            closes: HashMap::new(),
            fx,
        }
    }

    pub fn with_close(mut self, ticker: impl Into<String>, close: f64) -> Self {
        self.closes.insert(ticker.into(), close);
        self
    }

    /// Reads a `Ticker,Close` CSV. Rows with an empty close are left out.
    pub fn load_from_file(path: impl AsRef<Path>, fx: FxRate) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut sheet = Self::new(fx);
        for record in reader.deserialize() {
            let record: QuoteRecord = record?;
            match record.close {
                Some(close) => {
                    sheet.closes.insert(record.ticker, close);
                }
                None => debug!(ticker = %record.ticker, "no close in quote sheet"),
            }
        }
        debug!(path = ?path.as_ref(), quotes = sheet.closes.len(), "loaded quote sheet");
        Ok(sheet)
    }
}

impl PriceOracle for QuoteSheet {
    fn price_of(&self, ticker: &str, currency: Currency) -> Option<Euro> {
        let close = self.closes.get(ticker).copied()?;
        if !close.is_finite() || close <= 0.0 {
            warn!(ticker, close, "Ignoring unusable close");
            return None;
        }
        Some(self.fx.normalize(close, currency))
    }
}
