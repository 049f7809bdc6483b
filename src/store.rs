use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error, Euro, Result,
    holding::{self, Currency, Holding},
};

pub trait HoldingStore {
    fn load(&self) -> Result<Vec<Holding>>;
    fn save(&self, holdings: &[Holding]) -> Result<()>;
}

/// One CSV row. `Price` and `MarketValue` are a cache for spreadsheet users;
/// market value is recomputed on every load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HoldingRecord {
    name: String,
    ticker: String,
    sector: String,
    monthly_amount: f64,
    shares: f64,
    currency: Currency,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    market_value: Option<f64>,
}

impl From<&Holding> for HoldingRecord {
    fn from(h: &Holding) -> Self {
        Self {
            name: h.name.clone(),
            ticker: h.ticker.clone(),
            sector: h.sector.clone(),
            monthly_amount: h.monthly_contribution.0,
            shares: h.shares,
            currency: h.currency,
            price: h.price.map(|p| p.0),
            market_value: Some(h.market_value().0),
        }
    }
}

impl TryFrom<HoldingRecord> for Holding {
    type Error = Error;

    fn try_from(record: HoldingRecord) -> Result<Self> {
        let holding = Holding {
            name: record.name,
            ticker: record.ticker,
            sector: record.sector,
            monthly_contribution: Euro(record.monthly_amount),
            shares: record.shares,
            currency: record.currency,
            price: record.price.filter(|p| p.is_finite() && *p > 0.0).map(Euro),
        };
        holding.validate()?;
        Ok(holding)
    }
}

#[derive(Debug, Clone)]
pub struct CsvHoldingStore {
    path: PathBuf,
}

impl CsvHoldingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HoldingStore for CsvHoldingStore {
    /// Falls back to the seed portfolio when nothing was saved yet.
    fn load(&self) -> Result<Vec<Holding>> {
        if !self.path.exists() {
            info!(path = ?self.path, "No holdings file found, using seed portfolio");
            return Ok(holding::seed());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let holdings = reader
            .deserialize::<HoldingRecord>()
            .map(|record| Holding::try_from(record?))
            .collect::<Result<Vec<_>>>()?;
        debug!(path = ?self.path, count = holdings.len(), "loaded holdings");
        Ok(holdings)
    }

    fn save(&self, holdings: &[Holding]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        for h in holdings {
            writer.serialize(HoldingRecord::from(h))?;
        }
        writer.flush().map_err(|e| Error::io(&self.path, e))?;
        debug!(path = ?self.path, count = holdings.len(), "saved holdings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_seed() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvHoldingStore::new(dir.path().join("depot.csv"));
        assert_eq!(store.load().unwrap(), holding::seed());
    }

    #[test]
    fn round_trips_holdings() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvHoldingStore::new(dir.path().join("nested").join("depot.csv"));
        let holdings = vec![
            Holding::new("NVIDIA", "NVDA", "Technologie & KI", 75.0, 1.5, Currency::Usd)
                .with_price(160.12),
            Holding::new("ASML", "ASML", "Technologie & KI", 25.0, 0.0, Currency::Eur),
        ];
        store.save(&holdings).unwrap();
        assert_eq!(store.load().unwrap(), holdings);
    }

    #[test]
    fn reads_files_without_cache_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depot.csv");
        std::fs::write(
            &path,
            "Name,Ticker,Sector,MonthlyAmount,Shares,Currency\nVolkswagen,VOW3.DE,Bestand,0,57.213,EUR\n",
        )
        .unwrap();
        let holdings = CsvHoldingStore::new(&path).load().unwrap();
        assert_eq!(holdings.len(), 1);
        assert!(holdings[0].is_legacy());
        assert_eq!(holdings[0].price, None);
    }

    #[test]
    fn ignores_stale_market_value_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depot.csv");
        std::fs::write(
            &path,
            "Name,Ticker,Sector,MonthlyAmount,Shares,Currency,Price,MarketValue\nApple,AAPL,Konsum & Industrie,25,2,USD,100,99999\n",
        )
        .unwrap();
        let holdings = CsvHoldingStore::new(&path).load().unwrap();
        assert_eq!(holdings[0].market_value(), Euro(200.0));
    }

    #[test]
    fn unusable_cached_prices_load_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depot.csv");
        std::fs::write(
            &path,
            concat!(
                "Name,Ticker,Sector,MonthlyAmount,Shares,Currency,Price\n",
                "Apple,AAPL,Konsum & Industrie,25,2,USD,-100\n",
                "ASML,ASML,Technologie & KI,25,1,EUR,0\n",
            ),
        )
        .unwrap();
        let holdings = CsvHoldingStore::new(&path).load().unwrap();
        assert!(holdings.iter().all(|h| h.price.is_none()));
        assert_eq!(holdings[0].market_value(), Euro::ZERO);
    }

    #[test]
    fn rejects_negative_shares_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depot.csv");
        std::fs::write(
            &path,
            "Name,Ticker,Sector,MonthlyAmount,Shares,Currency\nApple,AAPL,Konsum & Industrie,25,-2,USD\n",
        )
        .unwrap();
        assert!(matches!(
            CsvHoldingStore::new(&path).load(),
            Err(Error::InvalidHolding { .. })
        ));
    }
}
