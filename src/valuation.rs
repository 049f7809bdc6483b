use tracing::debug;

use crate::{Euro, Percent, holding::Holding};

#[derive(Debug, Clone, PartialEq)]
pub struct ValuedHolding {
    pub holding: Holding,
    pub market_value: Euro,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorAggregate {
    pub sector: String,
    pub market_value: Euro,
    pub monthly_contribution: Euro,
    pub holdings: usize,
}

/// Market values of one valuation pass. Legacy holdings are listed but never
/// aggregated, so `total` covers the rebalanced part of the portfolio only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Valuation {
    pub holdings: Vec<ValuedHolding>,
    /// Sectors in order of their first holding.
    pub sectors: Vec<SectorAggregate>,
    pub total: Euro,
}

pub fn value(holdings: &[Holding]) -> Valuation {
    let valued: Vec<ValuedHolding> = holdings
        .iter()
        .map(|h| ValuedHolding {
            market_value: h.market_value(),
            holding: h.clone(),
        })
        .collect();

    let mut sectors: Vec<SectorAggregate> = Vec::new();
    for vh in valued.iter().filter(|vh| !vh.holding.is_legacy()) {
        let idx = match sectors.iter().position(|s| s.sector == vh.holding.sector) {
            Some(idx) => idx,
            None => {
                sectors.push(SectorAggregate {
                    sector: vh.holding.sector.clone(),
                    market_value: Euro::ZERO,
                    monthly_contribution: Euro::ZERO,
                    holdings: 0,
                });
                sectors.len() - 1
            }
        };
        let agg = &mut sectors[idx];
        agg.market_value += vh.market_value;
        agg.monthly_contribution += vh.holding.monthly_contribution;
        agg.holdings += 1;
    }
    for agg in sectors.iter_mut() {
        agg.market_value = agg.market_value.round_cents();
    }

    let total = sectors.iter().map(|s| s.market_value).sum();
    debug!(holdings = valued.len(), sectors = sectors.len(), %total, "valued portfolio");
    Valuation {
        holdings: valued,
        sectors,
        total,
    }
}

impl Valuation {
    pub fn sector(&self, name: &str) -> Option<&SectorAggregate> {
        self.sectors.iter().find(|s| s.sector == name)
    }

    /// Aggregate value of a sector, zero when it holds nothing.
    pub fn sector_value(&self, name: &str) -> Euro {
        self.sector(name).map(|s| s.market_value).unwrap_or_default()
    }

    /// Non-legacy holdings of `sector` in holding order.
    pub fn in_sector<'a>(&'a self, sector: &'a str) -> impl Iterator<Item = &'a ValuedHolding> {
        self.holdings
            .iter()
            .filter(move |vh| !vh.holding.is_legacy() && vh.holding.sector == sector)
    }

    /// Percent of the total per sector. Empty when the total is zero.
    pub fn allocation(&self) -> Vec<(String, Percent)> {
        if self.total <= Euro::ZERO {
            return Vec::new();
        }
        self.sectors
            .iter()
            .map(|s| {
                let percent = s.market_value.ratio(self.total) * 100.0;
                (s.sector.clone(), (percent * 100.0).round() / 100.0)
            })
            .collect()
    }
}
