//! Rebalancing suggestions for fixed sector targets and proportional holding targets.

use std::fmt;

use tracing::debug;

use crate::{
    Euro, Percent,
    config::{Basis, RebalanceConfig, SectorTarget, Strategy},
    holding::LEGACY_SECTOR,
    valuation::{SectorAggregate, Valuation, ValuedHolding},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Overweight,
    Underweight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Sector(String),
    Holding { name: String, sector: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitude {
    /// Distance from the target value.
    pub amount: Euro,
    /// Distance between actual and target weight within the sector.
    pub weight_gap: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Sector(String),
    Sibling(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Reduce the named holding of an overweight sector.
    Sell { candidate: String },
    /// Add to the named holding of an underweight sector.
    Buy { candidate: String },
    Accumulate,
    ShiftIntoSibling,
    PartialSale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub subject: Subject,
    pub direction: Direction,
    pub magnitude: Magnitude,
    pub action: Action,
    pub destination: Option<Destination>,
}

pub fn advise(valuation: &Valuation, config: &RebalanceConfig) -> Vec<Suggestion> {
    let suggestions = match &config.strategy {
        Strategy::SectorFixed { targets } => {
            sector_fixed(valuation, targets, config.absolute_tolerance)
        }
        Strategy::Proportional { basis } => {
            proportional(valuation, basis, config.relative_tolerance)
        }
    };
    debug!(count = suggestions.len(), "computed rebalancing suggestions");
    suggestions
}

pub fn sector_fixed(
    valuation: &Valuation,
    targets: &[SectorTarget],
    tolerance: Euro,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    for target in targets.iter().filter(|t| t.sector != LEGACY_SECTOR) {
        let members: Vec<&ValuedHolding> = valuation.in_sector(&target.sector).collect();
        if members.is_empty() {
            debug!(sector = %target.sector, "no holdings for configured sector");
            continue;
        }
        let current = valuation.sector_value(&target.sector);
        let diff = (current - target.value).round_cents();
        if diff.abs() <= tolerance {
            continue;
        }

        let subject = Subject::Sector(target.sector.clone());
        let suggestion = if diff > Euro::ZERO {
            let candidate = first_by(&members, |a, b| a > b);
            let receiving = receiving_sector(valuation, targets, &target.sector);
            debug!(
                sector = %target.sector,
                %diff,
                candidate = %candidate.holding.name,
                ?receiving,
                "sector overweight"
            );
            Suggestion {
                subject,
                direction: Direction::Overweight,
                magnitude: Magnitude {
                    amount: diff,
                    weight_gap: None,
                },
                action: Action::Sell {
                    candidate: candidate.holding.name.clone(),
                },
                destination: receiving.map(|s| Destination::Sector(s.to_string())),
            }
        } else {
            let candidate = first_by(&members, |a, b| a < b);
            debug!(
                sector = %target.sector,
                %diff,
                candidate = %candidate.holding.name,
                "sector underweight"
            );
            Suggestion {
                subject,
                direction: Direction::Underweight,
                magnitude: Magnitude {
                    amount: diff.abs(),
                    weight_gap: None,
                },
                action: Action::Buy {
                    candidate: candidate.holding.name.clone(),
                },
                destination: None,
            }
        };
        suggestions.push(suggestion);
    }
    suggestions
}

/// First member whose market value beats every earlier one under `better`.
fn first_by<'a>(
    members: &[&'a ValuedHolding],
    better: impl Fn(Euro, Euro) -> bool,
) -> &'a ValuedHolding {
    let mut best = members[0];
    for &candidate in &members[1..] {
        if better(candidate.market_value, best.market_value) {
            best = candidate;
        }
    }
    best
}

/// Configured non-legacy sector other than `overweight` with the lowest current value.
fn receiving_sector<'a>(
    valuation: &Valuation,
    targets: &'a [SectorTarget],
    overweight: &str,
) -> Option<&'a str> {
    let mut lowest: Option<(&str, Euro)> = None;
    let candidates = targets
        .iter()
        .filter(|t| t.sector != overweight && t.sector != LEGACY_SECTOR);
    for target in candidates {
        let value = valuation.sector_value(&target.sector);
        match lowest {
            Some((_, min)) if value >= min => {}
            _ => lowest = Some((target.sector.as_str(), value)),
        }
    }
    lowest.map(|(sector, _)| sector)
}

#[derive(Debug)]
struct HoldingWeight<'a> {
    holding: &'a ValuedHolding,
    target_weight: f64,
    actual_weight: f64,
    target_value: Euro,
}

pub fn proportional(valuation: &Valuation, basis: &Basis, tolerance: f64) -> Vec<Suggestion> {
    let portfolio_contribution: Euro = valuation
        .sectors
        .iter()
        .map(|s| s.monthly_contribution)
        .sum();

    let mut suggestions = Vec::new();
    for sector in &valuation.sectors {
        if sector.monthly_contribution <= Euro::ZERO {
            debug!(sector = %sector.sector, "no contributions, skipping proportional targets");
            continue;
        }
        let basis_value = sector_basis(sector, basis, portfolio_contribution);
        let weights: Vec<HoldingWeight> = valuation
            .in_sector(&sector.sector)
            .map(|vh| {
                let target_weight = vh
                    .holding
                    .monthly_contribution
                    .ratio(sector.monthly_contribution);
                HoldingWeight {
                    holding: vh,
                    target_weight,
                    actual_weight: vh.market_value.ratio(sector.market_value),
                    target_value: basis_value * target_weight,
                }
            })
            .collect();

        for (idx, w) in weights.iter().enumerate() {
            let actual = w.holding.market_value;
            let direction = if actual < w.target_value * (1.0 - tolerance) {
                Direction::Underweight
            } else if actual > w.target_value * (1.0 + tolerance) {
                Direction::Overweight
            } else {
                continue;
            };

            let (action, destination) = match direction {
                Direction::Underweight => (Action::Accumulate, None),
                Direction::Overweight => {
                    let sibling = weights
                        .iter()
                        .enumerate()
                        .find(|&(other, s)| other != idx && s.actual_weight < s.target_weight);
                    match sibling {
                        Some((_, s)) => (
                            Action::ShiftIntoSibling,
                            Some(Destination::Sibling(s.holding.holding.name.clone())),
                        ),
                        None => (Action::PartialSale, None),
                    }
                }
            };
            debug!(
                holding = %w.holding.holding.name,
                ?direction,
                ?action,
                target = %w.target_value,
                %actual,
                "holding off target"
            );
            suggestions.push(Suggestion {
                subject: Subject::Holding {
                    name: w.holding.holding.name.clone(),
                    sector: sector.sector.clone(),
                },
                direction,
                magnitude: Magnitude {
                    amount: (actual - w.target_value).abs().round_cents(),
                    weight_gap: Some(((w.actual_weight - w.target_weight) * 100.0).abs()),
                },
                action,
                destination,
            });
        }
    }
    suggestions
}

fn sector_basis(
    sector: &SectorAggregate,
    basis: &Basis,
    portfolio_contribution: Euro,
) -> Euro {
    match basis {
        Basis::SectorTotal => sector.market_value,
        Basis::PortfolioTarget { total } => {
            *total * sector.monthly_contribution.ratio(portfolio_contribution)
        }
    }
}

impl Suggestion {
    pub fn destination_name(&self) -> Option<&str> {
        match &self.destination {
            Some(Destination::Sector(name)) | Some(Destination::Sibling(name)) => {
                Some(name.as_str())
            }
            None => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Sector(sector) => write!(f, "{sector}"),
            Subject::Holding { name, sector } => write!(f, "{name} ({sector})"),
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.direction {
            Direction::Overweight => "too much",
            Direction::Underweight => "too little",
        };
        write!(f, "{}: {} {state}", self.subject, self.magnitude.amount)?;
        if let Some(gap) = self.magnitude.weight_gap {
            write!(f, " ({gap:.1} pp)")?;
        }
        match (&self.action, self.destination_name()) {
            (Action::Sell { candidate }, Some(sector)) => {
                write!(f, " - consider selling {candidate} and shifting into {sector}")
            }
            (Action::Sell { candidate }, None) => write!(f, " - consider selling {candidate}"),
            (Action::Buy { candidate }, _) => {
                write!(f, " - increase {candidate} or shift from overweight sectors")
            }
            (Action::Accumulate, _) => write!(f, " - accumulate"),
            (Action::ShiftIntoSibling, Some(sibling)) => write!(f, " - shift into {sibling}"),
            (Action::ShiftIntoSibling, None) | (Action::PartialSale, _) => {
                write!(f, " - consider a partial sale")
            }
        }
    }
}
