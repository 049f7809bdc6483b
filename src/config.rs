use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Euro, Result, holding::LEGACY_SECTOR};

pub const DEFAULT_ABSOLUTE_TOLERANCE: Euro = Euro(10.0);
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectorTarget {
    pub sector: String,
    pub value: Euro,
}

impl SectorTarget {
    pub fn new(sector: impl Into<String>, value: f64) -> Self {
        Self {
            sector: sector.into(),
            value: Euro(value),
        }
    }
}

/// Value each sector's holdings are measured against in proportional mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Kind", rename_all = "PascalCase", rename_all_fields = "PascalCase")]
pub enum Basis {
    /// The sector's own current market value.
    SectorTotal,
    /// A slice of an overall portfolio target, weighted by the sector's share
    /// of all monthly contributions.
    PortfolioTarget { total: Euro },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Mode", rename_all = "PascalCase", rename_all_fields = "PascalCase")]
pub enum Strategy {
    /// Fixed euro target per sector, checked in the listed order.
    SectorFixed { targets: Vec<SectorTarget> },
    /// Per-holding targets derived from monthly contribution weights.
    Proportional { basis: Basis },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceConfig {
    pub strategy: Strategy,
    /// Band around a sector target, in euros, used by [`Strategy::SectorFixed`].
    pub absolute_tolerance: Euro,
    /// Band around a holding target, as a fraction, used by [`Strategy::Proportional`].
    pub relative_tolerance: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::SectorFixed {
                targets: vec![
                    SectorTarget::new("Technologie & KI", 200.0),
                    SectorTarget::new("Cybersecurity / Cloud", 50.0),
                    SectorTarget::new("Erneuerbare Energien & Infra", 100.0),
                    SectorTarget::new("Zukunft / Disruption", 100.0),
                    SectorTarget::new("Gesundheit / Stabilität", 50.0),
                    SectorTarget::new("Konsum & Industrie", 50.0),
                ],
            },
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
        }
    }
}

impl RebalanceConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_yaml(&s)?;
        debug!(?path, ?config, "loaded rebalancing configuration");
        Ok(config)
    }

    pub fn from_yaml(s: &str) -> Result<Self> {
        let builder: RebalanceConfigBuilder = serde_yaml::from_str(s)?;
        builder.build()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RebalanceConfigBuilder {
    strategy: Strategy,
    #[serde(default = "default_absolute_tolerance")]
    absolute_tolerance: Euro,
    #[serde(default = "default_relative_tolerance")]
    relative_tolerance: f64,
}

fn default_absolute_tolerance() -> Euro {
    DEFAULT_ABSOLUTE_TOLERANCE
}

fn default_relative_tolerance() -> f64 {
    DEFAULT_RELATIVE_TOLERANCE
}

impl TryFrom<RebalanceConfigBuilder> for RebalanceConfig {
    type Error = Error;

    fn try_from(builder: RebalanceConfigBuilder) -> Result<Self> {
        builder.validate()?;
        Ok(RebalanceConfig {
            strategy: builder.strategy,
            absolute_tolerance: builder.absolute_tolerance,
            relative_tolerance: builder.relative_tolerance,
        })
    }
}

impl RebalanceConfigBuilder {
    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));
        if self.absolute_tolerance.0.is_nan() || self.absolute_tolerance < Euro::ZERO {
            return invalid("AbsoluteTolerance must not be negative".into());
        }
        if !(0.0..1.0).contains(&self.relative_tolerance) {
            return invalid("RelativeTolerance must be within [0, 1)".into());
        }
        match &self.strategy {
            Strategy::SectorFixed { targets } => {
                for (idx, target) in targets.iter().enumerate() {
                    if target.sector == LEGACY_SECTOR {
                        return invalid(format!("Sector '{LEGACY_SECTOR}' cannot have a target"));
                    }
                    if target.value.0.is_nan() || target.value < Euro::ZERO {
                        return invalid(format!("Target for '{}' is negative", target.sector));
                    }
                    if targets[..idx].iter().any(|t| t.sector == target.sector) {
                        return invalid(format!("Sector '{}' is listed twice", target.sector));
                    }
                }
            }
            Strategy::Proportional {
                basis: Basis::PortfolioTarget { total },
            } if total.0.is_nan() || *total <= Euro::ZERO => {
                return invalid("Portfolio target total must be positive".into());
            }
            Strategy::Proportional { .. } => {}
        }
        Ok(())
    }

    fn build(self) -> Result<RebalanceConfig> {
        self.try_into()
    }
}
