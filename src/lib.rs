pub mod advisor;
pub mod config;
pub mod error;
pub mod holding;
pub mod oracle;
pub mod portfolio;
pub mod schedule;
pub mod store;
pub mod valuation;

use derive_more::{Add, AddAssign, Display, Mul, Sub, Sum};
use serde::{Deserialize, Serialize};

pub use error::{Error, Result};

pub type Percent = f64;

/// An amount in the reference currency.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    Mul,
    Sum,
    Display,
    Serialize,
    Deserialize,
)]
#[display("{_0:.2} €")]
#[serde(transparent)]
pub struct Euro(pub f64);

impl Euro {
    pub const ZERO: Euro = Euro(0.0);

    pub fn round_cents(self) -> Self {
        Euro((self.0 * 100.0).round() / 100.0)
    }

    pub fn abs(self) -> Self {
        Euro(self.0.abs())
    }

    /// Fraction of `whole` this amount represents, 0 when `whole` is zero.
    pub fn ratio(self, whole: Euro) -> f64 {
        if whole.0 == 0.0 { 0.0 } else { self.0 / whole.0 }
    }
}
