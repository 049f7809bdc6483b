use std::path::Path;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Euro, Result, holding::Holding};

/// How far ahead a due date may be rolled to reach a trading day.
const MAX_ROLL_DAYS: u64 = 30;

pub trait ContributionScheduler {
    fn is_contribution_due(&self, today: NaiveDate) -> bool;

    /// Marks the pending contribution as executed and returns its due date.
    /// Afterwards the scheduler must point at a later contribution.
    fn record_execution(&mut self) -> NaiveDate;

    /// Shares one contribution buys at `price`, `None` for prices that are not positive.
    fn contribution_shares(&self, holding: &Holding, price: Euro) -> Option<f64> {
        (price > Euro::ZERO).then(|| holding.monthly_contribution.0 / price.0)
    }
}

/// Weekends and listed holidays are closed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TradingCalendar {
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl TradingCalendar {
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// First trading day on or after `date`, or `date` itself when none is
    /// found within the roll window.
    pub fn next_trading_day(&self, date: NaiveDate) -> NaiveDate {
        (0..=MAX_ROLL_DAYS)
            .filter_map(|offset| date.checked_add_days(Days::new(offset)))
            .find(|&d| self.is_trading_day(d))
            .unwrap_or(date)
    }
}

/// Monthly savings plan executed on the trading day following the same day of
/// month as its first execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonthlyPlan {
    pub first_execution: NaiveDate,
    #[serde(default)]
    pub last_executed: Option<NaiveDate>,
    #[serde(default)]
    pub calendar: TradingCalendar,
}

impl Default for MonthlyPlan {
    fn default() -> Self {
        Self::new(NaiveDate::from_ymd_opt(2025, 11, 6).unwrap_or_default())
    }
}

impl MonthlyPlan {
    pub fn new(first_execution: NaiveDate) -> Self {
        Self {
            first_execution,
            last_executed: None,
            calendar: TradingCalendar::default(),
        }
    }

    pub fn with_calendar(mut self, calendar: TradingCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Loads the plan state, starting a fresh default plan when the file is missing.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(?path, "No savings plan state found, starting a new plan");
            return Ok(Self::default());
        }
        let s = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let s = serde_yaml::to_string(self)?;
        std::fs::write(path, s).map_err(|e| Error::io(path, e))
    }

    /// Trading day of the earliest contribution not yet executed.
    pub fn next_due(&self) -> NaiveDate {
        let mut months = 0;
        loop {
            let Some(nominal) = self.first_execution.checked_add_months(Months::new(months)) else {
                return NaiveDate::MAX;
            };
            let due = self.calendar.next_trading_day(nominal);
            match self.last_executed {
                Some(last) if due <= last => months += 1,
                _ => return due,
            }
        }
    }
}

impl ContributionScheduler for MonthlyPlan {
    fn is_contribution_due(&self, today: NaiveDate) -> bool {
        today >= self.next_due()
    }

    fn record_execution(&mut self) -> NaiveDate {
        let due = self.next_due();
        debug!(%due, "recorded savings plan execution");
        self.last_executed = Some(due);
        due
    }
}
