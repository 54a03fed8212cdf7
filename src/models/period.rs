//! Reporting period model.
//!
//! A [`Period`] identifies one calendar month of billing data. Periods are
//! serialized as `YYYY-MM` strings, matching the format the upstream cost
//! extraction uses throughout.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};

/// One calendar month of billing data.
///
/// # Example
///
/// ```
/// use recon_engine::models::Period;
///
/// let period: Period = "2025-11".parse().unwrap();
/// assert_eq!(period.to_string(), "2025-11");
/// assert_eq!(period.prior().to_string(), "2025-10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period from a year and a month (1-12).
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidPeriod {
                value: format!("{:04}-{:02}", year, month),
            });
        }
        Ok(Self { year, month })
    }

    /// Returns the year of the period.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month of the period (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the first day of the period.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated period always has a first day")
    }

    /// Returns the last day of the period.
    pub fn end_date(&self) -> NaiveDate {
        let next = self.next();
        next.start_date()
            .pred_opt()
            .expect("first day of a month always has a predecessor")
    }

    /// Returns the prior calendar month, the anomaly detector's baseline period.
    pub fn prior(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Returns the following calendar month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Returns true if the given date falls inside the period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod {
            value: s.to_string(),
        };

        let (year_str, month_str) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;

        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
