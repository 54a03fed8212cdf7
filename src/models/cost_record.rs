//! Raw cost record model.
//!
//! A [`CostRecord`] is one per-account, per-service, per-day cost line as
//! delivered by the Cost Source. Records arrive already deduplicated for
//! pagination and free of throttling gaps; the engine never mutates them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single raw cost line from the Cost Source.
///
/// Amounts are non-negative decimals; currency is uniform across a run
/// (mixed-currency runs are a documented non-goal and are rejected at the
/// engine's ingress boundary).
///
/// # Example
///
/// ```
/// use recon_engine::models::CostRecord;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let record = CostRecord {
///     account_id: "111122223333".to_string(),
///     service_name: "AmazonEC2".to_string(),
///     usage_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
///     amount: Decimal::from_str("142.37").unwrap(),
///     currency: "USD".to_string(),
/// };
/// assert_eq!(record.service_name, "AmazonEC2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRecord {
    /// The linked account the cost was incurred under.
    pub account_id: String,
    /// The service that generated the cost (e.g., "AmazonEC2").
    pub service_name: String,
    /// The usage day the cost applies to.
    pub usage_date: NaiveDate,
    /// The cost amount, non-negative.
    pub amount: Decimal,
    /// The ISO currency code (e.g., "USD").
    pub currency: String,
}
