//! Aggregated ledger model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The sum of all cost records mapping to one
/// (business_unit, service_name, usage_date) key.
///
/// Produced exclusively by the Cost Normalizer; uniqueness of the key is an
/// invariant of the normalizer's output. Spend for accounts with no mapping
/// lands under the reserved `UNMAPPED` business unit so nothing is silently
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedLedgerEntry {
    /// The business unit the spend is allocated to.
    pub business_unit: String,
    /// The service that generated the spend.
    pub service_name: String,
    /// The usage day.
    pub usage_date: NaiveDate,
    /// Total spend for the key, exact decimal.
    pub amount: Decimal,
}
