//! Reconciliation finding and anomaly flag models.
//!
//! This module contains the engine's primary outputs: one
//! [`ReconciliationFinding`] per business unit per period, and zero or more
//! [`AnomalyFlag`]s surfacing shape-of-spend changes that budgets alone
//! would miss.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Period;

/// The budget status of a business unit for a period.
///
/// # Example
///
/// ```
/// use recon_engine::models::BudgetStatus;
///
/// let json = serde_json::to_string(&BudgetStatus::Overrun).unwrap();
/// assert_eq!(json, "\"overrun\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Spend is at or below target, or under target by any margin.
    WithinBudget,
    /// Spend is over target but within the alert threshold.
    Warning,
    /// Spend is over target beyond the alert threshold.
    Overrun,
    /// No budget is configured for this business unit; flagged for
    /// operator review, never an error.
    Unbudgeted,
}

/// One entry in a finding's ranked top-cost-driver list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopDriver {
    /// The service contributing the spend.
    pub service_name: String,
    /// The service's total spend for the business unit over the period.
    pub amount: Decimal,
}

/// A period-over-period spend outlier for one (business_unit, service_name)
/// pair, computed independently of budget configuration.
///
/// `deviation_pct` is `None` when the baseline is zero and current spend is
/// positive: the deviation is unbounded rather than a division result, and
/// such pairs are always flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyFlag {
    /// The business unit the spend belongs to.
    pub business_unit: String,
    /// The service whose spend deviated.
    pub service_name: String,
    /// Total spend for the pair in the current period.
    pub observed_amount: Decimal,
    /// Total spend for the pair in the baseline period.
    pub baseline_amount: Decimal,
    /// Deviation from baseline as a percentage, or `None` when unbounded.
    pub deviation_pct: Option<Decimal>,
}

/// The variance verdict for one business unit over one period.
///
/// Constructed exclusively by the Reconciler. `budget_target`,
/// `variance_amount`, and `variance_pct` are `None` for unbudgeted units;
/// `variance_pct` is additionally `None` when the target is zero and actual
/// spend is positive (unbounded overrun).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationFinding {
    /// The business unit the finding is for.
    pub business_unit: String,
    /// The period reconciled.
    pub period: Period,
    /// Total actual spend for the period.
    pub actual_total: Decimal,
    /// The configured monthly target, if any.
    pub budget_target: Option<Decimal>,
    /// actual_total minus budget_target.
    pub variance_amount: Option<Decimal>,
    /// Variance as a percentage of target, rounded to 2 decimal places.
    pub variance_pct: Option<Decimal>,
    /// The alert threshold the status was classified against, if budgeted.
    pub alert_threshold_pct: Option<Decimal>,
    /// The budget status verdict.
    pub status: BudgetStatus,
    /// Services ranked descending by spend, ties broken lexically,
    /// truncated to the configured driver count.
    pub top_drivers: Vec<TopDriver>,
    /// Account ids that had spend in this bucket but no mapping.
    pub unmapped_accounts: BTreeSet<String>,
    /// Anomaly flags for this business unit, attached as an auxiliary signal.
    pub anomalies: Vec<AnomalyFlag>,
}
