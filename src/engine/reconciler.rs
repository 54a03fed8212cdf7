//! Budget reconciliation.
//!
//! Compares aggregated actuals against configured budgets per business unit,
//! computes variance, classifies status against the unit's alert threshold,
//! and ranks top cost drivers. When finance asks why a unit went over, the
//! drivers list is the answer: which services moved, and by how much.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use tracing::warn;

use crate::config::BudgetConfig;
use crate::models::{
    AggregatedLedgerEntry, AnomalyFlag, BudgetStatus, Period, ReconciliationFinding, TopDriver,
};

use super::mapper::UNMAPPED_BUSINESS_UNIT;

/// Compares aggregated actuals against budgets, producing one finding per
/// business unit present in the ledger.
///
/// Assumes validated configuration; the loader has already enforced the
/// budget invariants. A business unit with no budget entry is reported with
/// status `unbudgeted` rather than skipped. Unmapped account ids are
/// forwarded onto the reserved `UNMAPPED` bucket's finding. Output is
/// sorted by business unit.
///
/// Variance rules for a budgeted unit:
/// - `variance_amount = actual_total - monthly_target`
/// - `variance_pct` is the variance as a percentage of target, defined as 0
///   when both target and actual are 0, and unbounded (`None`, with status
///   `overrun`) when target is 0 and actual is positive.
/// - status is `overrun` above the alert threshold, `warning` for any
///   positive variance at or below it, `within_budget` otherwise.
pub fn reconcile(
    ledger: &[AggregatedLedgerEntry],
    budgets: &HashMap<String, BudgetConfig>,
    anomalies: &[AnomalyFlag],
    unmapped_accounts: &BTreeSet<String>,
    period: Period,
    top_driver_count: usize,
) -> Vec<ReconciliationFinding> {
    // Per-unit totals and per-(unit, service) totals in one pass.
    let mut unit_totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut service_totals: BTreeMap<(&str, &str), Decimal> = BTreeMap::new();

    for entry in ledger {
        *unit_totals.entry(&entry.business_unit).or_insert(Decimal::ZERO) += entry.amount;
        *service_totals
            .entry((&entry.business_unit, &entry.service_name))
            .or_insert(Decimal::ZERO) += entry.amount;
    }

    unit_totals
        .into_iter()
        .map(|(business_unit, actual_total)| {
            let verdict = classify(actual_total, budgets.get(business_unit));

            if verdict.status == BudgetStatus::Overrun {
                warn!(
                    business_unit,
                    %actual_total,
                    target = %verdict.budget_target.unwrap_or(Decimal::ZERO),
                    "Budget overrun"
                );
            } else if verdict.status == BudgetStatus::Unbudgeted {
                warn!(business_unit, %actual_total, "No budget configured");
            }

            let unmapped = if business_unit == UNMAPPED_BUSINESS_UNIT {
                unmapped_accounts.clone()
            } else {
                BTreeSet::new()
            };

            ReconciliationFinding {
                business_unit: business_unit.to_string(),
                period,
                actual_total,
                budget_target: verdict.budget_target,
                variance_amount: verdict.variance_amount,
                variance_pct: verdict.variance_pct,
                alert_threshold_pct: verdict.alert_threshold_pct,
                status: verdict.status,
                top_drivers: top_drivers(&service_totals, business_unit, top_driver_count),
                unmapped_accounts: unmapped,
                anomalies: anomalies
                    .iter()
                    .filter(|flag| flag.business_unit == business_unit)
                    .cloned()
                    .collect(),
            }
        })
        .collect()
}

struct Verdict {
    budget_target: Option<Decimal>,
    variance_amount: Option<Decimal>,
    variance_pct: Option<Decimal>,
    alert_threshold_pct: Option<Decimal>,
    status: BudgetStatus,
}

fn classify(actual_total: Decimal, budget: Option<&BudgetConfig>) -> Verdict {
    let Some(budget) = budget else {
        return Verdict {
            budget_target: None,
            variance_amount: None,
            variance_pct: None,
            alert_threshold_pct: None,
            status: BudgetStatus::Unbudgeted,
        };
    };

    let variance_amount = actual_total - budget.monthly_target;

    if budget.monthly_target.is_zero() {
        // Any spend over a zero target is an unbounded overrun; a
        // percentage would be a division by zero.
        let (variance_pct, status) = if actual_total.is_zero() {
            (Some(Decimal::ZERO), BudgetStatus::WithinBudget)
        } else {
            (None, BudgetStatus::Overrun)
        };
        return Verdict {
            budget_target: Some(budget.monthly_target),
            variance_amount: Some(variance_amount),
            variance_pct,
            alert_threshold_pct: Some(budget.alert_threshold_pct),
            status,
        };
    }

    let raw_pct = variance_amount / budget.monthly_target * Decimal::from(100);
    // Classification uses the unrounded percentage; the rounded value is
    // for reporting only.
    let status = if raw_pct > budget.alert_threshold_pct {
        BudgetStatus::Overrun
    } else if raw_pct > Decimal::ZERO {
        BudgetStatus::Warning
    } else {
        BudgetStatus::WithinBudget
    };

    Verdict {
        budget_target: Some(budget.monthly_target),
        variance_amount: Some(variance_amount),
        variance_pct: Some(raw_pct.round_dp(2)),
        alert_threshold_pct: Some(budget.alert_threshold_pct),
        status,
    }
}

/// Ranks a unit's services descending by spend, ties broken by service name
/// lexical order for determinism, truncated to `count`.
fn top_drivers(
    service_totals: &BTreeMap<(&str, &str), Decimal>,
    business_unit: &str,
    count: usize,
) -> Vec<TopDriver> {
    let mut drivers: Vec<TopDriver> = service_totals
        .iter()
        .filter(|((unit, _), _)| *unit == business_unit)
        .map(|((_, service), amount)| TopDriver {
            service_name: service.to_string(),
            amount: *amount,
        })
        .collect();

    drivers.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.service_name.cmp(&b.service_name))
    });
    drivers.truncate(count);
    drivers
}
