//! Anomaly detection.
//!
//! Flags period-over-period spend outliers per (business_unit, service_name)
//! pair, independent of budget configuration. This catches shape-of-spend
//! changes budgets alone would miss: a new, unbudgeted but budget-compliant
//! service suddenly dominating a unit's spend.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{AggregatedLedgerEntry, AnomalyFlag};

/// Compares current-period spend against the prior-period baseline.
///
/// Spend is totalled per (business_unit, service_name) pair over each
/// period. A pair missing from the baseline has a zero baseline. A flag is
/// emitted when the absolute deviation reaches `threshold_pct`; a zero
/// baseline with positive current spend is always flagged with an unbounded
/// (`None`) deviation rather than a division result. Output is sorted by
/// (business_unit, service_name).
pub fn detect_anomalies(
    ledger: &[AggregatedLedgerEntry],
    baseline: &[AggregatedLedgerEntry],
    threshold_pct: Decimal,
) -> Vec<AnomalyFlag> {
    let current_totals = pair_totals(ledger);
    let baseline_totals = pair_totals(baseline);

    let pairs: BTreeSet<&(String, String)> =
        current_totals.keys().chain(baseline_totals.keys()).collect();

    let mut flags = Vec::new();
    for pair in pairs {
        let observed = current_totals.get(pair).copied().unwrap_or(Decimal::ZERO);
        let baseline_amount = baseline_totals.get(pair).copied().unwrap_or(Decimal::ZERO);

        if baseline_amount.is_zero() {
            if observed > Decimal::ZERO {
                warn!(
                    business_unit = %pair.0,
                    service = %pair.1,
                    %observed,
                    "New spend with no baseline"
                );
                flags.push(AnomalyFlag {
                    business_unit: pair.0.clone(),
                    service_name: pair.1.clone(),
                    observed_amount: observed,
                    baseline_amount,
                    deviation_pct: None,
                });
            }
            continue;
        }

        let deviation = (observed - baseline_amount) / baseline_amount * Decimal::from(100);
        if deviation.abs() >= threshold_pct {
            flags.push(AnomalyFlag {
                business_unit: pair.0.clone(),
                service_name: pair.1.clone(),
                observed_amount: observed,
                baseline_amount,
                deviation_pct: Some(deviation.round_dp(2)),
            });
        }
    }

    flags
}

fn pair_totals(ledger: &[AggregatedLedgerEntry]) -> BTreeMap<(String, String), Decimal> {
    let mut totals = BTreeMap::new();
    for entry in ledger {
        *totals
            .entry((entry.business_unit.clone(), entry.service_name.clone()))
            .or_insert(Decimal::ZERO) += entry.amount;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn entry(unit: &str, service: &str, day: u32, amount: &str) -> AggregatedLedgerEntry {
        AggregatedLedgerEntry {
            business_unit: unit.to_string(),
            service_name: service.to_string(),
            usage_date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            amount: dec(amount),
        }
    }

    fn baseline_entry(unit: &str, service: &str, amount: &str) -> AggregatedLedgerEntry {
        AggregatedLedgerEntry {
            business_unit: unit.to_string(),
            service_name: service.to_string(),
            usage_date: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
            amount: dec(amount),
        }
    }

    /// AD-001: deviation at or above the threshold is flagged.
    #[test]
    fn test_large_increase_is_flagged() {
        let ledger = vec![entry("Engineering", "AmazonEC2", 3, "1500")];
        let baseline = vec![baseline_entry("Engineering", "AmazonEC2", "1000")];

        let flags = detect_anomalies(&ledger, &baseline, dec("50"));

        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].deviation_pct, Some(dec("50.00")));
        assert_eq!(flags[0].observed_amount, dec("1500"));
        assert_eq!(flags[0].baseline_amount, dec("1000"));
    }

    /// AD-002: deviation below the threshold is not flagged.
    #[test]
    fn test_small_change_not_flagged() {
        let ledger = vec![entry("Engineering", "AmazonEC2", 3, "1100")];
        let baseline = vec![baseline_entry("Engineering", "AmazonEC2", "1000")];

        let flags = detect_anomalies(&ledger, &baseline, dec("50"));
        assert!(flags.is_empty());
    }

    /// AD-003: zero baseline with positive spend is always flagged, with
    /// an unbounded deviation rather than a division error.
    #[test]
    fn test_zero_baseline_always_flagged() {
        let ledger = vec![entry("Platform", "AmazonSageMaker", 3, "500")];
        let baseline: Vec<AggregatedLedgerEntry> = vec![];

        // Threshold far above anything a ratio could produce; the zero
        // baseline path must flag regardless.
        let flags = detect_anomalies(&ledger, &baseline, dec("10000"));

        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].deviation_pct, None);
        assert_eq!(flags[0].observed_amount, dec("500"));
        assert_eq!(flags[0].baseline_amount, Decimal::ZERO);
    }

    /// AD-004: spend that disappeared is a negative deviation.
    #[test]
    fn test_dropped_spend_is_flagged_negative() {
        let ledger: Vec<AggregatedLedgerEntry> = vec![];
        let baseline = vec![baseline_entry("Engineering", "AmazonRedshift", "2000")];

        let flags = detect_anomalies(&ledger, &baseline, dec("50"));

        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].deviation_pct, Some(dec("-100.00")));
        assert_eq!(flags[0].observed_amount, Decimal::ZERO);
    }

    #[test]
    fn test_daily_entries_totalled_per_pair() {
        let ledger = vec![
            entry("Engineering", "AmazonEC2", 3, "400"),
            entry("Engineering", "AmazonEC2", 4, "400"),
            entry("Engineering", "AmazonEC2", 5, "400"),
        ];
        let baseline = vec![baseline_entry("Engineering", "AmazonEC2", "600")];

        let flags = detect_anomalies(&ledger, &baseline, dec("50"));

        // 1200 vs 600 is a 100% deviation.
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].deviation_pct, Some(dec("100.00")));
    }

    #[test]
    fn test_flags_sorted_by_unit_then_service() {
        let ledger = vec![
            entry("Platform", "AmazonEKS", 3, "900"),
            entry("Engineering", "AmazonS3", 3, "900"),
            entry("Engineering", "AmazonEC2", 3, "900"),
        ];
        let baseline = vec![
            baseline_entry("Platform", "AmazonEKS", "100"),
            baseline_entry("Engineering", "AmazonS3", "100"),
            baseline_entry("Engineering", "AmazonEC2", "100"),
        ];

        let flags = detect_anomalies(&ledger, &baseline, dec("50"));

        let keys: Vec<(&str, &str)> = flags
            .iter()
            .map(|f| (f.business_unit.as_str(), f.service_name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Engineering", "AmazonEC2"),
                ("Engineering", "AmazonS3"),
                ("Platform", "AmazonEKS"),
            ]
        );
    }

    #[test]
    fn test_zero_threshold_flags_any_change() {
        let ledger = vec![entry("Engineering", "AmazonEC2", 3, "1001")];
        let baseline = vec![baseline_entry("Engineering", "AmazonEC2", "1000")];

        let flags = detect_anomalies(&ledger, &baseline, Decimal::ZERO);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].deviation_pct, Some(dec("0.10")));
    }

    #[test]
    fn test_detection_is_independent_of_budgets() {
        // No budget anywhere in sight: the detector only sees ledgers.
        let ledger = vec![entry("Skunkworks", "AmazonBedrock", 3, "9000")];
        let baseline = vec![baseline_entry("Skunkworks", "AmazonBedrock", "100")];

        let flags = detect_anomalies(&ledger, &baseline, dec("50"));
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].deviation_pct, Some(dec("8900.00")));
    }
}
