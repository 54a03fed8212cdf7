//! Cost normalization.
//!
//! Deduplicates and aggregates raw per-account, per-service, per-day cost
//! records into the canonical per-(business_unit, service_name, usage_date)
//! ledger. Summation is exact decimal arithmetic, and the grouping key fully
//! determines each bucket, so the output is identical for any ordering of
//! the same input multiset.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AggregatedLedgerEntry, CostRecord};

use super::mapper::AccountMapper;

/// Validates a cost-record batch at the engine's ingress boundary.
///
/// The Cost Source contract promises non-negative amounts, non-empty account
/// ids, and a single currency per run; a batch that violates it is rejected
/// whole rather than aggregated through. Every rejection names the offending
/// record index.
pub fn validate_records(records: &[CostRecord]) -> EngineResult<()> {
    let mut run_currency: Option<&str> = None;

    for (index, record) in records.iter().enumerate() {
        if record.account_id.trim().is_empty() {
            return Err(EngineError::InvalidRecord {
                index,
                message: "account_id is empty".to_string(),
            });
        }
        if record.amount < Decimal::ZERO {
            return Err(EngineError::InvalidRecord {
                index,
                message: format!("negative amount ({})", record.amount),
            });
        }
        match run_currency {
            None => run_currency = Some(&record.currency),
            Some(currency) if currency != record.currency => {
                return Err(EngineError::InvalidRecord {
                    index,
                    message: format!(
                        "mixed currencies in one run ({} vs {})",
                        currency, record.currency
                    ),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Aggregates cost records into the canonical ledger.
///
/// Records are grouped by (business unit via the mapper, service, usage
/// date) with amounts summed exactly. Nothing is discarded: records for
/// unmapped accounts aggregate under the reserved
/// [`UNMAPPED_BUSINESS_UNIT`](super::UNMAPPED_BUSINESS_UNIT) bucket, so the
/// sum over the output always equals the sum over the input.
///
/// The returned entries are sorted by the grouping key.
pub fn aggregate(records: &[CostRecord], mapper: &mut AccountMapper) -> Vec<AggregatedLedgerEntry> {
    let mut buckets: BTreeMap<(String, String, NaiveDate), Decimal> = BTreeMap::new();

    for record in records {
        let business_unit = mapper.business_unit_for(&record.account_id).to_string();
        let key = (business_unit, record.service_name.clone(), record.usage_date);
        *buckets.entry(key).or_insert(Decimal::ZERO) += record.amount;
    }

    buckets
        .into_iter()
        .map(
            |((business_unit, service_name, usage_date), amount)| AggregatedLedgerEntry {
                business_unit,
                service_name,
                usage_date,
                amount,
            },
        )
        .collect()
}
