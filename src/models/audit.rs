//! Audit record model.
//!
//! Exactly one [`AuditRecord`] is produced per run. It captures checksums of
//! the canonicalized inputs and outputs plus processing metadata, so two runs
//! over identical inputs always produce identical checksums regardless of the
//! order records arrived in. Records are append-only once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Period;

/// Counts of the records flowing into and out of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    /// Raw cost records received from the Cost Source.
    pub cost_records: usize,
    /// Aggregated ledger entries produced by the normalizer.
    pub ledger_entries: usize,
    /// Reconciliation findings produced by the reconciler.
    pub findings: usize,
    /// Anomaly flags emitted by the detector.
    pub anomaly_flags: usize,
}

/// The tamper-evident record of one reconciliation run.
///
/// `input_checksum` and `output_checksum` are SHA-256 digests over the
/// canonicalized (sorted, normalized) cost records and findings; they are
/// the formal idempotence guarantee. `run_id` and `timestamp` vary per run
/// by design and are excluded from both digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The period that was reconciled.
    pub period: Period,
    /// SHA-256 over the canonicalized input cost records, lowercase hex.
    pub input_checksum: String,
    /// SHA-256 over the canonicalized output findings, lowercase hex.
    pub output_checksum: String,
    /// Input and output record counts.
    pub record_counts: RecordCounts,
    /// Number of distinct account ids with spend but no mapping.
    pub unmapped_account_count: usize,
    /// Engine processing time in microseconds.
    pub processing_duration_us: u64,
}
