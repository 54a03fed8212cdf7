//! Audit recording.
//!
//! Produces the deterministic, checksummed record of a run and persists it
//! to an append-only log. The checksums are computed over canonicalized
//! data: input records are sorted and their amounts normalized before
//! hashing, so two runs over the same input multiset always produce the
//! same digests no matter what order the Cost Source delivered records in.
//! When finance asks "is this the same data you showed us last week?", the
//! checksum is the answer.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AggregatedLedgerEntry, AnomalyFlag, AuditRecord, CostRecord, Period, ReconciliationFinding,
    RecordCounts,
};

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

/// Computes the SHA-256 checksum over the canonicalized input cost records.
///
/// Records are cloned, amounts normalized (so `10.50` and `10.5000` hash
/// identically), sorted by the full field tuple, and serialized as JSON
/// before hashing.
pub fn input_checksum(records: &[CostRecord]) -> String {
    let mut canonical: Vec<CostRecord> = records
        .iter()
        .map(|r| CostRecord {
            amount: r.amount.normalize(),
            ..r.clone()
        })
        .collect();

    canonical.sort_by(|a, b| {
        (&a.account_id, &a.service_name, a.usage_date, a.amount, &a.currency).cmp(&(
            &b.account_id,
            &b.service_name,
            b.usage_date,
            b.amount,
            &b.currency,
        ))
    });

    let json = serde_json::to_vec(&canonical).expect("cost records always serialize");
    hex_digest(&json)
}

/// Computes the SHA-256 checksum over the output findings.
///
/// Findings arrive from the Reconciler already deterministically ordered,
/// so no re-sorting is needed.
pub fn output_checksum(findings: &[ReconciliationFinding]) -> String {
    let json = serde_json::to_vec(findings).expect("findings always serialize");
    hex_digest(&json)
}

/// Builds the audit record for a completed run.
///
/// Reads the final outputs of the other components without mutating any of
/// them; the recorder is a pure observer.
pub fn record_run(
    period: Period,
    records: &[CostRecord],
    ledger: &[AggregatedLedgerEntry],
    findings: &[ReconciliationFinding],
    anomalies: &[AnomalyFlag],
    unmapped_account_count: usize,
    processing_duration: Duration,
) -> AuditRecord {
    AuditRecord {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        period,
        input_checksum: input_checksum(records),
        output_checksum: output_checksum(findings),
        record_counts: RecordCounts {
            cost_records: records.len(),
            ledger_entries: ledger.len(),
            findings: findings.len(),
            anomaly_flags: anomalies.len(),
        },
        unmapped_account_count,
        processing_duration_us: processing_duration.as_micros() as u64,
    }
}

/// An append-only audit log: one JSON line per run, ordered by append time.
///
/// This is the only state the engine needs persisted across runs. Existing
/// entries are never rewritten; `append` only ever adds to the end of the
/// file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Creates a handle to the audit log at the given path. The file is
    /// created on first append.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log's file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends exactly one record to the log.
    ///
    /// Failures are reported as [`EngineError::AuditPersistence`]; callers
    /// surface them without discarding the run's computed findings.
    pub fn append(&self, record: &AuditRecord) -> EngineResult<()> {
        let line = serde_json::to_string(record).map_err(|e| EngineError::AuditPersistence {
            message: e.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EngineError::AuditPersistence {
                message: format!("{}: {}", self.path.display(), e),
            })?;

        writeln!(file, "{}", line).map_err(|e| EngineError::AuditPersistence {
            message: format!("{}: {}", self.path.display(), e),
        })
    }

    /// Loads all records in append order. A missing file is an empty log.
    pub fn load(&self) -> EngineResult<Vec<AuditRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(EngineError::AuditPersistence {
                    message: format!("{}: {}", self.path.display(), e),
                });
            }
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| EngineError::AuditPersistence {
                    message: format!("corrupt audit entry: {}", e),
                })
            })
            .collect()
    }

    /// Finds the most recent run over a given canonical input.
    ///
    /// This is the idempotence verification hook: if a record with the same
    /// input checksum exists, this exact input has been processed before.
    pub fn find_by_input_checksum(&self, checksum: &str) -> EngineResult<Option<AuditRecord>> {
        let records = self.load()?;
        Ok(records
            .into_iter()
            .rev()
            .find(|r| r.input_checksum == checksum))
    }
}
