//! The end-to-end reconciliation pipeline.
//!
//! Orders the engine stages for a single run: validate the input batch, map
//! accounts, aggregate into the canonical ledger, detect anomalies against
//! the baseline, reconcile against budgets, and record the audit trail.
//! Every stage is a pure function of its inputs, so the whole run is
//! deterministic for a given (records, baseline, config, period) tuple.

use std::time::Instant;

use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{
    AggregatedLedgerEntry, AnomalyFlag, AuditRecord, CostRecord, Period, ReconciliationFinding,
};

use super::anomaly::detect_anomalies;
use super::audit::record_run;
use super::mapper::AccountMapper;
use super::normalizer::{aggregate, validate_records};
use super::reconciler::reconcile;

/// Everything a single reconciliation run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The billing period reconciled.
    pub period: Period,
    /// The canonical aggregated ledger.
    pub ledger: Vec<AggregatedLedgerEntry>,
    /// One finding per business unit, sorted by unit.
    pub findings: Vec<ReconciliationFinding>,
    /// All anomaly flags for the run.
    pub anomalies: Vec<AnomalyFlag>,
    /// The audit record for the run. Its checksums cover the run's input
    /// and findings; its `run_id` identifies the run everywhere else.
    pub audit: AuditRecord,
}

/// Runs a full reconciliation over one period's cost records.
///
/// `baseline` is the prior period's aggregated ledger, used only for
/// anomaly detection; pass an empty slice when no baseline exists (every
/// current pair is then treated as new spend).
///
/// The batch is validated up front and rejected whole on the first invalid
/// record. Persisting the resulting audit record is the caller's concern,
/// so a storage failure can never discard computed findings.
pub fn run_reconciliation(
    records: &[CostRecord],
    baseline: &[AggregatedLedgerEntry],
    config: &EngineConfig,
    period: Period,
) -> EngineResult<RunOutput> {
    let started = Instant::now();

    validate_records(records)?;
    info!(%period, record_count = records.len(), "Input batch validated");

    let mut mapper = AccountMapper::new(config.accounts());
    let ledger = aggregate(records, &mut mapper);
    info!(
        ledger_entries = ledger.len(),
        unmapped_accounts = mapper.unmapped_accounts().len(),
        "Ledger aggregated"
    );

    let anomalies = detect_anomalies(
        &ledger,
        baseline,
        config.settings().anomaly_threshold_pct,
    );

    let findings = reconcile(
        &ledger,
        config.budgets(),
        &anomalies,
        mapper.unmapped_accounts(),
        period,
        config.settings().top_driver_count,
    );

    let audit = record_run(
        period,
        records,
        &ledger,
        &findings,
        &anomalies,
        mapper.unmapped_accounts().len(),
        started.elapsed(),
    );
    info!(
        run_id = %audit.run_id,
        findings = findings.len(),
        anomaly_flags = anomalies.len(),
        duration_us = audit.processing_duration_us,
        "Reconciliation complete"
    );

    Ok(RunOutput {
        period,
        ledger,
        findings,
        anomalies,
        audit,
    })
}
