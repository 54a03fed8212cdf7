//! Domain models for the Reconciliation & Audit Engine.
//!
//! This module contains the data types flowing through the engine: raw cost
//! records, reporting periods, the aggregated ledger, reconciliation findings
//! with anomaly flags, and the audit record produced for every run.

mod audit;
mod cost_record;
mod finding;
mod ledger;
mod period;

pub use audit::{AuditRecord, RecordCounts};
pub use cost_record::CostRecord;
pub use finding::{AnomalyFlag, BudgetStatus, ReconciliationFinding, TopDriver};
pub use ledger::AggregatedLedgerEntry;
pub use period::Period;
