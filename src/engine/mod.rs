//! Core reconciliation logic.
//!
//! This module contains the five components of the engine: account mapping,
//! cost normalization, budget reconciliation, anomaly detection, and audit
//! recording, plus the pipeline that runs them as a single deterministic
//! pass. Control flows strictly forward; no component re-invokes an
//! upstream one.

mod anomaly;
mod audit;
mod mapper;
mod normalizer;
mod pipeline;
mod reconciler;

pub use anomaly::detect_anomalies;
pub use audit::{AuditLog, input_checksum, output_checksum, record_run};
pub use mapper::{AccountMapper, UNMAPPED_BUSINESS_UNIT};
pub use normalizer::{aggregate, validate_records};
pub use pipeline::{RunOutput, run_reconciliation};
pub use reconciler::reconcile;
