//! Request types for the reconciliation engine API.
//!
//! This module defines the JSON request structure for the `/reconcile`
//! endpoint.

use serde::{Deserialize, Serialize};

use crate::models::{AggregatedLedgerEntry, CostRecord, Period};

/// Request body for POST /reconcile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// The billing period being reconciled, as `YYYY-MM`.
    pub period: Period,
    /// The period's raw cost records.
    pub records: Vec<CostRecord>,
    /// The prior period's aggregated ledger, used for anomaly detection.
    /// May be omitted when no baseline exists.
    #[serde(default)]
    pub baseline: Vec<AggregatedLedgerEntry>,
}
