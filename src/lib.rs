//! Reconciliation & Audit Engine for multi-payer cloud billing
//!
//! This crate turns raw per-account daily cost records into business-unit-level
//! variance findings, anomaly flags, and a tamper-evident audit record. Fetching
//! cost data, rendering reports, and credential handling live in external
//! collaborators; the engine itself is a pure transformation over immutable inputs.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
