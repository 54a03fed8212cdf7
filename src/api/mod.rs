//! HTTP API module for the reconciliation engine.
//!
//! This module provides the REST endpoint for running a budget
//! reconciliation over a period's cost records.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::ReconcileRequest;
pub use response::{ApiError, ReconcileResponse};
pub use state::AppState;
