//! Application state for the reconciliation engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::engine::AuditLog;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// loaded engine configuration and, optionally, the audit log runs are
/// persisted to.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
    /// Where completed runs are appended. When absent, runs are computed
    /// but not persisted.
    audit_log: Option<Arc<AuditLog>>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader
    /// and no audit persistence.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
            audit_log: None,
        }
    }

    /// Attaches an audit log; completed runs will be appended to it.
    pub fn with_audit_log(mut self, audit_log: AuditLog) -> Self {
        self.audit_log = Some(Arc::new(audit_log));
        self
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the audit log, if one is attached.
    pub fn audit_log(&self) -> Option<&AuditLog> {
        self.audit_log.as_deref()
    }
}
