//! Error types for the Reconciliation & Audit Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during a reconciliation run.

use thiserror::Error;

/// The main error type for the Reconciliation & Audit Engine.
///
/// Only configuration and record-ingest errors prevent a run from producing
/// a result. Recoverable conditions (unmapped accounts, unbudgeted business
/// units) never appear here; they surface as flags in the run output instead.
///
/// # Example
///
/// ```
/// use recon_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/budgets.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/budgets.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A budget entry violated its numeric invariants.
    #[error("Invalid budget for business unit '{business_unit}': {message}")]
    InvalidBudget {
        /// The business unit whose budget is invalid.
        business_unit: String,
        /// A description of what made the budget invalid.
        message: String,
    },

    /// An account mapping entry was malformed.
    #[error("Invalid account mapping '{account_id}': {message}")]
    InvalidMapping {
        /// The account id of the malformed entry.
        account_id: String,
        /// A description of what made the mapping invalid.
        message: String,
    },

    /// A cost record in the input batch violated the Cost Source contract.
    #[error("Invalid cost record at index {index}: {message}")]
    InvalidRecord {
        /// The position of the record in the input batch.
        index: usize,
        /// A description of what made the record invalid.
        message: String,
    },

    /// A period string could not be parsed.
    #[error("Invalid period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The value that failed to parse.
        value: String,
    },

    /// The audit record could not be persisted.
    ///
    /// Non-fatal to reconciliation: findings are still returned to the
    /// caller, and the run is marked audit-incomplete.
    #[error("Audit persistence failed: {message}")]
    AuditPersistence {
        /// A description of the persistence failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/budgets.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/budgets.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_budget_displays_unit_and_message() {
        let error = EngineError::InvalidBudget {
            business_unit: "Engineering".to_string(),
            message: "monthly_target must not be negative".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid budget for business unit 'Engineering': monthly_target must not be negative"
        );
    }

    #[test]
    fn test_invalid_mapping_displays_account_and_message() {
        let error = EngineError::InvalidMapping {
            account_id: "123456789012".to_string(),
            message: "business_unit is empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid account mapping '123456789012': business_unit is empty"
        );
    }

    #[test]
    fn test_invalid_record_displays_index_and_message() {
        let error = EngineError::InvalidRecord {
            index: 7,
            message: "negative amount (-12.50)".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid cost record at index 7: negative amount (-12.50)"
        );
    }

    #[test]
    fn test_invalid_period_displays_value() {
        let error = EngineError::InvalidPeriod {
            value: "2025-13".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid period '2025-13': expected YYYY-MM");
    }

    #[test]
    fn test_audit_persistence_displays_message() {
        let error = EngineError::AuditPersistence {
            message: "permission denied".to_string(),
        };
        assert_eq!(error.to_string(), "Audit persistence failed: permission denied");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_config_not_found() -> EngineResult<()> {
            Err(EngineError::ConfigNotFound {
                path: "/test".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_config_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
