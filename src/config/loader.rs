//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading account
//! mappings, budgets, and engine settings from YAML files. Every invariant
//! the engine relies on is enforced here, before a run starts; a
//! configuration that loads successfully is trusted downstream.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    AccountMapping, AccountsConfig, BudgetConfig, BudgetsConfig, EngineConfig, EngineSettings,
};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/billing/
/// ├── accounts.yaml   # Account to business-unit mappings
/// ├── budgets.yaml    # Monthly targets and alert thresholds
/// └── engine.yaml     # Optional engine tuning (thresholds, driver count)
/// ```
///
/// # Example
///
/// ```no_run
/// use recon_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/billing").unwrap();
/// let budgets = loader.config().budgets();
/// println!("{} budgeted business units", budgets.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/billing")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `accounts.yaml` or `budgets.yaml` is missing or invalid YAML
    /// - Any account mapping has an empty id, empty business unit, or a
    ///   duplicate id
    /// - Any budget has a negative target or a threshold outside [0, 100]
    /// - Engine settings are out of range
    ///
    /// `engine.yaml` is optional; defaults apply when it is absent.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let accounts_path = path.join("accounts.yaml");
        let accounts = Self::load_yaml::<AccountsConfig>(&accounts_path)?;

        let budgets_path = path.join("budgets.yaml");
        let budgets = Self::load_yaml::<BudgetsConfig>(&budgets_path)?;

        let settings_path = path.join("engine.yaml");
        let settings = if settings_path.exists() {
            Self::load_yaml::<EngineSettings>(&settings_path)?
        } else {
            EngineSettings::default()
        };

        validate_accounts(&accounts.payer_accounts)?;
        validate_budgets(&budgets.budgets)?;
        validate_settings(&settings)?;

        Ok(Self {
            config: EngineConfig::new(accounts.payer_accounts, budgets.budgets, settings),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the validated engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Gets the budget for a business unit, if one is configured.
    pub fn budget_for(&self, business_unit: &str) -> Option<&BudgetConfig> {
        self.config.budgets().get(business_unit)
    }
}

/// Rejects malformed mapping entries: empty ids, empty business units,
/// and duplicate ids.
fn validate_accounts(accounts: &[AccountMapping]) -> EngineResult<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for mapping in accounts {
        if mapping.account_id.trim().is_empty() {
            return Err(EngineError::InvalidMapping {
                account_id: mapping.account_id.clone(),
                message: "account id is empty".to_string(),
            });
        }
        if mapping.business_unit.trim().is_empty() {
            return Err(EngineError::InvalidMapping {
                account_id: mapping.account_id.clone(),
                message: "business_unit is empty".to_string(),
            });
        }
        if !seen.insert(mapping.account_id.as_str()) {
            return Err(EngineError::InvalidMapping {
                account_id: mapping.account_id.clone(),
                message: "duplicate account id".to_string(),
            });
        }
    }

    Ok(())
}

/// Enforces the budget numeric invariants: non-negative target,
/// threshold within [0, 100].
fn validate_budgets(budgets: &HashMap<String, BudgetConfig>) -> EngineResult<()> {
    let hundred = Decimal::from(100);

    for (business_unit, budget) in budgets {
        if budget.monthly_target < Decimal::ZERO {
            return Err(EngineError::InvalidBudget {
                business_unit: business_unit.clone(),
                message: format!(
                    "monthly_target must not be negative (got {})",
                    budget.monthly_target
                ),
            });
        }
        if budget.alert_threshold_pct < Decimal::ZERO || budget.alert_threshold_pct > hundred {
            return Err(EngineError::InvalidBudget {
                business_unit: business_unit.clone(),
                message: format!(
                    "alert_threshold_pct must be within [0, 100] (got {})",
                    budget.alert_threshold_pct
                ),
            });
        }
    }

    Ok(())
}

fn validate_settings(settings: &EngineSettings) -> EngineResult<()> {
    if settings.anomaly_threshold_pct < Decimal::ZERO {
        return Err(EngineError::ConfigParseError {
            path: "engine.yaml".to_string(),
            message: format!(
                "anomaly_threshold_pct must not be negative (got {})",
                settings.anomaly_threshold_pct
            ),
        });
    }
    if settings.top_driver_count == 0 {
        return Err(EngineError::ConfigParseError {
            path: "engine.yaml".to_string(),
            message: "top_driver_count must be at least 1".to_string(),
        });
    }

    Ok(())
}
