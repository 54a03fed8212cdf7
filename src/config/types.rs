//! Configuration types for the reconciliation engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Maps one linked account to its organisational metadata.
///
/// Loaded once per run; immutable for the run's duration. Every account id
/// referenced by a cost record either resolves to exactly one mapping or is
/// explicitly captured as unmapped.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountMapping {
    /// The 12-digit linked account id.
    #[serde(rename = "id")]
    pub account_id: String,
    /// Human-readable account name.
    #[serde(default)]
    pub name: String,
    /// The business unit the account's spend is allocated to.
    pub business_unit: String,
    /// The cost centre code for chargeback.
    #[serde(default)]
    pub cost_centre: String,
    /// The person accountable for the account's spend.
    #[serde(default)]
    pub owner: String,
}

/// Account mapping configuration file structure (`accounts.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// All known payer/linked account mappings.
    pub payer_accounts: Vec<AccountMapping>,
}

fn default_alert_threshold() -> Decimal {
    Decimal::from(10)
}

/// Budget expectations for one business unit.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// The monthly spend target. Must be non-negative.
    pub monthly_target: Decimal,
    /// Variance percentage beyond which status becomes overrun.
    /// Must be within [0, 100]. Defaults to 10.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold_pct: Decimal,
}

/// Budget configuration file structure (`budgets.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetsConfig {
    /// Map of business unit to its budget.
    pub budgets: HashMap<String, BudgetConfig>,
}

fn default_anomaly_threshold() -> Decimal {
    Decimal::from(50)
}

fn default_top_driver_count() -> usize {
    5
}

/// Tunable engine settings (`engine.yaml`, optional).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Absolute period-over-period deviation percentage at or above which
    /// an anomaly flag is emitted. Defaults to 50.
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold_pct: Decimal,
    /// How many top cost drivers each finding carries. Defaults to 5.
    #[serde(default = "default_top_driver_count")]
    pub top_driver_count: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            anomaly_threshold_pct: default_anomaly_threshold(),
            top_driver_count: default_top_driver_count(),
        }
    }
}

/// The complete validated engine configuration.
///
/// Aggregates account mappings, budgets, and settings loaded from the
/// configuration directory. Construction happens only through
/// [`ConfigLoader`](super::ConfigLoader), which enforces all invariants.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Account mappings, keyed lookup is built by the Account Mapper.
    accounts: Vec<AccountMapping>,
    /// Budgets by business unit.
    budgets: HashMap<String, BudgetConfig>,
    /// Engine settings.
    settings: EngineSettings,
}

impl EngineConfig {
    /// Creates an EngineConfig from its component parts.
    ///
    /// Callers are expected to have validated the parts; the loader is the
    /// only production construction site.
    pub fn new(
        accounts: Vec<AccountMapping>,
        budgets: HashMap<String, BudgetConfig>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            accounts,
            budgets,
            settings,
        }
    }

    /// Returns all account mappings.
    pub fn accounts(&self) -> &[AccountMapping] {
        &self.accounts
    }

    /// Returns budgets by business unit.
    pub fn budgets(&self) -> &HashMap<String, BudgetConfig> {
        &self.budgets
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}
