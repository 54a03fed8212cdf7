//! Configuration for the Reconciliation & Audit Engine.
//!
//! Account mappings, budgets, and engine settings are loaded from YAML files
//! into strongly-typed, validated structs. All numeric invariants are checked
//! here at load time; the engine components downstream consume the
//! configuration as trusted input and never re-validate.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AccountMapping, AccountsConfig, BudgetConfig, BudgetsConfig, EngineConfig, EngineSettings,
};
