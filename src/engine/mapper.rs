//! Account to business-unit resolution.
//!
//! The [`AccountMapper`] resolves linked account ids to their configured
//! organisational metadata. An account with no mapping is not a failure:
//! the lookup returns `None`, the id is accumulated for the run's audit
//! output, and the caller buckets the spend under
//! [`UNMAPPED_BUSINESS_UNIT`]. The accumulator lives on the mapper itself,
//! so concurrent runs for different periods stay independent.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::config::AccountMapping;

/// Reserved business unit for spend whose account has no mapping.
pub const UNMAPPED_BUSINESS_UNIT: &str = "UNMAPPED";

/// Resolves account ids to mappings and accumulates unmapped ids.
///
/// Resolution is a pure lookup: identical mapping config and account id
/// always yield the same result, never defaulted or fuzzy-matched.
///
/// # Example
///
/// ```
/// use recon_engine::config::AccountMapping;
/// use recon_engine::engine::AccountMapper;
///
/// let mappings = vec![AccountMapping {
///     account_id: "111122223333".to_string(),
///     name: "eng-prod".to_string(),
///     business_unit: "Engineering".to_string(),
///     cost_centre: "CC-100".to_string(),
///     owner: "jamie@example.com".to_string(),
/// }];
///
/// let mut mapper = AccountMapper::new(&mappings);
/// assert!(mapper.resolve("111122223333").is_some());
/// assert!(mapper.resolve("999999999999").is_none());
/// assert!(mapper.unmapped_accounts().contains("999999999999"));
/// ```
#[derive(Debug, Clone)]
pub struct AccountMapper {
    index: HashMap<String, AccountMapping>,
    unmapped: BTreeSet<String>,
}

impl AccountMapper {
    /// Builds a mapper from validated account mappings.
    pub fn new(mappings: &[AccountMapping]) -> Self {
        let index = mappings
            .iter()
            .map(|m| (m.account_id.clone(), m.clone()))
            .collect();

        Self {
            index,
            unmapped: BTreeSet::new(),
        }
    }

    /// Resolves an account id to its mapping.
    ///
    /// Returns `None` for unmapped accounts and records the id in the
    /// run's unmapped set. The run never aborts on unmapped accounts.
    pub fn resolve(&mut self, account_id: &str) -> Option<&AccountMapping> {
        if self.index.contains_key(account_id) {
            return self.index.get(account_id);
        }

        if self.unmapped.insert(account_id.to_string()) {
            warn!(account_id, "Unmapped account");
        }
        None
    }

    /// Resolves an account id to its business unit, or the reserved
    /// [`UNMAPPED_BUSINESS_UNIT`] bucket.
    pub fn business_unit_for(&mut self, account_id: &str) -> &str {
        match self.resolve(account_id) {
            Some(mapping) => &mapping.business_unit,
            None => UNMAPPED_BUSINESS_UNIT,
        }
    }

    /// Returns the account ids seen so far that had no mapping.
    pub fn unmapped_accounts(&self) -> &BTreeSet<String> {
        &self.unmapped
    }
}
