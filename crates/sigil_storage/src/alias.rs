//! Alias records and the alias table contract.

use sigil_foundation::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One row of the alias table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AliasRecord {
    /// The alias token as it was first written.
    pub alias: String,
    /// The command line the alias expands to.
    pub target: String,
    /// Disabled records are kept but never resolved.
    pub enabled: bool,
}

impl AliasRecord {
    /// Creates an enabled record.
    #[must_use]
    pub fn new(alias: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            target: target.into(),
            enabled: true,
        }
    }
}

/// Normalizes an alias token into its lookup key.
#[must_use]
pub fn alias_key(alias: &str) -> String {
    alias.trim().to_lowercase()
}

/// Durable alias table.
///
/// Lookups are case-insensitive. Writes replace the whole record; there is
/// no versioning and the last write wins.
pub trait AliasStore: Send + Sync {
    /// Loads the record for `alias`, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn alias(&self, alias: &str) -> Result<Option<AliasRecord>>;

    /// Inserts or replaces the record keyed by `record.alias`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn put_alias(&self, record: AliasRecord) -> Result<()>;

    /// Returns every record, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn aliases(&self) -> Result<Vec<AliasRecord>>;
}
