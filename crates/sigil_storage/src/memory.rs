//! In-memory alias and grant tables.
//!
//! Tables are persistent maps behind a lock, so taking a snapshot for
//! persistence is O(1) and never blocks writers for long.

use std::sync::atomic::{AtomicU64, Ordering};

use im::OrdMap;
use parking_lot::RwLock;
use sigil_foundation::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alias::{AliasRecord, AliasStore, alias_key};
use crate::grant::GrantStore;

/// A point-in-time copy of every table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoreSnapshot {
    /// Alias records keyed by [`alias_key`].
    pub aliases: OrdMap<String, AliasRecord>,
    /// Grants keyed by caller id.
    pub grants: OrdMap<String, String>,
}

impl StoreSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Thread-safe in-memory store.
///
/// Concurrent readers and writers interleave freely; there is no snapshot
/// isolation between a lookup and a later write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<StoreSnapshot>,
    revision: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store initialized from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
            revision: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the current tables.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.tables.read().clone()
    }

    /// Replaces every table with `snapshot`.
    pub fn restore(&self, snapshot: StoreSnapshot) {
        *self.tables.write() = snapshot;
        self.bump();
    }

    /// Returns a counter that increases on every write.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

impl AliasStore for MemoryStore {
    fn alias(&self, alias: &str) -> Result<Option<AliasRecord>> {
        Ok(self.tables.read().aliases.get(&alias_key(alias)).cloned())
    }

    fn put_alias(&self, record: AliasRecord) -> Result<()> {
        let key = alias_key(&record.alias);
        self.tables.write().aliases.insert(key, record);
        self.bump();
        Ok(())
    }

    fn aliases(&self) -> Result<Vec<AliasRecord>> {
        Ok(self.tables.read().aliases.values().cloned().collect())
    }
}

impl GrantStore for MemoryStore {
    fn grant(&self, caller_id: &str) -> Result<Option<String>> {
        Ok(self.tables.read().grants.get(caller_id).cloned())
    }

    fn put_grant(&self, caller_id: &str, label: &str) -> Result<()> {
        self.tables
            .write()
            .grants
            .insert(caller_id.to_string(), label.to_string());
        self.bump();
        Ok(())
    }

    fn revoke(&self, caller_id: &str) -> Result<bool> {
        let removed = self.tables.write().grants.remove(caller_id).is_some();
        if removed {
            self.bump();
        }
        Ok(removed)
    }

    fn grants(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .tables
            .read()
            .grants
            .iter()
            .map(|(id, label)| (id.clone(), label.clone()))
            .collect())
    }
}
