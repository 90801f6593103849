//! Access policy: ranked privilege levels backed by caller predicates.
//!
//! Lower rank means more privilege. Resolution walks levels from most to
//! least privileged and settles on the first whose predicate holds; callers
//! that satisfy none land on the implicit [`GENERAL`] level, which is always
//! the least privileged.
//!
//! Predicates may hit storage. Nothing is cached, so every dispatch sees
//! the grants as they are right now.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use sigil_foundation::{Caller, Error, ErrorKind, Result};
use sigil_storage::GrantStore;

/// Label of the implicit least-privileged level.
pub const GENERAL: &str = "general";

/// A side-effect-free test over a caller's identity.
pub trait AccessPredicate: Send + Sync {
    /// Returns true if `caller` holds this level.
    ///
    /// # Errors
    ///
    /// Returns an error if a backing lookup fails.
    fn holds(&self, caller: &Caller) -> Result<bool>;
}

impl<F> AccessPredicate for F
where
    F: Fn(&Caller) -> Result<bool> + Send + Sync,
{
    fn holds(&self, caller: &Caller) -> Result<bool> {
        self(caller)
    }
}

/// A named, ranked privilege level.
#[derive(Clone)]
pub struct AccessLevel {
    label: String,
    rank: u32,
    predicate: Option<Arc<dyn AccessPredicate>>,
}

impl AccessLevel {
    /// Returns the level's label, lowercased.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the level's rank. Lower is more privileged.
    #[must_use]
    pub const fn rank(&self) -> u32 {
        self.rank
    }

    /// Returns true for the implicit general level.
    #[must_use]
    pub fn is_general(&self) -> bool {
        self.predicate.is_none()
    }

    /// Returns true if this level is at least as privileged as `required`.
    #[must_use]
    pub const fn satisfies(&self, required: &AccessLevel) -> bool {
        self.rank <= required.rank
    }
}

impl fmt::Debug for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessLevel")
            .field("label", &self.label)
            .field("rank", &self.rank)
            .finish_non_exhaustive()
    }
}

impl PartialEq for AccessLevel {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.rank == other.rank
    }
}

/// Collects levels before the policy is frozen.
#[derive(Default)]
pub struct AccessPolicyBuilder {
    levels: Vec<AccessLevel>,
}

impl AccessPolicyBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a level backed by a shared predicate.
    ///
    /// # Errors
    ///
    /// Returns an error if `label` is empty, reserved, or already registered.
    pub fn register(
        &mut self,
        label: &str,
        rank: u32,
        predicate: Arc<dyn AccessPredicate>,
    ) -> Result<&mut Self> {
        let label = label.trim().to_lowercase();
        if label.is_empty() || label == GENERAL {
            return Err(Error::new(ErrorKind::DuplicateAccessLevel(label)));
        }
        if self.levels.iter().any(|l| l.label == label) {
            return Err(Error::new(ErrorKind::DuplicateAccessLevel(label)));
        }
        self.levels.push(AccessLevel {
            label,
            rank,
            predicate: Some(predicate),
        });
        Ok(self)
    }

    /// Registers a level backed by a closure.
    ///
    /// # Errors
    ///
    /// Returns an error if `label` is empty, reserved, or already registered.
    pub fn register_access_level<F>(&mut self, label: &str, rank: u32, predicate: F) -> Result<&mut Self>
    where
        F: Fn(&Caller) -> Result<bool> + Send + Sync + 'static,
    {
        self.register(label, rank, Arc::new(predicate))
    }

    /// Registers a level backed by a predicate object.
    ///
    /// # Errors
    ///
    /// Returns an error if `label` is empty, reserved, or already registered.
    pub fn register_access_level_with(
        &mut self,
        label: &str,
        rank: u32,
        predicate: impl AccessPredicate + 'static,
    ) -> Result<&mut Self> {
        self.register(label, rank, Arc::new(predicate))
    }

    /// Freezes the registered levels into a policy.
    ///
    /// Levels sharing a rank keep their registration order.
    #[must_use]
    pub fn build(self) -> AccessPolicy {
        let mut levels = self.levels;
        levels.sort_by_key(|l| l.rank);
        AccessPolicy {
            levels,
            general: AccessLevel {
                label: GENERAL.to_string(),
                rank: u32::MAX,
                predicate: None,
            },
        }
    }
}

/// The frozen, ordered set of access levels.
pub struct AccessPolicy {
    levels: Vec<AccessLevel>,
    general: AccessLevel,
}

impl AccessPolicy {
    /// Starts a new builder.
    #[must_use]
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::new()
    }

    /// Returns the implicit general level.
    #[must_use]
    pub const fn general(&self) -> &AccessLevel {
        &self.general
    }

    /// Returns registered levels, most privileged first, then general.
    pub fn levels(&self) -> impl Iterator<Item = &AccessLevel> {
        self.levels.iter().chain(std::iter::once(&self.general))
    }

    /// Looks up a level by label. Lookup is case-insensitive.
    #[must_use]
    pub fn level(&self, label: &str) -> Option<&AccessLevel> {
        let label = label.trim().to_lowercase();
        self.levels().find(|l| l.label == label)
    }

    /// Returns true if `label` names a registered level or general.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.level(label).is_some()
    }

    /// Resolves `caller`'s effective level.
    ///
    /// A predicate that fails is treated as not holding, so a storage
    /// outage can only lower a caller's level.
    #[must_use]
    pub fn resolve(&self, caller: &Caller) -> &AccessLevel {
        for level in &self.levels {
            let Some(predicate) = &level.predicate else {
                continue;
            };
            match predicate.holds(caller) {
                Ok(true) => return level,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        caller = %caller.id,
                        level = %level.label,
                        error = %e,
                        "access predicate failed"
                    );
                }
            }
        }
        &self.general
    }

    /// Returns true if `caller` is at least as privileged as `required`.
    ///
    /// # Errors
    ///
    /// Returns an error if `required` is not a known label.
    pub fn authorize(&self, caller: &Caller, required: &str) -> Result<bool> {
        let required = self
            .level(required)
            .ok_or_else(|| Error::unknown_access_level(required))?;
        Ok(self.resolve(caller).satisfies(required))
    }

    /// Returns true if `actor` is at least as privileged as `target`.
    #[must_use]
    pub fn sufficient(&self, actor: &Caller, target: &Caller) -> bool {
        self.resolve(actor).satisfies(self.resolve(target))
    }
}

impl fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.levels()).finish()
    }
}

/// Holds for callers whose stored grant names a given label.
pub struct GrantPredicate {
    store: Arc<dyn GrantStore>,
    label: String,
}

impl GrantPredicate {
    /// Creates a predicate over `store` for `label`.
    #[must_use]
    pub fn new(store: Arc<dyn GrantStore>, label: impl Into<String>) -> Self {
        Self {
            store,
            label: label.into().to_lowercase(),
        }
    }
}

impl AccessPredicate for GrantPredicate {
    fn holds(&self, caller: &Caller) -> Result<bool> {
        Ok(self
            .store
            .grant(&caller.id)?
            .is_some_and(|label| label.eq_ignore_ascii_case(&self.label)))
    }
}

/// Holds for a fixed set of caller ids.
#[derive(Clone, Debug, Default)]
pub struct IdListPredicate {
    ids: HashSet<String>,
}

impl IdListPredicate {
    /// Creates a predicate over `ids`.
    #[must_use]
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl AccessPredicate for IdListPredicate {
    fn holds(&self, caller: &Caller) -> Result<bool> {
        Ok(self.ids.contains(&caller.id))
    }
}
