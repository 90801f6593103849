//! Alias resolution.
//!
//! An alias maps a verb token to a replacement command line. Resolution is
//! exactly one level deep: the rewritten line is never looked up again.
//!
//! Targets may contain positional markers `{0}`, `{1}`, ... which are
//! filled from the whitespace-delimited words that followed the alias.
//! Targets without markers get the raw remainder of the line appended.

use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use sigil_foundation::{Error, ErrorKind, Result};
use sigil_storage::{AliasRecord, AliasStore};

use crate::tokenizer::CommandLine;

static POSITIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("static regex must compile"));

/// What an [`AliasResolver::add`] call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AliasChange {
    /// A new alias was created.
    Added,
    /// An existing record was overwritten and enabled.
    Updated,
    /// An enabled alias already exists; nothing was written.
    Unchanged(AliasRecord),
}

/// Rewrites command lines through the alias table.
#[derive(Clone)]
pub struct AliasResolver {
    store: Arc<dyn AliasStore>,
}

impl AliasResolver {
    /// Creates a resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AliasStore>) -> Self {
        Self { store }
    }

    /// Defines `alias` as `target`.
    ///
    /// An enabled alias is only replaced when `force` is set. A disabled one
    /// is always replaced and re-enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if `alias` is not a single token, `target` is blank,
    /// or the store fails.
    pub fn add(&self, alias: &str, target: &str, force: bool) -> Result<AliasChange> {
        let alias = alias.trim();
        let target = target.trim();
        if alias.is_empty() || alias.contains(char::is_whitespace) {
            return Err(Error::new(ErrorKind::InvalidAlias(format!(
                "alias must be a single token, got '{alias}'"
            ))));
        }
        if target.is_empty() {
            return Err(Error::new(ErrorKind::InvalidAlias(format!(
                "'{alias}' needs a target"
            ))));
        }

        let change = match self.store.alias(alias)? {
            Some(existing) if existing.enabled && !force => {
                return Ok(AliasChange::Unchanged(existing));
            }
            Some(_) => AliasChange::Updated,
            None => AliasChange::Added,
        };

        self.store.put_alias(AliasRecord::new(alias, target))?;
        tracing::debug!(alias, target, ?change, "alias stored");
        Ok(change)
    }

    /// Disables `alias`. Returns true if an enabled alias was disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn remove(&self, alias: &str) -> Result<bool> {
        match self.store.alias(alias)? {
            Some(mut record) if record.enabled => {
                record.enabled = false;
                self.store.put_alias(record)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Returns the target of `alias` if it exists and is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn lookup(&self, alias: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .alias(alias)?
            .filter(|r| r.enabled)
            .map(|r| r.target))
    }

    /// Returns the enabled record for `alias`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn show(&self, alias: &str) -> Result<Option<AliasRecord>> {
        Ok(self.store.alias(alias)?.filter(|r| r.enabled))
    }

    /// Returns every enabled alias, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn list(&self) -> Result<Vec<AliasRecord>> {
        Ok(self
            .store
            .aliases()?
            .into_iter()
            .filter(|r| r.enabled)
            .collect())
    }

    /// Rewrites `line` if its verb is an enabled alias.
    ///
    /// Returns `None` when the line is blank or its verb is not aliased.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn resolve(&self, line: &str) -> Result<Option<String>> {
        let Some(parsed) = CommandLine::parse(line) else {
            return Ok(None);
        };
        let Some(target) = self.lookup(&parsed.verb)? else {
            return Ok(None);
        };
        Ok(Some(expand(&target, &parsed)))
    }
}

impl std::fmt::Debug for AliasResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasResolver").finish_non_exhaustive()
    }
}

/// Substitutes positional markers in `target`, or appends the remainder.
fn expand(target: &str, line: &CommandLine<'_>) -> String {
    if !POSITIONAL.is_match(target) {
        return format!("{target}{}", line.rest);
    }

    let words: Vec<&str> = line.words().collect();
    POSITIONAL
        .replace_all(target, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| words.get(i))
                .copied()
                .unwrap_or_default()
                .to_string()
        })
        .into_owned()
}
