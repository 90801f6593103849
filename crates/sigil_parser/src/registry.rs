//! Command registry and matcher.
//!
//! Signatures are indexed by verb. Several signatures may share a verb; they
//! are tried in registration order and the first enabled, channel-valid,
//! fully matching one wins.

use std::collections::HashMap;

use sigil_foundation::{Channel, Result};

use crate::signature::{CommandDef, CommandSignature, SignatureCompiler, SignatureMatch};

/// All compiled signatures, grouped by verb.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    by_verb: HashMap<String, Vec<CommandSignature>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and registers `def`.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition does not compile.
    pub fn register(&mut self, def: CommandDef) -> Result<()> {
        let signature = SignatureCompiler::compile(def)?;
        tracing::debug!(
            verb = signature.verb(),
            pattern = signature.pattern(),
            "registered command"
        );
        self.by_verb
            .entry(signature.verb().to_string())
            .or_default()
            .push(signature);
        Ok(())
    }

    /// Returns true if any signature is registered for `verb`.
    #[must_use]
    pub fn contains(&self, verb: &str) -> bool {
        self.by_verb.contains_key(&verb.to_lowercase())
    }

    /// Returns every signature for `verb`, in registration order.
    #[must_use]
    pub fn candidates(&self, verb: &str) -> &[CommandSignature] {
        self.by_verb
            .get(&verb.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates every signature, grouped by verb in sorted order.
    pub fn signatures(&self) -> impl Iterator<Item = &CommandSignature> {
        self.verbs()
            .into_iter()
            .flat_map(move |verb| self.candidates(verb).iter())
    }

    /// Returns every registered verb, sorted.
    #[must_use]
    pub fn verbs(&self) -> Vec<&str> {
        let mut verbs: Vec<&str> = self.by_verb.keys().map(String::as_str).collect();
        verbs.sort_unstable();
        verbs
    }

    /// Finds the first signature for `verb` that accepts `channel` and fully
    /// matches `rest`.
    #[must_use]
    pub fn find<'s, 'h>(
        &'s self,
        verb: &str,
        rest: &'h str,
        channel: Channel,
    ) -> Option<SignatureMatch<'s, 'h>> {
        self.candidates(verb)
            .iter()
            .filter(|sig| sig.accepts(channel))
            .find_map(|sig| sig.try_match(rest))
    }

    /// Returns one usage line per signature registered for `verb`,
    /// followed by its description when it has one.
    #[must_use]
    pub fn usage(&self, verb: &str) -> Vec<String> {
        self.candidates(verb)
            .iter()
            .map(|sig| match sig.description() {
                Some(description) => format!("{} - {description}", sig.usage()),
                None => sig.usage(),
            })
            .collect()
    }

    /// Enables or disables signatures for `verb`.
    ///
    /// With a `sub_verb`, only signatures carrying that sub-verb change.
    /// Returns the number of signatures whose state changed.
    pub fn set_enabled(&self, verb: &str, sub_verb: Option<&str>, enabled: bool) -> usize {
        let sub_verb = sub_verb.map(str::to_lowercase);
        let mut changed = 0;
        for sig in self.candidates(verb) {
            if sub_verb.is_some() && sig.sub_verb() != sub_verb.as_deref() {
                continue;
            }
            if sig.set_enabled(enabled) != enabled {
                changed += 1;
            }
        }
        changed
    }
}
