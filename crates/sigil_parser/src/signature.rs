//! Command signatures and their compiler.
//!
//! A [`CommandDef`] is what a feature module registers: a verb, an optional
//! sub-verb, an ordered parameter list, a required access label, the
//! channels it accepts, and a handler. [`SignatureCompiler`] turns it into a
//! [`CommandSignature`] holding one anchored matcher for the whole argument
//! tail, plus the capture offset of every parameter within that matcher.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use regex::{Captures, Match, Regex};
use sigil_foundation::{ChannelSet, Error, ErrorKind, Result};

use crate::access::GENERAL;
use crate::arguments::Arguments;
use crate::dispatch::{Handler, Invocation, Reply};
use crate::fragment::{CaptureWindow, Fragment};
use crate::param::{ExtractContext, NamedKeys, ParamSpec};

/// A command definition, as registered at startup.
#[derive(Clone)]
pub struct CommandDef {
    verb: String,
    sub_verb: Option<String>,
    params: Vec<ParamSpec>,
    access: String,
    channels: ChannelSet,
    description: Option<String>,
    handler: Option<Arc<dyn Handler>>,
}

impl CommandDef {
    /// Starts a definition for `verb`, open to everyone on every channel.
    #[must_use]
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            sub_verb: None,
            params: Vec::new(),
            access: GENERAL.to_string(),
            channels: ChannelSet::ALL,
            description: None,
            handler: None,
        }
    }

    /// Requires a literal sub-verb right after the verb.
    #[must_use]
    pub fn sub_verb(mut self, sub_verb: impl Into<String>) -> Self {
        self.sub_verb = Some(sub_verb.into());
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Appends several parameters.
    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.params.extend(params);
        self
    }

    /// Sets the required access label.
    #[must_use]
    pub fn access(mut self, label: impl Into<String>) -> Self {
        self.access = label.into();
        self
    }

    /// Restricts the channels the command is accepted on.
    #[must_use]
    pub fn channels(mut self, channels: impl Into<ChannelSet>) -> Self {
        self.channels = channels.into();
        self
    }

    /// Sets the one-line description shown by help.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the handler from a closure.
    #[must_use]
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Reply> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Sets the handler from a shared handler object.
    #[must_use]
    pub fn handler_object(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Returns the verb as written.
    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Returns the required access label.
    #[must_use]
    pub fn access_label(&self) -> &str {
        &self.access
    }
}

impl fmt::Debug for CommandDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDef")
            .field("verb", &self.verb)
            .field("sub_verb", &self.sub_verb)
            .field("params", &self.params)
            .field("access", &self.access)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

/// A compiled, immutable command signature.
///
/// Only the enabled flag may change after compilation.
pub struct CommandSignature {
    verb: String,
    sub_verb: Option<String>,
    params: Vec<ParamSpec>,
    matcher: Regex,
    offsets: Vec<usize>,
    /// Group of the named-argument run, and the keys that may appear in it.
    named: Option<(usize, NamedKeys)>,
    access: String,
    channels: ChannelSet,
    enabled: AtomicBool,
    description: Option<String>,
    handler: Arc<dyn Handler>,
}

impl CommandSignature {
    /// Returns the verb, lowercased.
    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Returns the sub-verb, lowercased.
    #[must_use]
    pub fn sub_verb(&self) -> Option<&str> {
        self.sub_verb.as_deref()
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Returns the required access label.
    #[must_use]
    pub fn access_label(&self) -> &str {
        &self.access
    }

    /// Returns the channels this signature accepts.
    #[must_use]
    pub const fn channels(&self) -> ChannelSet {
        self.channels
    }

    /// Returns the description, if one was given.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Returns the compiled matcher's pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    /// Returns true unless the signature has been disabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enables or disables the signature. Returns the previous state.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::AcqRel)
    }

    /// Returns true if the signature is enabled and accepts `channel`.
    #[must_use]
    pub fn accepts(&self, channel: sigil_foundation::Channel) -> bool {
        self.is_enabled() && self.channels.contains(channel)
    }

    /// Returns true if `rest` (the line after the verb) fully matches.
    #[must_use]
    pub fn matches(&self, rest: &str) -> bool {
        self.matcher.is_match(rest)
    }

    /// Attempts a full match of `rest`, the line after the verb.
    #[must_use]
    pub fn try_match<'s, 'h>(&'s self, rest: &'h str) -> Option<SignatureMatch<'s, 'h>> {
        self.matcher.captures(rest).map(|captures| SignatureMatch {
            signature: self,
            captures,
            haystack: rest,
        })
    }

    /// Returns the usage line, e.g. `remind <delay:duration> <message>`.
    #[must_use]
    pub fn usage(&self) -> String {
        let mut parts = vec![self.verb.clone()];
        if let Some(sub) = &self.sub_verb {
            parts.push(sub.clone());
        }
        parts.extend(self.params.iter().map(ParamSpec::usage));
        parts.join(" ")
    }
}

impl fmt::Debug for CommandSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSignature")
            .field("verb", &self.verb)
            .field("sub_verb", &self.sub_verb)
            .field("pattern", &self.matcher.as_str())
            .field("access", &self.access)
            .field("channels", &self.channels)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

/// A successful whole-line match, not yet extracted.
pub struct SignatureMatch<'s, 'h> {
    signature: &'s CommandSignature,
    captures: Captures<'h>,
    haystack: &'h str,
}

impl<'s> SignatureMatch<'s, '_> {
    /// Returns the signature that matched.
    #[must_use]
    pub const fn signature(&self) -> &'s CommandSignature {
        self.signature
    }

    /// Runs every parameter's extraction over its capture window.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidValue`] naming the first parameter whose
    /// extraction failed.
    pub fn extract(&self, ctx: &ExtractContext<'_>) -> Result<Arguments> {
        let sig = self.signature;
        let groups: Vec<Option<Match<'_>>> = self.captures.iter().skip(1).collect();

        let named = sig
            .named
            .as_ref()
            .and_then(|(group, keys)| {
                let run = groups.get(*group).copied().flatten()?;
                Some(keys.split(run.as_str()))
            })
            .unwrap_or_default();

        let mut args = Arguments::new();
        for (param, &offset) in sig.params.iter().zip(&sig.offsets) {
            let slice = groups.get(offset..offset + param.slots()).unwrap_or(&[]);
            let window = CaptureWindow::new(slice, &named);
            let value = param.extract(window, ctx).map_err(|e| {
                if matches!(e.kind, ErrorKind::InvalidValue { .. }) {
                    e
                } else {
                    Error::invalid_value(param.name(), e.to_string())
                }
            })?;
            args.push(param.name(), value);
        }
        Ok(args)
    }
}

impl fmt::Debug for SignatureMatch<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureMatch")
            .field("verb", &self.signature.verb)
            .field("haystack", &self.haystack)
            .finish_non_exhaustive()
    }
}

/// Compiles command definitions into signatures.
pub struct SignatureCompiler;

impl SignatureCompiler {
    /// Compiles `def`.
    ///
    /// # Errors
    ///
    /// Returns an error if the verb or sub-verb is not a single token, if the
    /// definition has no handler or no channels, if a positional parameter
    /// follows a named one, or if the assembled matcher does not compile or
    /// has a different number of groups than its parameters declare.
    pub fn compile(def: CommandDef) -> Result<CommandSignature> {
        let verb = Self::token(&def.verb, "verb")?;
        let sub_verb = def
            .sub_verb
            .as_deref()
            .map(|s| Self::token(s, "sub-verb"))
            .transpose()?;

        let Some(handler) = def.handler else {
            return Err(Error::new(ErrorKind::InvalidCommand(format!(
                "'{verb}' has no handler"
            ))));
        };
        if def.channels.is_empty() {
            return Err(Error::new(ErrorKind::InvalidCommand(format!(
                "'{verb}' accepts no channels"
            ))));
        }

        let mut pattern = String::from("^");
        if let Some(sub) = &sub_verb {
            pattern.push_str(&format!(r"\s+(?i:{})", regex::escape(sub)));
        }

        // All named parameters share one run built from their joint key set,
        // placed where the first of them stands. The others keep their group
        // count with an empty capture.
        let keys = NamedKeys::of(&def.params)
            .map_err(|e| Error::invalid_pattern(&verb, e.to_string()))?;
        let mut offsets = Vec::with_capacity(def.params.len());
        let mut named: Option<(usize, NamedKeys)> = None;
        let mut declared = 0;
        for param in &def.params {
            let fragment = if param.is_named() {
                if named.is_some() {
                    Fragment::empty().capture("")
                } else {
                    named = Some((declared, keys.clone()));
                    keys.fragment()
                }
            } else if named.is_some() {
                return Err(Error::new(ErrorKind::InvalidCommand(format!(
                    "'{verb}': positional parameter '{}' follows named arguments",
                    param.name()
                ))));
            } else {
                param.fragment().clone()
            };
            debug_assert_eq!(fragment.slots(), param.slots());
            offsets.push(declared);
            declared += param.slots();
            pattern.push_str(fragment.pattern());
        }
        pattern.push_str(r"\s*$");

        let matcher = Regex::new(&pattern).map_err(|e| Error::invalid_pattern(&verb, e.to_string()))?;
        let actual = matcher.captures_len() - 1;
        if actual != declared {
            return Err(Error::arity_mismatch(&verb, declared, actual));
        }

        Ok(CommandSignature {
            verb,
            sub_verb,
            params: def.params,
            matcher,
            offsets,
            named,
            access: def.access.trim().to_lowercase(),
            channels: def.channels,
            enabled: AtomicBool::new(true),
            description: def.description,
            handler,
        })
    }

    fn token(raw: &str, what: &str) -> Result<String> {
        let token = raw.trim();
        if token.is_empty() || token.contains(char::is_whitespace) {
            return Err(Error::new(ErrorKind::InvalidCommand(format!(
                "{what} must be a single token, got '{raw}'"
            ))));
        }
        Ok(token.to_lowercase())
    }
}
