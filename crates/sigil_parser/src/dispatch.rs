//! The dispatcher: one raw line in, one [`DispatchResult`] out.
//!
//! ```text
//! raw line ─▶ alias rewrite ─▶ verb lookup ─▶ first matching signature
//!          ─▶ access check ─▶ argument extraction ─▶ handler ─▶ Reply
//! ```
//!
//! Every failure along the way is terminal for that line and comes back as
//! a [`DispatchResult`] variant; nothing is retried.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use sigil_foundation::{
    Caller, Channel, DurationParser, Error, ErrorContext, ErrorKind, Result, UnitDurationParser,
};
use sigil_storage::AliasStore;

use crate::access::{AccessLevel, AccessPolicy, AccessPolicyBuilder, AccessPredicate};
use crate::alias::AliasResolver;
use crate::arguments::Arguments;
use crate::param::ExtractContext;
use crate::registry::CommandRegistry;
use crate::signature::CommandDef;
use crate::tokenizer::CommandLine;

/// What a handler hands back for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// A single message.
    Text(String),
    /// A message split into pages.
    Pages(Vec<String>),
    /// Nothing to say.
    Empty,
}

impl Reply {
    /// Creates a text reply.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Everything a handler gets to see about the call.
pub struct Invocation<'a> {
    /// The matched verb.
    pub verb: &'a str,
    /// The matched sub-verb, if the signature has one.
    pub sub_verb: Option<&'a str>,
    /// The line that was matched, after alias rewriting.
    pub line: &'a str,
    /// Who sent the line.
    pub caller: &'a Caller,
    /// Where the line arrived.
    pub channel: Channel,
    /// The caller's resolved access level.
    pub level: &'a AccessLevel,
    /// Extracted arguments, in declaration order.
    pub args: Arguments,
    /// The dispatcher, for handlers that inspect or re-enter it.
    pub dispatcher: &'a Dispatcher,
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("verb", &self.verb)
            .field("sub_verb", &self.sub_verb)
            .field("caller", &self.caller)
            .field("channel", &self.channel)
            .field("level", &self.level.label())
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Business logic behind a command.
pub trait Handler: Send + Sync {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Any error is reported to the caller as a handler failure.
    fn handle(&self, invocation: &Invocation<'_>) -> Result<Reply>;
}

impl<F> Handler for F
where
    F: Fn(&Invocation<'_>) -> Result<Reply> + Send + Sync,
{
    fn handle(&self, invocation: &Invocation<'_>) -> Result<Reply> {
        self(invocation)
    }
}

/// The outcome of dispatching one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchResult {
    /// The handler ran and replied.
    Ok(Reply),
    /// No command is registered for the verb. Empty for blank lines.
    NoSuchCommand(String),
    /// The verb exists but no signature matched the line.
    NoMatchingSignature {
        /// The verb that was tried.
        verb: String,
        /// One usage line per registered signature.
        usage: Vec<String>,
    },
    /// The caller's level is insufficient. Deliberately carries nothing.
    Unauthorized,
    /// A strict parameter captured a value it could not convert.
    ExtractionFailed {
        /// The offending parameter.
        param: String,
        /// What was wrong with it.
        cause: String,
    },
    /// The handler returned an error.
    HandlerFailed(String),
}

impl DispatchResult {
    /// Returns true if the handler ran successfully.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Routes raw command lines to handlers.
///
/// Immutable after [`DispatcherBuilder::build`] except for signature enabled
/// flags and whatever the stores hold, so `process` may run concurrently.
pub struct Dispatcher {
    registry: CommandRegistry,
    policy: AccessPolicy,
    aliases: AliasResolver,
    durations: Arc<dyn DurationParser>,
}

impl Dispatcher {
    /// Starts a builder whose aliases live in `aliases`.
    #[must_use]
    pub fn builder(aliases: Arc<dyn AliasStore>) -> DispatcherBuilder {
        DispatcherBuilder::new(aliases)
    }

    /// Returns the command registry.
    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Returns the access policy.
    #[must_use]
    pub const fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Returns the alias resolver.
    #[must_use]
    pub const fn aliases(&self) -> &AliasResolver {
        &self.aliases
    }

    /// Dispatches `raw` on behalf of `caller`.
    #[must_use]
    pub fn process(&self, raw: &str, caller: &Caller, channel: Channel) -> DispatchResult {
        let line = match self.aliases.resolve(raw) {
            Ok(Some(rewritten)) => {
                tracing::debug!(from = raw, to = %rewritten, "alias applied");
                Cow::Owned(rewritten)
            }
            Ok(None) => Cow::Borrowed(raw),
            Err(e) => {
                tracing::warn!(error = %e, "alias lookup failed; using line as typed");
                Cow::Borrowed(raw)
            }
        };

        let Some(parsed) = CommandLine::parse(&line) else {
            return DispatchResult::NoSuchCommand(String::new());
        };
        let verb = parsed.verb.as_str();

        if !self.registry.contains(verb) {
            return DispatchResult::NoSuchCommand(parsed.verb.clone());
        }

        let Some(matched) = self.registry.find(verb, parsed.rest, channel) else {
            return DispatchResult::NoMatchingSignature {
                verb: parsed.verb.clone(),
                usage: self.registry.usage(verb),
            };
        };
        let signature = matched.signature();

        let level = self.policy.resolve(caller);
        let authorized = self
            .policy
            .level(signature.access_label())
            .is_some_and(|required| level.satisfies(required));
        if !authorized {
            tracing::warn!(
                caller = %caller.id,
                verb,
                required = signature.access_label(),
                resolved = level.label(),
                "unauthorized command"
            );
            return DispatchResult::Unauthorized;
        }

        let ctx = ExtractContext {
            durations: self.durations.as_ref(),
        };
        let args = match matched.extract(&ctx) {
            Ok(args) => args,
            Err(e) => {
                tracing::debug!(verb, error = %e, "extraction failed");
                return match e.kind {
                    ErrorKind::InvalidValue { param, message } => {
                        DispatchResult::ExtractionFailed { param, cause: message }
                    }
                    other => DispatchResult::ExtractionFailed {
                        param: String::new(),
                        cause: other.to_string(),
                    },
                };
            }
        };

        let invocation = Invocation {
            verb,
            sub_verb: signature.sub_verb(),
            line: &line,
            caller,
            channel,
            level,
            args,
            dispatcher: self,
        };

        match signature.handler().handle(&invocation) {
            Ok(reply) => {
                tracing::trace!(verb, caller = %caller.id, "dispatched");
                DispatchResult::Ok(reply)
            }
            Err(e) => {
                tracing::error!(verb, error = %e, "handler failed");
                DispatchResult::HandlerFailed(e.to_string())
            }
        }
    }

    /// Dispatches `raw` as `target`, on behalf of `actor`.
    ///
    /// Only allowed when `actor` is at least as privileged as `target`.
    #[must_use]
    pub fn process_as(
        &self,
        raw: &str,
        actor: &Caller,
        target: &Caller,
        channel: Channel,
    ) -> DispatchResult {
        if !self.policy.sufficient(actor, target) {
            tracing::warn!(actor = %actor.id, target = %target.id, "refused to act as caller");
            return DispatchResult::Unauthorized;
        }
        self.process(raw, target, channel)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("verbs", &self.registry.verbs())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Collects registrations during startup.
pub struct DispatcherBuilder {
    registry: CommandRegistry,
    policy: AccessPolicyBuilder,
    aliases: AliasResolver,
    durations: Arc<dyn DurationParser>,
}

impl DispatcherBuilder {
    /// Creates a builder whose aliases live in `aliases`.
    #[must_use]
    pub fn new(aliases: Arc<dyn AliasStore>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            policy: AccessPolicyBuilder::new(),
            aliases: AliasResolver::new(aliases),
            durations: Arc::new(UnitDurationParser),
        }
    }

    /// Registers an access level backed by a closure.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is reserved or already registered.
    pub fn register_access_level<F>(&mut self, label: &str, rank: u32, predicate: F) -> Result<&mut Self>
    where
        F: Fn(&Caller) -> Result<bool> + Send + Sync + 'static,
    {
        self.policy.register_access_level(label, rank, predicate)?;
        Ok(self)
    }

    /// Registers an access level backed by a predicate object.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is reserved or already registered.
    pub fn register_access_level_with(
        &mut self,
        label: &str,
        rank: u32,
        predicate: impl AccessPredicate + 'static,
    ) -> Result<&mut Self> {
        self.policy.register_access_level_with(label, rank, predicate)?;
        Ok(self)
    }

    /// Compiles and registers a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition does not compile.
    pub fn register_command(&mut self, def: CommandDef) -> Result<&mut Self> {
        let verb = def.verb().to_string();
        self.registry
            .register(def)
            .map_err(|e| e.with_context(ErrorContext::new().with_source(verb)))?;
        Ok(self)
    }

    /// Defines an alias, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the alias is malformed or the store fails.
    pub fn register_alias(&mut self, alias: &str, target: &str) -> Result<&mut Self> {
        self.aliases.add(alias, target, true)?;
        Ok(self)
    }

    /// Replaces the duration parser handed to extraction.
    #[must_use]
    pub fn with_duration_parser(mut self, parser: Arc<dyn DurationParser>) -> Self {
        self.durations = parser;
        self
    }

    /// Freezes all registrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a command requires an access level that was never
    /// registered.
    pub fn build(self) -> Result<Dispatcher> {
        let policy = self.policy.build();

        for signature in self.registry.signatures() {
            if !policy.contains(signature.access_label()) {
                return Err(Error::unknown_access_level(signature.access_label())
                    .with_context(ErrorContext::new().with_source(signature.usage())));
            }
        }

        tracing::info!(
            verbs = self.registry.verbs().len(),
            levels = policy.levels().count(),
            "dispatcher ready"
        );

        Ok(Dispatcher {
            registry: self.registry,
            policy,
            aliases: self.aliases,
            durations: self.durations,
        })
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
