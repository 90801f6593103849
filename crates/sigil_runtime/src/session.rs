//! Session state for the console.
//!
//! A session owns the dispatcher, the alias and grant tables behind it, and
//! the identity console lines are dispatched as.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sigil_foundation::{Caller, Channel, Result};
use sigil_parser::tokenizer::strip_prefix;
use sigil_parser::{DispatchResult, Dispatcher, DispatcherBuilder};
use sigil_storage::{AliasStore, GrantStore, MemoryStore};

use crate::builtins;
use crate::config::RuntimeConfig;
use crate::serialize::{load_store, save_store};

/// A console session.
pub struct Session {
    dispatcher: Dispatcher,
    store: Arc<MemoryStore>,
    caller: Caller,
    channel: Channel,
    prefix: String,
    store_path: Option<PathBuf>,
    /// Store revision at the last load or save.
    saved_revision: u64,
}

impl Session {
    /// Creates a session, loading the store file named by `config` when it
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file is unreadable or a built-in fails to
    /// register.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let store = match &config.store_path {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "loading store");
                MemoryStore::from_snapshot(load_store(path)?)
            }
            _ => MemoryStore::new(),
        };
        Self::with_store(config, Arc::new(store))
    }

    /// Creates a session over an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in or a configured alias fails to register.
    pub fn with_store(config: &RuntimeConfig, store: Arc<MemoryStore>) -> Result<Self> {
        Self::with_commands(config, store, |_| Ok(()))
    }

    /// Creates a session, letting `extend` register commands and levels of its
    /// own after the built-ins.
    ///
    /// # Errors
    ///
    /// Returns an error if any registration fails.
    pub fn with_commands<F>(config: &RuntimeConfig, store: Arc<MemoryStore>, extend: F) -> Result<Self>
    where
        F: FnOnce(&mut DispatcherBuilder) -> Result<()>,
    {
        let grants: Arc<dyn GrantStore> = store.clone();

        let mut builder = Dispatcher::builder(store.clone());
        builtins::register(&mut builder, &grants, &config.owners)?;
        extend(&mut builder)?;

        // Seeds never override a stored record, including a removed one.
        for seed in &config.aliases {
            if store.alias(&seed.alias)?.is_none() {
                builder.register_alias(&seed.alias, &seed.target)?;
            }
        }
        let saved_revision = store.revision();

        Ok(Self {
            dispatcher: builder.build()?,
            store,
            caller: config.caller(),
            channel: config.channel,
            prefix: config.prefix.clone(),
            store_path: config.store_path.clone(),
            saved_revision,
        })
    }

    /// Dispatches one console line.
    ///
    /// Returns `None` when the line lacks the configured prefix.
    pub fn eval(&self, line: &str) -> Option<DispatchResult> {
        let line = strip_prefix(line, &self.prefix)?;
        Some(self.dispatcher.process(line, &self.caller, self.channel))
    }

    /// Dispatches one line as someone other than the console caller.
    pub fn eval_as(&self, line: &str, caller: &Caller, channel: Channel) -> DispatchResult {
        self.dispatcher.process(line, caller, channel)
    }

    /// Writes the store to disk if it changed since the last load or save.
    ///
    /// Returns true if a file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn persist(&mut self) -> Result<bool> {
        let Some(path) = &self.store_path else {
            return Ok(false);
        };
        let revision = self.store.revision();
        if revision == self.saved_revision {
            return Ok(false);
        }
        save_store(&self.store.snapshot(), path)?;
        self.saved_revision = revision;
        Ok(true)
    }

    /// Returns the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns the alias and grant tables.
    #[must_use]
    pub const fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Returns the console caller.
    #[must_use]
    pub const fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Switches the console caller.
    pub fn set_caller(&mut self, caller: Caller) {
        self.caller = caller;
    }

    /// Returns the console channel.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Switches the console channel.
    pub const fn set_channel(&mut self, channel: Channel) {
        self.channel = channel;
    }

    /// Returns the store file, if any.
    #[must_use]
    pub fn store_path(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }

    /// Returns true if the store changed since the last load or save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.store.revision() != self.saved_revision
    }
}
