//! Console configuration, read from TOML.
//!
//! Every field has a default, so a missing or empty file yields a working
//! console where the local user owns everything.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sigil_foundation::{Caller, Channel, Error, ErrorContext, ErrorKind, Result};

/// Identity of the local console user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerConfig {
    /// Caller id used for grants.
    pub id: String,
    /// Display name. Falls back to the id when empty.
    pub name: String,
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            id: "console".to_string(),
            name: String::new(),
        }
    }
}

/// An alias created at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSeed {
    /// The alias token.
    pub alias: String,
    /// The command line it expands to.
    pub target: String,
}

/// Top-level runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Prefix every command line must start with, e.g. `!`. Empty accepts all lines.
    pub prefix: String,
    /// Who the console speaks as.
    pub caller: CallerConfig,
    /// Channel console lines arrive on.
    pub channel: Channel,
    /// Caller ids holding the `owner` level.
    pub owners: Vec<String>,
    /// Where aliases and grants persist. In-memory only when unset.
    pub store_path: Option<PathBuf>,
    /// Line editor history length.
    pub history_size: usize,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Interactive prompt.
    pub prompt: String,
    /// Aliases defined at startup, replacing stored ones of the same name.
    pub aliases: Vec<AliasSeed>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            caller: CallerConfig::default(),
            channel: Channel::Console,
            owners: vec!["console".to_string()],
            store_path: None,
            history_size: 1000,
            log_level: "warn".to_string(),
            prompt: "sigil> ".to_string(),
            aliases: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::IoError(format!(
                "failed to read config '{}': {e}",
                path.display()
            )))
        })?;
        Self::parse(&content).map_err(|e| {
            e.with_context(ErrorContext::new().with_source(path.display().to_string()))
        })
    }

    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::new(ErrorKind::Config(e.to_string())))
    }

    /// Returns the console caller.
    #[must_use]
    pub fn caller(&self) -> Caller {
        let caller = Caller::new(self.caller.id.clone());
        if self.caller.name.is_empty() {
            caller
        } else {
            caller.with_name(self.caller.name.clone())
        }
    }
}
