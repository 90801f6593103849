//! Error types for the Sigil system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

/// The main error type for Sigil operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPattern {
            name: name.into(),
            message: message.into(),
        })
    }

    /// Creates a capture arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(name: impl Into<String>, declared: usize, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            name: name.into(),
            declared,
            actual,
        })
    }

    /// Creates an unknown access level error.
    #[must_use]
    pub fn unknown_access_level(label: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownAccessLevel(label.into()))
    }

    /// Creates an invalid value error for a named parameter.
    #[must_use]
    pub fn invalid_value(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValue {
            param: param.into(),
            message: message.into(),
        })
    }

    /// Creates a storage error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage(message.into()))
    }

    /// Creates a handler error.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A parameter's pattern failed to compile.
    #[error("invalid pattern for {name}: {message}")]
    InvalidPattern {
        /// The parameter or signature the pattern belongs to.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// Declared capture count differs from what the pattern introduces.
    #[error("arity mismatch for {name}: declared {declared}, pattern has {actual}")]
    ArityMismatch {
        /// The parameter or signature being compiled.
        name: String,
        /// Number of captures declared.
        declared: usize,
        /// Number of captures the pattern actually contains.
        actual: usize,
    },

    /// An access level label was registered twice.
    #[error("duplicate access level: {0}")]
    DuplicateAccessLevel(String),

    /// An access level label was referenced but never registered.
    #[error("unknown access level: {0}")]
    UnknownAccessLevel(String),

    /// A command definition is malformed.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// An alias definition is malformed.
    #[error("invalid alias: {0}")]
    InvalidAlias(String),

    /// A parameter value was present but could not be used.
    #[error("invalid value for {param}: {message}")]
    InvalidValue {
        /// The parameter name.
        param: String,
        /// Description of the problem.
        message: String,
    },

    /// Storage collaborator failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization failure.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// I/O failure.
    #[error("io error: {0}")]
    IoError(String),

    /// Configuration failure.
    #[error("config error: {0}")]
    Config(String),

    /// A command handler failed.
    #[error("{0}")]
    Handler(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Verb, file, or registration the error relates to.
    pub source: Option<String>,
    /// Chain of operations that led to the error.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias using Sigil's error type.
pub type Result<T> = std::result::Result<T, Error>;
