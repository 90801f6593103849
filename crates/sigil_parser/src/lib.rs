//! Command interpretation for chat-style command lines.
//!
//! This crate turns a raw line such as `remind 10m stretch` into a typed
//! handler invocation, or into a typed failure explaining why it could not.
//!
//! # Architecture
//!
//! ```text
//! "r 10m stretch"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ ALIAS           │  → "remind 10m stretch"
//! │ RESOLVER        │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ TOKENIZER       │  → verb "remind", rest " 10m stretch"
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ COMMAND         │  → first signature whose matcher fully matches
//! │ REGISTRY        │    ^\s+((?i:(?:[0-9]+[a-z]+)+))\s+(\S.*?)\s*$
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ ACCESS          │  → caller resolves to "general", command needs "general"
//! │ POLICY          │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ PARAMETER       │  → { delay: 600s, message: "stretch" }
//! │ EXTRACTION      │
//! └─────────────────┘
//!          │
//!          ▼
//!       handler
//! ```
//!
//! # Modules
//!
//! - [`fragment`] - Regex fragments with tracked capture counts
//! - [`param`] - The parameter grammar
//! - [`arguments`] - Typed access to extracted values
//! - [`signature`] - Command definitions and the signature compiler
//! - [`registry`] - Verb index and first-match disambiguation
//! - [`access`] - Ranked access levels and caller resolution
//! - [`alias`] - One-level alias rewriting
//! - [`tokenizer`] - Verb splitting
//! - [`dispatch`] - The end-to-end pipeline

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod access;
pub mod alias;
pub mod arguments;
pub mod dispatch;
pub mod fragment;
pub mod param;
pub mod registry;
pub mod signature;
pub mod tokenizer;

// Re-export main types for convenience
pub use access::{
    AccessLevel, AccessPolicy, AccessPolicyBuilder, AccessPredicate, GENERAL, GrantPredicate,
    IdListPredicate,
};
pub use alias::{AliasChange, AliasResolver};
pub use arguments::Arguments;
pub use dispatch::{DispatchResult, Dispatcher, DispatcherBuilder, Handler, Invocation, Reply};
pub use fragment::{CaptureWindow, Fragment, NamedToken};
pub use param::{ExtractContext, NamedKeys, ParamKind, ParamSpec, Strictness};
pub use registry::CommandRegistry;
pub use signature::{CommandDef, CommandSignature, SignatureCompiler, SignatureMatch};
pub use tokenizer::CommandLine;
