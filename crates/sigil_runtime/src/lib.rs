//! Console, configuration, built-in commands, and persistence for Sigil.
//!
//! This crate provides:
//! - [`Session`] - A dispatcher wired to the built-in commands and a store
//! - [`Repl`] - Interactive console over a [`LineEditor`]
//! - [`RuntimeConfig`] - TOML configuration
//! - Alias and grant table serialization
//! - The `sigil` binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builtins;
pub mod config;
pub mod editor;
pub mod render;
pub mod repl;
pub mod serialize;
pub mod session;

pub use config::{AliasSeed, CallerConfig, RuntimeConfig};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use render::{is_failure, render, render_reply};
pub use repl::Repl;
pub use serialize::{from_bytes, load_store, save_store, to_bytes};
pub use session::Session;
