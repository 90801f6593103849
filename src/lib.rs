//! Sigil - Chat command interpretation
//!
//! This crate re-exports all layers of the Sigil system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: sigil_runtime    - Console, config, built-in commands, persistence
//! Layer 2: sigil_parser     - Parameter grammar, signatures, access, aliases, dispatch
//! Layer 1: sigil_storage    - Alias and grant tables
//! Layer 0: sigil_foundation - Core types (Value, Caller, Error)
//! ```

pub use sigil_foundation as foundation;
pub use sigil_parser as parser;
pub use sigil_runtime as runtime;
pub use sigil_storage as storage;
