//! Alias and access-grant tables for Sigil.
//!
//! This crate provides:
//! - [`AliasStore`] - Durable alias records, keyed case-insensitively
//! - [`GrantStore`] - Caller id to privilege label grants
//! - [`MemoryStore`] - In-memory implementation of both with cheap snapshots
//!
//! The dispatcher owns no durable state; everything that outlives a single
//! dispatch lives behind these traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod alias;
pub mod grant;
pub mod memory;

pub use alias::{AliasRecord, AliasStore, alias_key};
pub use grant::GrantStore;
pub use memory::{MemoryStore, StoreSnapshot};
