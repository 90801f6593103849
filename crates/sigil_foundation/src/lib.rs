//! Core types, argument values, and errors for Sigil.
//!
//! This crate provides:
//! - [`Value`] - Typed values extracted from command arguments
//! - [`Caller`] and [`Channel`] - Who sent a line and where it arrived
//! - [`DurationParser`] - Shared duration text parsing
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod caller;
pub mod error;
pub mod time;
pub mod value;

pub use caller::{Caller, Channel, ChannelSet};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use time::{DurationParser, UnitDurationParser, format_duration};
pub use value::{ItemRef, Value};
