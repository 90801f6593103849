//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Caller, Channel, durations, and Error.

mod durations;
