//! Integration tests for Layer 2: Parser
//!
//! Tests for the parameter grammar, signature compilation, disambiguation,
//! access resolution, alias rewriting, and the dispatch pipeline.

mod access;
mod dispatch;
mod named;
mod properties;
mod repeated;

use sigil_foundation::{Result, Value};
use sigil_parser::{CommandDef, ExtractContext, Invocation, ParamSpec, Reply, SignatureCompiler};

/// A handler that does nothing.
pub fn noop(_: &Invocation<'_>) -> Result<Reply> {
    Ok(Reply::Empty)
}

/// Matches `input` against a one-parameter signature and extracts the value.
///
/// Returns `None` when the signature does not match.
pub fn extract_one(param: ParamSpec, input: &str) -> Option<Result<Value>> {
    let signature = SignatureCompiler::compile(CommandDef::new("t").param(param).handler(noop))
        .expect("signature compiles");
    let rest = format!(" {input}");
    let matched = signature.try_match(&rest)?;
    Some(
        matched
            .extract(&ExtractContext::default())
            .map(|args| args.at(0).cloned().unwrap_or(Value::Absent)),
    )
}

/// Like [`extract_one`] but panics on extraction failure.
pub fn value(param: ParamSpec, input: &str) -> Option<Value> {
    extract_one(param, input).map(|r| r.expect("extraction succeeds"))
}
