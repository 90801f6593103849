//! Input tokenization.
//!
//! Splits a raw command line into its verb and the untouched remainder.
//! Everything after the verb is left for signature matchers, which expect
//! the remainder to keep its leading whitespace.

/// A command line split at its verb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// The first token, lowercased.
    pub verb: String,
    /// Everything after the verb token, leading whitespace included.
    pub rest: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Splits `line` at its first whitespace run.
    ///
    /// Returns `None` if the line is blank.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim_start();
        if line.is_empty() {
            return None;
        }
        let end = line.find(char::is_whitespace).unwrap_or(line.len());
        Some(Self {
            verb: line[..end].to_lowercase(),
            rest: line[end..].trim_end(),
        })
    }

    /// Returns the whitespace-delimited words after the verb.
    pub fn words(&self) -> impl Iterator<Item = &'a str> {
        self.rest.split_whitespace()
    }

    /// Returns the first word after the verb, lowercased.
    #[must_use]
    pub fn sub_verb(&self) -> Option<String> {
        self.words().next().map(str::to_lowercase)
    }
}

/// Removes a command prefix such as `!` from the start of `line`.
///
/// Returns `None` if the line does not start with the prefix. An empty
/// prefix accepts every line.
#[must_use]
pub fn strip_prefix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.trim_start().strip_prefix(prefix)
}
