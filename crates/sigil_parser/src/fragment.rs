//! Pattern fragments and capture windows.
//!
//! A [`Fragment`] is a piece of regular expression that knows how many
//! capturing groups it introduces. Fragments can only be grown through
//! methods that keep that count in step with the pattern text, so a
//! parameter's arity is always derived from its fragment and never declared
//! separately.
//!
//! A [`CaptureWindow`] is the read-only view a parameter gets over the flat
//! capture array of a whole-line match: the groups starting at that
//! parameter's offset, plus the line's named-argument tokens.

use regex::{Match, Regex};
use sigil_foundation::{Error, Result};

/// A regular expression fragment with a tracked capture count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pattern: String,
    slots: usize,
}

impl Fragment {
    /// Creates an empty fragment.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pattern: String::new(),
            slots: 0,
        }
    }

    /// Creates a fragment expecting a leading run of whitespace.
    ///
    /// Every leaf starts this way so that leaves can be concatenated
    /// without separators.
    #[must_use]
    pub fn delimited() -> Self {
        Self {
            pattern: r"\s+".to_string(),
            slots: 0,
        }
    }

    /// Appends a run of whitespace.
    #[must_use]
    pub fn whitespace(mut self) -> Self {
        self.pattern.push_str(r"\s+");
        self
    }

    /// Appends literal text, matched case-insensitively.
    #[must_use]
    pub fn literal(mut self, text: &str) -> Self {
        self.pattern.push_str("(?i:");
        self.pattern.push_str(&regex::escape(text));
        self.pattern.push(')');
        self
    }

    /// Appends one capturing group around `body`.
    ///
    /// `body` must not contain capturing groups of its own.
    #[must_use]
    pub fn capture(mut self, body: &str) -> Self {
        debug_assert_eq!(
            count_groups(body).ok(),
            Some(0),
            "capture body must be capture-free: {body}"
        );
        self.pattern.push('(');
        self.pattern.push_str(body);
        self.pattern.push(')');
        self.slots += 1;
        self
    }

    /// Appends a caller-supplied expression whose groups become captures.
    ///
    /// # Errors
    ///
    /// Returns an error if `expression` does not compile, or if it contains a
    /// different number of capturing groups than `declared`.
    pub fn custom(mut self, name: &str, expression: &str, declared: usize) -> Result<Self> {
        let actual = count_groups(expression).map_err(|e| Error::invalid_pattern(name, e))?;
        if actual != declared {
            return Err(Error::arity_mismatch(name, declared, actual));
        }
        self.pattern.push_str("(?:");
        self.pattern.push_str(expression);
        self.pattern.push(')');
        self.slots += actual;
        Ok(self)
    }

    /// Makes the whole fragment optional. Capture count is unchanged.
    #[must_use]
    pub fn optional(self) -> Self {
        Self {
            pattern: format!("(?:{})?", self.pattern),
            slots: self.slots,
        }
    }

    /// Builds a fragment matching one or more occurrences of `inner`.
    ///
    /// The run as a whole is captured in one extra leading group; the inner
    /// groups remain in the pattern but only ever hold the last occurrence.
    #[must_use]
    pub fn repeated(inner: &Fragment) -> Self {
        Self {
            pattern: format!("((?:{})+)", inner.pattern),
            slots: inner.slots + 1,
        }
    }

    /// Appends another fragment.
    #[must_use]
    pub fn then(mut self, other: &Fragment) -> Self {
        self.pattern.push_str(&other.pattern);
        self.slots += other.slots;
        self
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the number of capturing groups the pattern introduces.
    #[must_use]
    pub const fn slots(&self) -> usize {
        self.slots
    }
}

/// Counts the capturing groups in `expression`.
///
/// # Errors
///
/// Returns the compiler's message if the expression is invalid.
pub fn count_groups(expression: &str) -> std::result::Result<usize, String> {
    Regex::new(expression)
        .map(|re| re.captures_len() - 1)
        .map_err(|e| e.to_string())
}

/// One declared `--key` or `--key=value` token from a named-argument run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamedToken<'h> {
    /// The key, as written.
    pub key: &'h str,
    /// The value after `=`, trimmed. `None` for a bare flag.
    pub value: Option<&'h str>,
}

/// Read-only view over one parameter's share of a whole-line match.
#[derive(Clone, Copy, Debug)]
pub struct CaptureWindow<'a, 'h> {
    groups: &'a [Option<Match<'h>>],
    named: &'a [NamedToken<'h>],
}

impl<'a, 'h> CaptureWindow<'a, 'h> {
    /// Creates a window over `groups`.
    ///
    /// `named` holds the line's named-argument tokens, shared by every named
    /// parameter of the signature.
    #[must_use]
    pub const fn new(groups: &'a [Option<Match<'h>>], named: &'a [NamedToken<'h>]) -> Self {
        Self { groups, named }
    }

    /// Returns the text of group `index` within this window.
    #[must_use]
    pub fn text(&self, index: usize) -> Option<&'h str> {
        self.span(index).map(|m| m.as_str())
    }

    /// Returns the match of group `index` within this window.
    #[must_use]
    pub fn span(&self, index: usize) -> Option<Match<'h>> {
        self.groups.get(index).copied().flatten()
    }

    /// Returns the number of groups in this window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if the window holds no groups.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the named-argument tokens of the line, in input order.
    #[must_use]
    pub const fn named(&self) -> &'a [NamedToken<'h>] {
        self.named
    }
}
