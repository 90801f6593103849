//! The parameter grammar.
//!
//! Each [`ParamSpec`] is one typed argument rule. It contributes a
//! [`Fragment`] to its signature's whole-line matcher and knows how to turn
//! the groups that fragment captured into a [`Value`].
//!
//! Leaves come in a closed set ([`ParamKind`]); adding a leaf means adding a
//! variant, and every `match` over the kind will point at the places that
//! must learn about it.

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;
use sigil_foundation::{DurationParser, Error, ItemRef, Result, UnitDurationParser, Value};

use crate::fragment::{CaptureWindow, Fragment, NamedToken};

static DEFAULT_DURATIONS: UnitDurationParser = UnitDurationParser;

/// Shared utilities handed to every extraction.
#[derive(Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Converts duration text into seconds.
    pub durations: &'a dyn DurationParser,
}

impl Default for ExtractContext<'_> {
    fn default() -> Self {
        Self {
            durations: &DEFAULT_DURATIONS,
        }
    }
}

impl std::fmt::Debug for ExtractContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractContext").finish_non_exhaustive()
    }
}

/// What happens when a value is present but cannot be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    /// Fail the dispatch with an extraction error.
    Strict,
    /// Substitute the leaf's default value.
    Lenient,
}

/// The closed set of parameter leaves.
#[derive(Clone, Debug)]
pub enum ParamKind {
    /// A literal token, matched case-insensitively.
    Constant(String),
    /// A signed whole number.
    Integer(String),
    /// A signed number with an optional fractional part.
    Decimal(String),
    /// One or more characters of free text.
    FreeText(String),
    /// Exactly one of a fixed set of tokens.
    Enumerated(Vec<String>),
    /// One or more `<integer><unit>` groups, e.g. `5m4s`.
    Duration(String),
    /// An inline `<ref low=.. high=.. qty=..>label</ref>` item reference.
    Reference(String),
    /// `--key=value` arguments over a closed key set.
    NamedKeyValues(Vec<String>),
    /// `--key` flags over a closed key set.
    NamedFlags(Vec<String>),
    /// A caller-supplied expression and its group count.
    CustomPattern {
        /// Parameter name.
        name: String,
        /// The regular expression.
        expression: String,
        /// Number of capturing groups in `expression`.
        groups: usize,
    },
    /// One or more occurrences of an inner parameter.
    Repeated(Box<ParamSpec>),
}

/// A typed argument rule.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    kind: ParamKind,
    optional: bool,
    strictness: Strictness,
    base: Fragment,
    fragment: Fragment,
    scanner: Option<Regex>,
}

impl ParamSpec {
    fn leaf(kind: ParamKind, strictness: Strictness, base: Fragment) -> Self {
        Self {
            kind,
            optional: false,
            strictness,
            fragment: base.clone(),
            base,
            scanner: None,
        }
    }

    fn named(kind: ParamKind) -> Self {
        let base = match &kind {
            ParamKind::NamedKeyValues(keys) => NamedKeys::run_fragment(keys, &[]),
            ParamKind::NamedFlags(keys) => NamedKeys::run_fragment(&[], keys),
            _ => Fragment::empty(),
        };
        Self::leaf(kind, Strictness::Lenient, base).optional()
    }

    /// A literal token that must appear as a whole word.
    #[must_use]
    pub fn constant(token: impl Into<String>) -> Self {
        let token = token.into();
        let base = Fragment::delimited().capture(&format!("(?i:{})", regex::escape(&token)));
        Self::leaf(ParamKind::Constant(token), Strictness::Lenient, base)
    }

    /// A signed whole number.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        let base = Fragment::delimited().capture(r"[+-]?[0-9]+");
        Self::leaf(ParamKind::Integer(name.into()), Strictness::Strict, base)
    }

    /// A signed decimal number.
    #[must_use]
    pub fn decimal(name: impl Into<String>) -> Self {
        let base = Fragment::delimited().capture(r"[+-]?[0-9]+(?:\.[0-9]+)?");
        Self::leaf(ParamKind::Decimal(name.into()), Strictness::Strict, base)
    }

    /// Free text of at least one character.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        let base = Fragment::delimited().capture(r"\S.*?");
        Self::leaf(ParamKind::FreeText(name.into()), Strictness::Lenient, base)
    }

    /// Exactly one of `options`.
    #[must_use]
    pub fn choice<S: AsRef<str>>(options: &[S]) -> Self {
        let options: Vec<String> = options.iter().map(|o| o.as_ref().to_string()).collect();

        let base = Fragment::delimited().capture(&format!("(?i:{})", alternation(&options)));

        Self::leaf(ParamKind::Enumerated(options), Strictness::Lenient, base)
    }

    /// A duration such as `10m` or `1h30m`. Unknown units extract as zero.
    #[must_use]
    pub fn duration(name: impl Into<String>) -> Self {
        let base = Fragment::delimited().capture(r"(?i:(?:[0-9]+[a-z]+)+)");
        Self::leaf(ParamKind::Duration(name.into()), Strictness::Lenient, base)
    }

    /// An inline item reference.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        let base = Fragment::delimited()
            .literal("<ref")
            .whitespace()
            .literal("low=")
            .capture(r"[0-9]+")
            .whitespace()
            .literal("high=")
            .capture(r"[0-9]+")
            .whitespace()
            .literal("qty=")
            .capture(r"[0-9]+")
            .literal(">")
            .capture(r"[^<]+")
            .literal("</ref>");
        Self::leaf(ParamKind::Reference(name.into()), Strictness::Strict, base)
    }

    /// `--key=value` arguments over `keys`. Missing keys extract as empty.
    #[must_use]
    pub fn key_values<S: AsRef<str>>(keys: &[S]) -> Self {
        let keys = keys.iter().map(|k| k.as_ref().to_lowercase()).collect();
        Self::named(ParamKind::NamedKeyValues(keys))
    }

    /// `--key` flags over `keys`. Missing flags extract as `false`.
    #[must_use]
    pub fn flags<S: AsRef<str>>(keys: &[S]) -> Self {
        let keys = keys.iter().map(|k| k.as_ref().to_lowercase()).collect();
        Self::named(ParamKind::NamedFlags(keys))
    }

    /// A custom expression with exactly `groups` capturing groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not compile or its group
    /// count differs from `groups`.
    pub fn pattern(
        name: impl Into<String>,
        expression: impl Into<String>,
        groups: usize,
    ) -> Result<Self> {
        let name = name.into();
        let expression = expression.into();
        let base = Fragment::delimited().custom(&name, &expression, groups)?;
        Ok(Self::leaf(
            ParamKind::CustomPattern {
                name,
                expression,
                groups,
            },
            Strictness::Lenient,
            base,
        ))
    }

    /// One or more whitespace-separated occurrences of `inner`.
    ///
    /// The inner parameter must have a fixed shape: free text, named
    /// arguments, and nested repetition are rejected because their
    /// occurrences cannot be told apart.
    ///
    /// # Errors
    ///
    /// Returns an error if `inner` cannot be repeated.
    pub fn repeated(inner: ParamSpec) -> Result<Self> {
        match inner.kind {
            ParamKind::FreeText(_)
            | ParamKind::NamedKeyValues(_)
            | ParamKind::NamedFlags(_)
            | ParamKind::Repeated(_) => {
                return Err(Error::invalid_pattern(
                    inner.name(),
                    "only fixed-shape parameters can be repeated",
                ));
            }
            _ => {}
        }

        let mut inner = inner;
        inner.optional = false;
        inner.fragment = inner.base.clone();

        let scanner = Regex::new(inner.base.pattern())
            .map_err(|e| Error::invalid_pattern(inner.name(), e.to_string()))?;
        let base = Fragment::repeated(&inner.base);

        let mut spec = Self::leaf(
            ParamKind::Repeated(Box::new(inner)),
            Strictness::Lenient,
            base,
        );
        spec.scanner = Some(scanner);
        Ok(spec)
    }

    /// Marks this parameter optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.fragment = self.base.clone().optional();
        self
    }

    /// Fails extraction instead of substituting a default.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strictness = Strictness::Strict;
        self
    }

    /// Substitutes a default instead of failing extraction.
    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.strictness = Strictness::Lenient;
        self
    }

    /// Returns the parameter kind.
    #[must_use]
    pub const fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Returns true if the parameter may be omitted.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the strictness applied to unusable values.
    #[must_use]
    pub const fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Returns true for `--named` parameters.
    #[must_use]
    pub const fn is_named(&self) -> bool {
        matches!(
            self.kind,
            ParamKind::NamedKeyValues(_) | ParamKind::NamedFlags(_)
        )
    }

    /// Returns the parameter's name, used for argument lookup and errors.
    #[must_use]
    pub fn name(&self) -> String {
        match &self.kind {
            ParamKind::Constant(token) => token.clone(),
            ParamKind::Integer(name)
            | ParamKind::Decimal(name)
            | ParamKind::FreeText(name)
            | ParamKind::Duration(name)
            | ParamKind::Reference(name)
            | ParamKind::CustomPattern { name, .. } => name.clone(),
            ParamKind::Enumerated(options) => options.join("|"),
            ParamKind::NamedKeyValues(_) => "options".to_string(),
            ParamKind::NamedFlags(_) => "flags".to_string(),
            ParamKind::Repeated(inner) => inner.name(),
        }
    }

    /// Returns this parameter's pattern fragment.
    #[must_use]
    pub const fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    /// Returns the number of groups that carry values for this parameter.
    ///
    /// Repeated parameters report zero; their values come from a rescan of
    /// the run they matched.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self.kind {
            ParamKind::Repeated(_) => 0,
            _ => self.fragment.slots(),
        }
    }

    /// Returns the number of capturing groups this parameter's fragment introduces.
    #[must_use]
    pub const fn slots(&self) -> usize {
        self.fragment.slots()
    }

    /// Returns a short human-readable description for usage text.
    #[must_use]
    pub fn usage(&self) -> String {
        let body = match &self.kind {
            ParamKind::Constant(token) => token.clone(),
            ParamKind::Integer(name) => format!("<{name}:int>"),
            ParamKind::Decimal(name) => format!("<{name}:decimal>"),
            ParamKind::FreeText(name) | ParamKind::CustomPattern { name, .. } => {
                format!("<{name}>")
            }
            ParamKind::Enumerated(options) => options.join("|"),
            ParamKind::Duration(name) => format!("<{name}:duration>"),
            ParamKind::Reference(name) => format!("<{name}:ref>"),
            ParamKind::NamedKeyValues(keys) => {
                let parts: Vec<String> = keys.iter().map(|k| format!("--{k}=…")).collect();
                parts.join(" ")
            }
            ParamKind::NamedFlags(keys) => {
                let parts: Vec<String> = keys.iter().map(|k| format!("--{k}")).collect();
                parts.join(" ")
            }
            ParamKind::Repeated(inner) => format!("{}...", inner.usage()),
        };
        if self.optional {
            format!("[{body}]")
        } else {
            body
        }
    }

    /// Converts this parameter's captured groups into a value.
    ///
    /// # Errors
    ///
    /// Returns [`sigil_foundation::ErrorKind::InvalidValue`] when a strict
    /// parameter captured text it cannot convert.
    pub fn extract(&self, window: CaptureWindow<'_, '_>, ctx: &ExtractContext<'_>) -> Result<Value> {
        match &self.kind {
            ParamKind::NamedKeyValues(keys) => Ok(Self::extract_key_values(keys, window)),
            ParamKind::NamedFlags(keys) => Ok(Self::extract_flags(keys, window)),
            ParamKind::Repeated(inner) => self.extract_repeated(inner, window, ctx),
            _ => match window.text(0) {
                Some(first) => self.extract_leaf(first, window, ctx),
                None => Ok(Value::Absent),
            },
        }
    }

    fn extract_leaf(
        &self,
        first: &str,
        window: CaptureWindow<'_, '_>,
        ctx: &ExtractContext<'_>,
    ) -> Result<Value> {
        match &self.kind {
            ParamKind::Constant(token) => Ok(Value::Text(token.clone())),
            ParamKind::Integer(name) => match first.parse::<i64>() {
                Ok(n) => Ok(Value::Int(n)),
                Err(e) => self.fallback(name, &e.to_string(), Value::Int(0)),
            },
            ParamKind::Decimal(name) => match first.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Value::Decimal(n)),
                Ok(_) => self.fallback(name, "number out of range", Value::Decimal(0.0)),
                Err(e) => self.fallback(name, &e.to_string(), Value::Decimal(0.0)),
            },
            ParamKind::FreeText(_) => Ok(Value::Text(first.to_string())),
            ParamKind::Enumerated(options) => Ok(Value::Text(
                options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(first))
                    .cloned()
                    .unwrap_or_else(|| first.to_string()),
            )),
            ParamKind::Duration(name) => match ctx.durations.parse(first) {
                Some(d) => Ok(Value::Duration(d)),
                None => self.fallback(
                    name,
                    &format!("unrecognized duration '{first}'"),
                    Value::Duration(Duration::ZERO),
                ),
            },
            ParamKind::Reference(name) => self.extract_reference(name, window),
            ParamKind::CustomPattern { groups, .. } => Ok(Value::Groups(
                (0..*groups)
                    .map(|i| window.text(i).map(str::to_string))
                    .collect(),
            )),
            // Not single-valued; see `extract`.
            ParamKind::NamedKeyValues(_) | ParamKind::NamedFlags(_) | ParamKind::Repeated(_) => {
                Ok(Value::Absent)
            }
        }
    }

    fn fallback(&self, name: &str, message: &str, default: Value) -> Result<Value> {
        match self.strictness {
            Strictness::Strict => Err(Error::invalid_value(name, message)),
            Strictness::Lenient => Ok(default),
        }
    }

    fn extract_reference(&self, name: &str, window: CaptureWindow<'_, '_>) -> Result<Value> {
        let mut numbers = [0u64; 3];
        for (slot, number) in numbers.iter_mut().enumerate() {
            let text = window.text(slot).unwrap_or_default();
            match text.parse::<u64>() {
                Ok(n) => *number = n,
                Err(e) => {
                    if self.strictness == Strictness::Strict {
                        return Err(Error::invalid_value(name, e.to_string()));
                    }
                }
            }
        }
        let label = window.text(3).unwrap_or_default().trim().to_string();
        Ok(Value::Reference(ItemRef::new(
            numbers[0], numbers[1], numbers[2], label,
        )))
    }

    fn extract_repeated(
        &self,
        inner: &ParamSpec,
        window: CaptureWindow<'_, '_>,
        ctx: &ExtractContext<'_>,
    ) -> Result<Value> {
        let (Some(run), Some(scanner)) = (window.text(0), self.scanner.as_ref()) else {
            return Ok(Value::List(Vec::new()));
        };

        let mut values = Vec::new();
        for caps in scanner.captures_iter(run) {
            let groups: Vec<_> = caps.iter().skip(1).collect();
            let occurrence = CaptureWindow::new(&groups, &[]);
            values.push(inner.extract(occurrence, ctx)?);
        }
        Ok(Value::List(values))
    }

    fn extract_key_values(keys: &[String], window: CaptureWindow<'_, '_>) -> Value {
        let mut map: BTreeMap<String, String> =
            keys.iter().map(|k| (k.clone(), String::new())).collect();

        for token in window.named() {
            if let (Some(slot), Some(value)) = (map.get_mut(&token.key.to_lowercase()), token.value) {
                *slot = value.to_string();
            }
        }
        Value::KeyValues(map)
    }

    fn extract_flags(keys: &[String], window: CaptureWindow<'_, '_>) -> Value {
        let mut map: BTreeMap<String, bool> = keys.iter().map(|k| (k.clone(), false)).collect();

        for token in window.named().iter().filter(|t| t.value.is_none()) {
            if let Some(slot) = map.get_mut(&token.key.to_lowercase()) {
                *slot = true;
            }
        }
        Value::Flags(map)
    }
}

/// Case-insensitive alternation of `options`, longest first so that `ab` is
/// not matched as `a`. An empty set never matches.
fn alternation(options: &[String]) -> String {
    if options.is_empty() {
        return r"[^\s\S]".to_string();
    }
    let mut sorted: Vec<&String> = options.iter().collect();
    sorted.sort_by_key(|o| std::cmp::Reverse(o.len()));
    let escaped: Vec<String> = sorted.iter().map(|o| regex::escape(o)).collect();
    escaped.join("|")
}

/// The closed key set of a signature's named parameters.
///
/// Only declared keys start a token; any other `--word` is ordinary text,
/// either inside the free text before the run or inside a value.
#[derive(Clone, Debug)]
pub struct NamedKeys {
    values: Vec<String>,
    flags: Vec<String>,
    splitter: Regex,
}

impl NamedKeys {
    /// Collects the keys of every named parameter in `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token matcher does not compile.
    pub fn of<'p>(params: impl IntoIterator<Item = &'p ParamSpec>) -> Result<Self> {
        let mut values = Vec::new();
        let mut flags = Vec::new();
        for param in params {
            match &param.kind {
                ParamKind::NamedKeyValues(keys) => values.extend(keys.iter().cloned()),
                ParamKind::NamedFlags(keys) => flags.extend(keys.iter().cloned()),
                _ => {}
            }
        }

        let token = format!(
            r"--((?i:{}))=(.*?)|--((?i:{}))",
            alternation(&values),
            alternation(&flags)
        );
        let run = Self::run_pattern(&values, &flags);
        let splitter = Regex::new(&format!(r"^(?:{token})(?:\s+({run}))?$"))
            .map_err(|e| Error::invalid_pattern("named arguments", e.to_string()))?;

        Ok(Self {
            values,
            flags,
            splitter,
        })
    }

    /// Returns true if no keys are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.flags.is_empty()
    }

    /// Returns the optional one-group fragment matching a run of tokens.
    #[must_use]
    pub fn fragment(&self) -> Fragment {
        Self::run_fragment(&self.values, &self.flags).optional()
    }

    fn run_fragment(values: &[String], flags: &[String]) -> Fragment {
        Fragment::delimited().capture(&Self::run_pattern(values, flags))
    }

    /// A capture-free pattern for one or more whitespace-separated tokens.
    /// A value runs lazily up to the next declared token or the end.
    fn run_pattern(values: &[String], flags: &[String]) -> String {
        let token = format!(
            r"(?:--(?i:{})=.*?|--(?i:{}))",
            alternation(values),
            alternation(flags)
        );
        format!(r"{token}(?:\s+{token})*")
    }

    /// Splits a run matched by [`NamedKeys::fragment`] into tokens, in input
    /// order. Text that is not a run yields no tokens.
    #[must_use]
    pub fn split<'h>(&self, run: &'h str) -> Vec<NamedToken<'h>> {
        let mut tokens = Vec::new();
        let mut rest = run.trim();
        while let Some(caps) = self.splitter.captures(rest) {
            if let Some(key) = caps.get(1) {
                tokens.push(NamedToken {
                    key: key.as_str(),
                    value: Some(caps.get(2).map_or("", |m| m.as_str().trim())),
                });
            } else if let Some(key) = caps.get(3) {
                tokens.push(NamedToken {
                    key: key.as_str(),
                    value: None,
                });
            }
            match caps.get(4) {
                Some(next) => rest = next.as_str(),
                None => break,
            }
        }
        tokens
    }
}
