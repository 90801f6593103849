//! Typed argument values produced by parameter extraction.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::time::format_duration;

/// An inline item reference: a `low/high/quantity` triple plus a label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRef {
    /// Lower identifier bound.
    pub low: u64,
    /// Upper identifier bound.
    pub high: u64,
    /// Quantity referenced.
    pub quantity: u64,
    /// Display label.
    pub label: String,
}

impl ItemRef {
    /// Creates a new item reference.
    #[must_use]
    pub fn new(low: u64, high: u64, quantity: u64, label: impl Into<String>) -> Self {
        Self {
            low,
            high,
            quantity,
            label: label.into(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<ref low={} high={} qty={}>{}</ref>",
            self.low, self.high, self.quantity, self.label
        )
    }
}

/// A single extracted argument value.
///
/// Every parameter kind maps to exactly one variant; optional parameters
/// that were not supplied extract as [`Value::Absent`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An optional parameter that was not supplied.
    Absent,
    /// Free text, constant tokens, and enumerated choices.
    Text(String),
    /// Whole number.
    Int(i64),
    /// Decimal number.
    Decimal(f64),
    /// A span of time.
    Duration(Duration),
    /// Inline item reference.
    Reference(ItemRef),
    /// Named `--key=value` arguments over a closed key set.
    KeyValues(BTreeMap<String, String>),
    /// Named `--flag` arguments over a closed key set.
    Flags(BTreeMap<String, bool>),
    /// Raw groups of a custom pattern.
    Groups(Vec<Option<String>>),
    /// One value per occurrence of a repeated parameter.
    List(Vec<Value>),
}

impl Value {
    /// Returns true if this value is absent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Attempts to extract a string slice.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a decimal value (integers widen).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Self::Decimal(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to extract a duration.
    #[must_use]
    pub const fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Attempts to extract an item reference.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&ItemRef> {
        match self {
            Self::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Attempts to extract a list of values.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to extract custom pattern groups.
    #[must_use]
    pub fn as_groups(&self) -> Option<&[Option<String>]> {
        match self {
            Self::Groups(groups) => Some(groups),
            _ => None,
        }
    }

    /// Looks up a named key value. Missing keys of a key/value set are empty.
    #[must_use]
    pub fn key(&self, key: &str) -> Option<&str> {
        match self {
            Self::KeyValues(map) => map.get(key).map(String::as_str),
            _ => None,
        }
    }

    /// Looks up a named flag. Returns `None` if this is not a flag set or
    /// the set does not declare `key`.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self {
            Self::Flags(map) => map.get(key).copied(),
            _ => None,
        }
    }

    /// Returns a short name for the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Text(_) => "text",
            Self::Int(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Duration(_) => "duration",
            Self::Reference(_) => "reference",
            Self::KeyValues(_) => "key-values",
            Self::Flags(_) => "flags",
            Self::Groups(_) => "groups",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "-"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Decimal(n) => write!(f, "{n}"),
            Self::Duration(d) => write!(f, "{}", format_duration(*d)),
            Self::Reference(r) => write!(f, "{r}"),
            Self::KeyValues(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("--{k}={v}")).collect();
                write!(f, "{}", parts.join(" "))
            }
            Self::Flags(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .filter(|(_, on)| **on)
                    .map(|(k, _)| format!("--{k}"))
                    .collect();
                write!(f, "{}", parts.join(" "))
            }
            Self::Groups(groups) => {
                let parts: Vec<&str> = groups.iter().map(|g| g.as_deref().unwrap_or("")).collect();
                write!(f, "{}", parts.join(" "))
            }
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Decimal(n)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

impl From<ItemRef> for Value {
    fn from(r: ItemRef) -> Self {
        Self::Reference(r)
    }
}
