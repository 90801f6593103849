//! Extracted argument values, in declaration order.

use std::time::Duration;

use sigil_foundation::{Error, ItemRef, Result, Value};

/// The values extracted from one matched invocation.
///
/// Values are kept in the order their parameters were declared. Lookup by
/// name returns the first parameter with that name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: String, value: Value) {
        self.values.push((name, value));
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value for parameter `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns the value at declaration position `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, v)| v)
    }

    /// Iterates `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| Error::invalid_value(name, "no such argument"))
    }

    fn mismatch(name: &str, expected: &str, found: &Value) -> Error {
        Error::invalid_value(
            name,
            format!("expected {expected}, found {}", found.type_name()),
        )
    }

    /// Returns a text argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing or not text.
    pub fn text(&self, name: &str) -> Result<&str> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| Self::mismatch(name, "text", value))
    }

    /// Returns a text argument, or `None` if the optional parameter was omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is present but not text.
    pub fn optional_text(&self, name: &str) -> Result<Option<&str>> {
        match self.get(name) {
            None | Some(Value::Absent) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| Self::mismatch(name, "text", value)),
        }
    }

    /// Returns an integer argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing or not an integer.
    pub fn int(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value
            .as_int()
            .ok_or_else(|| Self::mismatch(name, "integer", value))
    }

    /// Returns a decimal argument. Integers widen.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing or not numeric.
    pub fn decimal(&self, name: &str) -> Result<f64> {
        let value = self.require(name)?;
        value
            .as_decimal()
            .ok_or_else(|| Self::mismatch(name, "decimal", value))
    }

    /// Returns a duration argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing or not a duration.
    pub fn duration(&self, name: &str) -> Result<Duration> {
        let value = self.require(name)?;
        value
            .as_duration()
            .ok_or_else(|| Self::mismatch(name, "duration", value))
    }

    /// Returns an item reference argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing or not a reference.
    pub fn reference(&self, name: &str) -> Result<&ItemRef> {
        let value = self.require(name)?;
        value
            .as_reference()
            .ok_or_else(|| Self::mismatch(name, "reference", value))
    }

    /// Returns the values of a repeated argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing or not a list.
    pub fn list(&self, name: &str) -> Result<&[Value]> {
        let value = self.require(name)?;
        value
            .as_list()
            .ok_or_else(|| Self::mismatch(name, "list", value))
    }

    /// Returns whether `key` was set in the flags argument `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing, not a flag set, or does
    /// not declare `key`.
    pub fn flag(&self, name: &str, key: &str) -> Result<bool> {
        let value = self.require(name)?;
        match value {
            Value::Flags(_) => value
                .flag(key)
                .ok_or_else(|| Error::invalid_value(name, format!("no flag named '{key}'"))),
            other => Err(Self::mismatch(name, "flags", other)),
        }
    }

    /// Returns the value of `key` in the key-value argument `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing, not a key-value set, or
    /// does not declare `key`.
    pub fn key(&self, name: &str, key: &str) -> Result<&str> {
        let value = self.require(name)?;
        match value {
            Value::KeyValues(_) => value
                .key(key)
                .ok_or_else(|| Error::invalid_value(name, format!("no key named '{key}'"))),
            other => Err(Self::mismatch(name, "key-values", other)),
        }
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
