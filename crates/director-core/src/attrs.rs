#![forbid(unsafe_code)]

//! Attribute values and maps carried by op payloads and stage snapshots.
//!
//! [`Attrs`] is backed by a persistent ordered map ([`im::OrdMap`]), so the
//! pre-state snapshots captured while generating inverses share structure
//! with the stage's own copy and cost close to nothing to clone.
//!
//! # Unsetting
//!
//! A [`Value::Null`] entry in a `set`/`animate` payload means "remove this
//! attribute". Inverse generation relies on it: a key the forward op adds
//! that did not exist before is recorded as `Null`, so undo removes it again.

use std::fmt;

use im::OrdMap;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Scalar number (positions, radii, opacity, durations in ms).
    Number(f64),
    /// Free-form text (labels, colors, singleton names).
    Text(String),
    /// Flag.
    Bool(bool),
    /// Numeric vector (points, ranges).
    List(Vec<f64>),
    /// Absent; removes the attribute when written.
    Null,
}

impl Value {
    /// Numeric view, if this is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view, if this is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value unsets its attribute.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(v) => write!(f, "{v:?}"),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
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

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::List(v)
    }
}

/// Ordered attribute map.
///
/// Iteration order is key order, which keeps snapshots and journals
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    entries: OrdMap<String, Value>,
}

impl Attrs {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Insert or overwrite an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every entry of `other` into `self`. `Null` entries remove the key.
    pub fn merge(&mut self, other: &Attrs) {
        for (key, value) in other.iter() {
            if value.is_null() {
                self.entries.remove(key);
            } else {
                self.entries.insert(key.to_string(), value.clone());
            }
        }
    }

    /// Extend a pre-state snapshot so it also restores keys `touched` adds.
    ///
    /// Every key of `touched` missing from `self` is recorded as `Null`.
    #[must_use]
    pub fn covering(mut self, touched: &Attrs) -> Self {
        for key in touched.keys() {
            if !self.entries.contains_key(key) {
                self.entries.insert(key.to_string(), Value::Null);
            }
        }
        self
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
