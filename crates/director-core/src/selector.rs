#![forbid(unsafe_code)]

//! Selectors and primitive references.
//!
//! The core never holds primitive instances. It addresses them through a
//! [`Selector`], and the stage answers `select` with [`PrimitiveRef`] values
//! describing what matched.

use std::fmt;

/// Stable, monotonically assigned identity of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(pub u64);

impl SequenceId {
    /// Create a sequence identifier from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The identifier allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies zero or more target primitives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Exactly the primitive with this sequence identifier.
    Sequence(SequenceId),
    /// The unique primitive registered under this name.
    Singleton(String),
    /// Every primitive of this type.
    Type(String),
    /// Every live primitive.
    All,
    /// Stage-specific query; interpretation belongs to the stage.
    Query(String),
}

impl Selector {
    /// Parse the textual selector forms.
    ///
    /// `*` selects everything, `#name` a singleton, a bare integer a sequence
    /// identifier, and a plain identifier a type. Anything else is passed to
    /// the stage as a [`Selector::Query`].
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input == "*" {
            return Self::All;
        }
        if let Some(name) = input.strip_prefix('#') {
            if !name.is_empty() {
                return Self::Singleton(name.to_string());
            }
        }
        if let Ok(id) = input.parse::<u64>() {
            return Self::Sequence(SequenceId(id));
        }
        let is_ident = !input.is_empty()
            && input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !input.starts_with(|c: char| c.is_ascii_digit());
        if is_ident {
            Self::Type(input.to_string())
        } else {
            Self::Query(input.to_string())
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(id) => write!(f, "{id}"),
            Self::Singleton(name) => write!(f, "#{name}"),
            Self::Type(kind) => f.write_str(kind),
            Self::All => f.write_str("*"),
            Self::Query(q) => f.write_str(q),
        }
    }
}

impl From<SequenceId> for Selector {
    fn from(id: SequenceId) -> Self {
        Self::Sequence(id)
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Value description of a live primitive, as returned by the stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimitiveRef {
    /// Sequence identifier assigned at spawn.
    pub sequence: SequenceId,
    /// Primitive type name (e.g. `circle`, `axis`).
    pub kind: String,
    /// Stable name for unique primitives.
    pub singleton: Option<String>,
}

impl PrimitiveRef {
    #[must_use]
    pub fn new(sequence: SequenceId, kind: impl Into<String>) -> Self {
        Self {
            sequence,
            kind: kind.into(),
            singleton: None,
        }
    }

    /// Attach a singleton name (builder pattern).
    #[must_use]
    pub fn with_singleton(mut self, name: impl Into<String>) -> Self {
        self.singleton = Some(name.into());
        self
    }

    /// The narrowest selector that addresses only this primitive.
    ///
    /// Singleton name if there is one, else the sequence identifier. Inverse
    /// ops use this so they cannot re-match a different set later.
    #[must_use]
    pub fn identity(&self) -> Selector {
        match &self.singleton {
            Some(name) => Selector::Singleton(name.clone()),
            None => Selector::Sequence(self.sequence),
        }
    }
}
