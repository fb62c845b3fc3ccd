#![forbid(unsafe_code)]

//! Error types for ops and stage calls.
//!
//! A selector that matches nothing is not an error; it is a zero-target op.
//! Errors are reserved for scripts that cannot be expressed (unknown verbs)
//! and for stages that refuse a mutation.

use std::fmt;

use crate::selector::{SequenceId, Selector};

/// Errors a [`Stage`](crate::Stage) reports for a mutation it cannot perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The referenced primitive no longer exists.
    UnknownPrimitive(SequenceId),
    /// `spawn` was asked to reuse a sequence identifier that is live.
    DuplicateSequence(SequenceId),
    /// The stage does not know how to build primitives of this type.
    UnknownType(String),
    /// The stage rejected the call for another reason.
    Rejected(String),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPrimitive(id) => write!(f, "primitive {id} does not exist"),
            Self::DuplicateSequence(id) => write!(f, "sequence {id} is already in use"),
            Self::UnknownType(kind) => write!(f, "unknown primitive type '{kind}'"),
            Self::Rejected(msg) => write!(f, "stage rejected call: {msg}"),
        }
    }
}

impl std::error::Error for StageError {}

/// Errors in how a script is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The verb is not one of `add`, `remove`, `set`, `animate`.
    UnknownVerb(String),
    /// An op needs a payload shape it was not given.
    InvalidPayload { verb: &'static str, reason: String },
    /// An `add` op was addressed with something other than a type name.
    InvalidSelector { verb: &'static str, selector: Selector },
    /// `insert` was called with no ops.
    EmptyStep,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVerb(verb) => write!(f, "unknown verb '{verb}'"),
            Self::InvalidPayload { verb, reason } => {
                write!(f, "invalid payload for '{verb}': {reason}")
            }
            Self::InvalidSelector { verb, selector } => {
                write!(f, "'{verb}' cannot target selector '{selector}'")
            }
            Self::EmptyStep => f.write_str("step contains no ops"),
        }
    }
}

impl std::error::Error for ScriptError {}
