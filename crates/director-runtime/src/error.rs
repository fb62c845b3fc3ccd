#![forbid(unsafe_code)]

//! Errors surfaced by the timeline controller.
//!
//! Boundary navigation (`back` at 0, `forward` at the end) and out-of-range
//! seeks are not errors; they are no-ops or wrap around.

use std::fmt;

use director_core::{ScriptError, StageError};

/// Result alias for director operations.
pub type DirectorResult<T> = Result<T, DirectorError>;

/// Errors from navigation and delegated stage calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorError {
    /// An op of a step failed while moving through it.
    Apply {
        /// Step index being applied (forward) or reverted (back).
        step: usize,
        /// Position of the failing op within the step.
        op: usize,
        source: StageError,
    },
    /// A delegated stage call failed.
    Stage(StageError),
    /// The script itself is malformed.
    Script(ScriptError),
}

impl fmt::Display for DirectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply { step, op, source } => {
                write!(f, "step {step}, op {op}: {source}")
            }
            Self::Stage(e) => write!(f, "stage call failed: {e}"),
            Self::Script(e) => write!(f, "invalid script: {e}"),
        }
    }
}

impl std::error::Error for DirectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apply { source, .. } => Some(source),
            Self::Stage(e) => Some(e),
            Self::Script(e) => Some(e),
        }
    }
}

impl From<StageError> for DirectorError {
    fn from(e: StageError) -> Self {
        Self::Stage(e)
    }
}

impl From<ScriptError> for DirectorError {
    fn from(e: ScriptError) -> Self {
        Self::Script(e)
    }
}
