#![forbid(unsafe_code)]

//! Director public facade crate.
//!
//! Re-exports the op model from `director-core` and the timeline controller
//! from `director-runtime`, and offers a prelude for day-to-day use.
//!
//! ```rust,ignore
//! use director::prelude::*;
//!
//! let script = Script::from(vec![Step::from(Op::add("circle", Attrs::new().with("radius", 5)))]);
//! let mut director = Director::new(my_stage, script);
//! director.forward(false)?;
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use director_core::{
    AnimationParams, Attrs, INSTANT_DURATION_CAP, Op, Payload, PrimitiveRef,
    ROLLBACK_DURATION_CAP, RollbackLog, SKIP_WINDOW, Script, ScriptError, Selector, SequenceId,
    Stage, StageError, StageResult, Step, TickSpec, Value, Verb, ticks,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use director_runtime::{
    Clock, DELEGATED_OPERATIONS, Direction, Director, DirectorConfig, DirectorError, EventBus,
    ManualClock, NavigationEvent, Pace, Subscription, SystemClock,
};

#[cfg(feature = "policy-config")]
pub use director_runtime::PolicyConfigError;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for director apps.
#[derive(Debug)]
pub enum Error {
    /// A script could not be built.
    Script(ScriptError),
    /// A stage call failed outside navigation.
    Stage(StageError),
    /// Navigation failed.
    #[cfg(feature = "runtime")]
    Director(DirectorError),
    /// Pacing policy could not be loaded.
    #[cfg(feature = "policy-config")]
    Config(PolicyConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script(err) => write!(f, "{err}"),
            Self::Stage(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Director(err) => write!(f, "{err}"),
            #[cfg(feature = "policy-config")]
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Script(err) => Some(err),
            Self::Stage(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Director(err) => Some(err),
            #[cfg(feature = "policy-config")]
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ScriptError> for Error {
    fn from(err: ScriptError) -> Self {
        Self::Script(err)
    }
}

impl From<StageError> for Error {
    fn from(err: StageError) -> Self {
        Self::Stage(err)
    }
}

#[cfg(feature = "runtime")]
impl From<DirectorError> for Error {
    fn from(err: DirectorError) -> Self {
        Self::Director(err)
    }
}

#[cfg(feature = "policy-config")]
impl From<PolicyConfigError> for Error {
    fn from(err: PolicyConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for director APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Build a step from textual `(verb, selector)` pairs.
///
/// Payloads and timing are attached per op; this is the entry point for
/// scripts that arrive as data rather than Rust code.
pub fn step_from_parts<'a, I>(ops: I) -> Result<Step>
where
    I: IntoIterator<
        Item = (
            &'a str,
            &'a str,
            Option<Payload>,
            Option<AnimationParams>,
        ),
    >,
{
    ops.into_iter()
        .map(|(verb, selector, payload, animation)| {
            Op::from_parts(verb, selector, payload, animation).map_err(Error::from)
        })
        .collect()
}

pub mod prelude {
    pub use crate::{
        AnimationParams, Attrs, Error, Op, Result, Script, Selector, SequenceId, Stage, Step,
        Value,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Direction, Director, DirectorConfig, NavigationEvent};

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use director_core as core;
#[cfg(feature = "runtime")]
pub use director_runtime as runtime;
