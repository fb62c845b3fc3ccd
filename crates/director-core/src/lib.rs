#![forbid(unsafe_code)]

//! Core: op model, selectors, attributes, and the rollback store.
//!
//! # Role in Director
//! `director-core` holds the data a presentation script is made of and the
//! rules for undoing it. The timeline controller (`director-runtime`) drives
//! these types; the scene itself lives behind the [`Stage`] trait, which the
//! embedding application implements.
//!
//! # Primary responsibilities
//! - **Op**: one scripted action (`add`, `remove`, `set`, `animate`) that can
//!   compute its own inverse against the pre-op scene.
//! - **Step / Script / RollbackLog**: ordered containers for forward ops and
//!   the recorded inverses.
//! - **Stage**: the collaborator contract for whatever owns the primitives.
//! - **ticks**: axis graduation helper for scripts that lay out axes.

pub mod animation;
pub mod attrs;
pub mod error;
pub mod op;
pub mod selector;
pub mod stage;
pub mod step;
pub mod ticks;

pub use animation::{AnimationParams, INSTANT_DURATION_CAP, ROLLBACK_DURATION_CAP, SKIP_WINDOW};
pub use attrs::{Attrs, Value};
pub use error::{ScriptError, StageError};
pub use op::{Op, Payload, Verb};
pub use selector::{PrimitiveRef, Selector, SequenceId};
pub use stage::{Stage, StageResult};
pub use step::{RollbackLog, Script, Step};
pub use ticks::{TickSpec, ticks};
