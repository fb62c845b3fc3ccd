#![forbid(unsafe_code)]

//! Director Runtime
//!
//! The timeline controller for scripted presentations.
//!
//! # Key Components
//!
//! - [`Director`] - step-indexed navigation with generated undo
//! - [`DirectorConfig`] - pacing policy (skip window, duration caps)
//! - [`Pacer`] / [`Clock`] - rapid-navigation detection
//! - [`EventBus`] - navigation notifications
//! - [`DirectorError`] - failures surfaced by navigation
//!
//! # Role in Director
//! `director-runtime` sits between the application's input (keys, buttons,
//! a remote) and the [`Stage`](director_core::Stage) that draws. It moves
//! an index through a [`Script`](director_core::Script), applies each step
//! while recording its inverse, and replays those inverses to go back.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut director = Director::new(stage, script);
//! director.forward(false)?.forward(false)?;
//! director.back(true)?;
//! director.go(-1, false)?; // last step
//! ```

pub mod config;
pub mod delegate;
pub mod director;
pub mod error;
pub mod events;
pub mod pacing;

pub use config::{DirectorConfig, PolicyConfigError};
pub use delegate::DELEGATED_OPERATIONS;
pub use director::{Director, wrap_index};
pub use error::{DirectorError, DirectorResult};
pub use events::{Direction, EventBus, NavigationEvent, Subscription};
pub use pacing::{Clock, ManualClock, Pace, Pacer, SystemClock};
