#![forbid(unsafe_code)]

//! Test harness and reference fixtures for the director timeline.
//!
//! - [`MemoryStage`]: an in-memory [`Stage`](director_core::Stage) with a
//!   call journal.
//! - [`fixtures`]: small scripts used across the workspace's tests.
//! - [`init_tracing`]: installs a `tracing` subscriber honoring `RUST_LOG`.

pub mod fixtures;
pub mod memory_stage;

pub use memory_stage::{MemoryStage, Primitive, SINGLETON_KEY, StageCall, Transition};

use tracing_subscriber::EnvFilter;

/// Install a global subscriber for tests and demos.
///
/// Filter comes from `RUST_LOG` (default `warn`). With the `tracing-json`
/// feature, events are written as JSON lines. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer();

    #[cfg(feature = "tracing-json")]
    let result = builder.json().try_init();
    #[cfg(not(feature = "tracing-json"))]
    let result = builder.try_init();

    // Already installed by an earlier test in the same process.
    let _ = result;
}
