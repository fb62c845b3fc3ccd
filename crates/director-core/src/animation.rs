#![forbid(unsafe_code)]

//! Animation parameters and the clamps applied to them.
//!
//! Durations are milliseconds carried as [`Duration`]. Clamping always
//! produces a new value; scripted ops are never mutated in place.

use std::time::Duration;

/// Upper bound on the duration of generated inverse transitions.
pub const ROLLBACK_DURATION_CAP: Duration = Duration::from_millis(300);

/// Upper bound on transition duration when a command is played instantly.
pub const INSTANT_DURATION_CAP: Duration = Duration::from_millis(300);

/// Commands closer together than this are treated as rapid skips.
pub const SKIP_WINDOW: Duration = Duration::from_millis(500);

/// Timing of an animated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationParams {
    /// How long the transition runs.
    pub duration: Duration,
    /// How long to wait before it starts.
    pub delay: Duration,
}

impl AnimationParams {
    /// Transition of the given duration with no delay.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
        }
    }

    /// Convenience constructor from milliseconds.
    #[must_use]
    pub const fn millis(duration_ms: u64) -> Self {
        Self::new(Duration::from_millis(duration_ms))
    }

    /// Set the start delay (builder pattern).
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Copy with zero delay and duration capped at `cap`.
    #[must_use]
    pub fn clamped(self, cap: Duration) -> Self {
        Self {
            duration: self.duration.min(cap),
            delay: Duration::ZERO,
        }
    }

    /// Timing used for an inverse transition: the original duration capped
    /// at `cap`, or `cap` itself when the original was not animated or
    /// lasted zero time.
    #[must_use]
    pub fn for_rollback(original: Option<&Self>, cap: Duration) -> Self {
        match original.map(|a| a.duration.min(cap)) {
            Some(duration) if !duration.is_zero() => Self::new(duration),
            _ => Self::new(cap),
        }
    }

    /// Total time until the transition reaches its final state.
    #[must_use]
    pub fn end(&self) -> Duration {
        self.delay + self.duration
    }
}
