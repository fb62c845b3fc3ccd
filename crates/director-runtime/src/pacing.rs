#![forbid(unsafe_code)]

//! Skip detection and transition pacing.
//!
//! Every navigation command is timestamped. A command arriving less than
//! the skip window after the previous one is a *skip*: the user is paging
//! faster than the eye can follow, so in-flight transitions are hurried and
//! the new command plays with zero-length transitions.
//!
//! # Pace resolution
//!
//! | Condition                  | Pace        | Duration cap                    |
//! |----------------------------|-------------|---------------------------------|
//! | gap < skip window          | `Skipping`  | `skip_duration_cap` (0ms)       |
//! | caller passed `instant`    | `Instant`   | `instant_duration_cap` (300ms)  |
//! | otherwise                  | `Animated`  | none                            |
//!
//! Skipping wins over the caller's flag. The very first command never skips.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

use crate::config::DirectorConfig;

/// Monotonic time source for skip detection.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by a monotonic [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for deterministic tests.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a [`Director`](crate::Director).
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get() + dt);
    }

    /// Convenience for [`advance`](Self::advance) in milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute time.
    pub fn set(&self, t: Duration) {
        self.now.set(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// How a single navigation command plays its transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Scripted timing, untouched.
    Animated,
    /// Caller asked for an instant jump.
    Instant,
    /// Detected rapid navigation.
    Skipping,
}

impl Pace {
    /// Cap applied to transition durations at this pace.
    #[must_use]
    pub fn duration_cap(self, config: &DirectorConfig) -> Option<Duration> {
        match self {
            Self::Animated => None,
            Self::Instant => Some(config.instant_duration_cap()),
            Self::Skipping => Some(config.skip_duration_cap()),
        }
    }
}

/// Debounce state: the timestamp of the last navigation command.
#[derive(Debug, Clone)]
pub struct Pacer {
    window: Duration,
    last_command: Option<Duration>,
}

impl Pacer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_command: None,
        }
    }

    /// Record a command at `now` and report whether it is a skip.
    pub fn skipping(&mut self, now: Duration) -> bool {
        let skip = self
            .last_command
            .is_some_and(|last| now.saturating_sub(last) < self.window);
        self.last_command = Some(now);
        skip
    }

    /// Record a command and decide its pace.
    pub fn resolve(&mut self, now: Duration, instant: bool) -> Pace {
        if self.skipping(now) {
            Pace::Skipping
        } else if instant {
            Pace::Instant
        } else {
            Pace::Animated
        }
    }

    /// When the last command was recorded.
    #[must_use]
    pub fn last_command(&self) -> Option<Duration> {
        self.last_command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn first_command_never_skips() {
        let mut pacer = Pacer::new(WINDOW);
        assert!(!pacer.skipping(Duration::ZERO));
        assert_eq!(pacer.last_command(), Some(Duration::ZERO));
    }

    #[test]
    fn gap_below_window_skips() {
        let mut pacer = Pacer::new(WINDOW);
        pacer.skipping(Duration::from_millis(1000));
        assert!(pacer.skipping(Duration::from_millis(1499)));
        // Measured from the previous command, not the first.
        assert!(pacer.skipping(Duration::from_millis(1998)));
        assert!(!pacer.skipping(Duration::from_millis(2498)));
    }

    #[test]
    fn zero_window_disables_skipping() {
        let mut pacer = Pacer::new(Duration::ZERO);
        pacer.skipping(Duration::ZERO);
        assert!(!pacer.skipping(Duration::ZERO));
    }

    #[test]
    fn skipping_overrides_instant_flag() {
        let mut pacer = Pacer::new(WINDOW);
        assert_eq!(pacer.resolve(Duration::ZERO, true), Pace::Instant);
        assert_eq!(pacer.resolve(Duration::from_millis(10), false), Pace::Skipping);
        assert_eq!(pacer.resolve(Duration::from_millis(2000), false), Pace::Animated);
    }

    #[test]
    fn pace_caps() {
        let config = DirectorConfig::default();
        assert_eq!(Pace::Animated.duration_cap(&config), None);
        assert_eq!(
            Pace::Instant.duration_cap(&config),
            Some(Duration::from_millis(300))
        );
        assert_eq!(Pace::Skipping.duration_cap(&config), Some(Duration::ZERO));
    }

    #[test]
    fn manual_clock_handles_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance_ms(250);
        assert_eq!(other.now(), Duration::from_millis(250));
        other.set(Duration::from_secs(3));
        assert_eq!(clock.now(), Duration::from_secs(3));
    }
}
