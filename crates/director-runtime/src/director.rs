#![forbid(unsafe_code)]

//! The timeline controller.
//!
//! [`Director`] owns the script, the rollback log and the current step
//! index, and drives a [`Stage`] through them.
//!
//! ```text
//!            forward(): invert + apply step[i], log[i] = inverse, i += 1
//!          ┌────────────────────────────────────────────┐
//!          │                                            ▼
//!   ┌─────────────┐                             ┌─────────────┐
//!   │  step = i   │                             │ step = i+1  │
//!   └─────────────┘                             └─────────────┘
//!          ▲                                            │
//!          └────────────────────────────────────────────┘
//!            back(): i -= 1, apply log[i], delete log[i]
//! ```
//!
//! # Invariants
//!
//! 1. `0 <= step() <= len()`.
//! 2. The rollback log has an entry for exactly the indices `0..step()`.
//! 3. `forward` at `len()` and `back` at 0 change nothing and publish no
//!    event.
//! 4. A navigation event is published after, and only after, a successful
//!    transition.
//!
//! # Failure Modes
//!
//! - **Op fails mid-forward**: the inverses recorded so far are replayed
//!   (best effort), the step index stays put, and the error is returned.
//! - **Op fails mid-back**: the error is returned with the index and the
//!   rollback entry untouched; the scene may be partially reverted.
//! - **Insert fails to play**: the spliced step is removed again.

use std::fmt;
use std::time::Duration;

use director_core::{RollbackLog, Script, Stage, StageError, Step};
use tracing::field::Empty;

use crate::config::DirectorConfig;
use crate::error::{DirectorError, DirectorResult};
use crate::events::{Direction, EventBus, NavigationEvent, Subscription};
use crate::pacing::{Clock, Pace, Pacer, SystemClock};

/// Step-indexed navigation over a script, with generated undo.
pub struct Director<S: Stage, C: Clock = SystemClock> {
    stage: S,
    script: Script,
    rollback: RollbackLog,
    step: usize,
    config: DirectorConfig,
    pacer: Pacer,
    clock: C,
    events: EventBus,
}

impl<S: Stage, C: Clock> fmt::Debug for Director<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Director")
            .field("step", &self.step)
            .field("len", &self.script.len())
            .field("rollback_entries", &self.rollback.len())
            .field("config", &self.config)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<S: Stage> Director<S, SystemClock> {
    /// Create a director positioned before the first step.
    #[must_use]
    pub fn new(stage: S, script: impl Into<Script>) -> Self {
        Self::with_config(stage, script, DirectorConfig::default())
    }

    /// Create a director with custom pacing.
    #[must_use]
    pub fn with_config(stage: S, script: impl Into<Script>, config: DirectorConfig) -> Self {
        Self {
            stage,
            script: script.into(),
            rollback: RollbackLog::new(),
            step: 0,
            pacer: Pacer::new(config.skip_window()),
            config,
            clock: SystemClock::default(),
            events: EventBus::new(),
        }
    }
}

impl<S: Stage, C: Clock> Director<S, C> {
    /// Swap the time source (builder pattern).
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Director<S, C2> {
        Director {
            stage: self.stage,
            script: self.script,
            rollback: self.rollback,
            step: self.step,
            config: self.config,
            pacer: self.pacer,
            clock,
            events: self.events,
        }
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// Current step index: how many steps are applied.
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of steps in the script.
    #[must_use]
    pub fn len(&self) -> usize {
        self.script.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// Whether every step is applied.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.step >= self.script.len()
    }

    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    #[must_use]
    pub fn rollback(&self) -> &RollbackLog {
        &self.rollback
    }

    #[must_use]
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    #[must_use]
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Mutable access to the stage, e.g. to drive its frame loop.
    ///
    /// Changes made here bypass the rollback log.
    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    /// Consume the director and return the stage.
    #[must_use]
    pub fn into_stage(self) -> S {
        self.stage
    }

    /// Register a navigation listener.
    pub fn subscribe(&self, listener: impl Fn(&NavigationEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Apply the next step, recording its inverse. No-op at the end.
    pub fn forward(&mut self, instant: bool) -> DirectorResult<&mut Self> {
        self.step_forward(instant)?;
        Ok(self)
    }

    /// Revert the last applied step from the rollback log. No-op at 0.
    pub fn back(&mut self, instant: bool) -> DirectorResult<&mut Self> {
        self.step_back(instant)?;
        Ok(self)
    }

    /// Seek to `target`, wrapping it into `0..=len()`.
    ///
    /// Moves one step at a time, so every intermediate step is applied or
    /// reverted and publishes its own event. No-op on an empty script.
    pub fn go(&mut self, target: i64, instant: bool) -> DirectorResult<&mut Self> {
        if self.script.is_empty() {
            return Ok(self);
        }
        let target = wrap_index(target, self.script.len());
        let _span = tracing::debug_span!("director.go", from = self.step, to = target).entered();

        while self.step < target {
            self.step_forward(instant)?;
        }
        while self.step > target {
            self.step_back(instant)?;
        }
        Ok(self)
    }

    /// Splice a step in at the current position and play it immediately.
    pub fn insert(&mut self, step: impl Into<Step>) -> DirectorResult<&mut Self> {
        let step = step.into();
        if step.is_empty() {
            return Err(DirectorError::Script(director_core::ScriptError::EmptyStep));
        }
        let index = self.step;
        tracing::debug!(
            target: "director.timeline",
            index,
            ops = step.len(),
            "inserting step"
        );
        self.script.insert(index, step);
        if let Err(e) = self.step_forward(false) {
            self.script.remove(index);
            return Err(e);
        }
        Ok(self)
    }

    /// Apply an arbitrary step to the stage without moving the timeline.
    ///
    /// With `rollback`, inverses are prepended to it as each op is applied.
    /// `instant` clamps transitions to the instant cap.
    pub fn apply(
        &mut self,
        step: &Step,
        rollback: Option<&mut Step>,
        instant: bool,
    ) -> DirectorResult<&mut Self> {
        let cap = instant.then(|| self.config.instant_duration_cap());
        let rollback_cap = self.config.rollback_duration_cap();
        apply_step(&mut self.stage, step, rollback, cap, rollback_cap).map_err(
            |(op, source)| DirectorError::Apply {
                step: self.step,
                op,
                source,
            },
        )?;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Returns whether the timeline moved.
    fn step_forward(&mut self, instant: bool) -> DirectorResult<bool> {
        if self.at_end() {
            tracing::trace!(target: "director.timeline", step = self.step, "forward at end");
            return Ok(false);
        }
        let index = self.step;
        let span = tracing::debug_span!("director.forward", step = index, pace = Empty).entered();
        let pace = self.pace(instant);
        span.record("pace", tracing::field::debug(pace));

        let cap = pace.duration_cap(&self.config);
        let rollback_cap = self.config.rollback_duration_cap();
        let Some(step) = self.script.get(index) else {
            return Ok(false);
        };
        let mut inverse = Step::default();
        if let Err((op, source)) =
            apply_step(&mut self.stage, step, Some(&mut inverse), cap, rollback_cap)
        {
            tracing::warn!(
                target: "director.timeline",
                step = index,
                op,
                error = %source,
                "forward failed, reverting partial step"
            );
            revert_partial(&mut self.stage, &inverse);
            return Err(DirectorError::Apply {
                step: index,
                op,
                source,
            });
        }

        self.rollback.record(index, inverse);
        self.step = index + 1;
        tracing::debug!(target: "director.timeline", step = self.step, "stepped forward");
        self.events.publish(NavigationEvent {
            step: self.step,
            direction: Direction::Forward,
        });
        Ok(true)
    }

    /// Returns whether the timeline moved.
    fn step_back(&mut self, instant: bool) -> DirectorResult<bool> {
        if self.step == 0 {
            tracing::trace!(target: "director.timeline", "back at start");
            return Ok(false);
        }
        let index = self.step - 1;
        let span = tracing::debug_span!("director.back", step = index, pace = Empty).entered();
        let pace = self.pace(instant);
        span.record("pace", tracing::field::debug(pace));

        let cap = pace.duration_cap(&self.config);
        let rollback_cap = self.config.rollback_duration_cap();
        let empty = Step::default();
        let inverse = self.rollback.get(index).unwrap_or_else(|| {
            tracing::warn!(target: "director.timeline", step = index, "missing rollback entry");
            &empty
        });
        if let Err((op, source)) = apply_step(&mut self.stage, inverse, None, cap, rollback_cap) {
            tracing::warn!(
                target: "director.timeline",
                step = index,
                op,
                error = %source,
                "back failed"
            );
            return Err(DirectorError::Apply {
                step: index,
                op,
                source,
            });
        }

        self.rollback.take(index);
        self.step = index;
        tracing::debug!(target: "director.timeline", step = self.step, "stepped back");
        self.events.publish(NavigationEvent {
            step: self.step,
            direction: Direction::Backward,
        });
        Ok(true)
    }

    /// Timestamp this command and hurry the stage.
    ///
    /// Every command hurries, so the inverses recorded next snapshot the
    /// values earlier transitions were heading to. Only a skip clamps the
    /// upcoming transitions.
    fn pace(&mut self, instant: bool) -> Pace {
        let pace = self.pacer.resolve(self.clock.now(), instant);
        let selector = self.config.hurry_selector();
        if pace == Pace::Skipping {
            tracing::debug!(target: "director.timeline", %selector, "skipping, hurrying stage");
        } else {
            tracing::trace!(target: "director.timeline", %selector, "hurrying stage");
        }
        self.stage.hurry(&selector);
        pace
    }
}

/// Wrap `target` into `0..=len` cyclically.
#[must_use]
pub fn wrap_index(target: i64, len: usize) -> usize {
    let span = len as i64 + 1;
    target.rem_euclid(span) as usize
}

/// Apply `step` op by op. With `rollback`, each op's inverse is computed
/// against the pre-op scene and prepended before the op runs.
///
/// On failure returns the failing op's position and the stage error.
fn apply_step<S: Stage>(
    stage: &mut S,
    step: &Step,
    mut rollback: Option<&mut Step>,
    cap: Option<Duration>,
    rollback_cap: Duration,
) -> Result<(), (usize, StageError)> {
    for (i, op) in step.iter().enumerate() {
        if let Some(acc) = rollback.as_deref_mut() {
            acc.prepend(op.invert_with_cap(&*stage, rollback_cap));
        }
        op.clamped(cap).apply(stage).map_err(|e| (i, e))?;
    }
    Ok(())
}

/// Best-effort replay of a partially recorded rollback.
fn revert_partial<S: Stage>(stage: &mut S, inverse: &Step) {
    for op in inverse {
        if let Err(e) = op.apply(stage) {
            tracing::warn!(target: "director.timeline", %op, error = %e, "revert op failed");
        }
    }
}
