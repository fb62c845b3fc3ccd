#![forbid(unsafe_code)]

//! The stage collaborator contract.
//!
//! The stage owns the visual primitives. The timeline core only ever talks to
//! it through this trait: resolve selectors, snapshot attributes, spawn,
//! remove, write, animate, and force in-flight transitions to finish.
//!
//! # Sequence counter
//!
//! Sequence identifiers are allocated by the stage, in spawn order.
//! [`Stage::next_sequence`] exposes the counter so inversion of an `add` can
//! name the primitive before it exists, without any process-wide state.
//!
//! # Singleton names
//!
//! A singleton name is fixed when the primitive is spawned. Inverses of
//! `set`/`animate` address a named primitive by that name, so a stage must
//! refuse (`StageError::Rejected`) a write that would rename or unname it.
//!
//! # Snapshots and transitions
//!
//! [`Stage::get`] reports the attributes as they are now. The timeline hurries
//! the stage before every command so no transition is in flight while a
//! snapshot is taken.

use crate::animation::AnimationParams;
use crate::attrs::Attrs;
use crate::error::StageError;
use crate::selector::{PrimitiveRef, Selector, SequenceId};

/// Result of a stage mutation.
pub type StageResult<T = ()> = Result<T, StageError>;

/// Scene owner driven by the timeline.
pub trait Stage {
    /// Resolve a selector against the live scene.
    ///
    /// Deterministic; insertion order unless the selector says otherwise.
    fn select(&self, selector: &Selector) -> Vec<PrimitiveRef>;

    /// Snapshot of a primitive's attributes, sufficient to rebuild an
    /// equivalent primitive through [`spawn`](Stage::spawn).
    fn get(&self, primitive: &PrimitiveRef) -> Attrs;

    /// Create a primitive.
    ///
    /// With `sequence == None` the primitive receives
    /// [`next_sequence`](Stage::next_sequence) and the counter advances.
    /// An explicit sequence is reused as-is (respawn during rollback).
    fn spawn(
        &mut self,
        kind: &str,
        attrs: &Attrs,
        sequence: Option<SequenceId>,
        animation: Option<&AnimationParams>,
    ) -> StageResult<PrimitiveRef>;

    /// Remove a primitive, optionally animating it out.
    fn remove(
        &mut self,
        primitive: &PrimitiveRef,
        animation: Option<&AnimationParams>,
    ) -> StageResult;

    /// Synchronous attribute write.
    fn set(&mut self, primitive: &PrimitiveRef, attrs: &Attrs) -> StageResult;

    /// Begin an attribute transition.
    fn animate(
        &mut self,
        primitive: &PrimitiveRef,
        attrs: &Attrs,
        animation: &AnimationParams,
    ) -> StageResult;

    /// Force every in-flight transition matching `selector` to its final state.
    fn hurry(&mut self, selector: &Selector);

    /// The identifier the next unsequenced spawn will receive.
    fn next_sequence(&self) -> SequenceId;
}
