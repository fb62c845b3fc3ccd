#![forbid(unsafe_code)]

//! Stage operations reachable directly on the director.
//!
//! A [`Director`] forwards the stage's query and mutation surface so callers
//! holding only the director can still poke the scene. Mutations return the
//! director for chaining.
//!
//! These calls go straight to the stage: they are not recorded in the
//! rollback log and stepping back will not undo them. Use
//! [`Director::insert`] for live edits that must be undoable.

use director_core::{AnimationParams, Attrs, PrimitiveRef, Selector, SequenceId, Stage};

use crate::director::Director;
use crate::error::DirectorResult;
use crate::pacing::Clock;

/// Stage operations the director forwards unchanged.
pub const DELEGATED_OPERATIONS: &[&str] = &[
    "select",
    "get",
    "spawn",
    "remove",
    "set",
    "animate",
    "hurry",
    "next_sequence",
];

impl<S: Stage, C: Clock> Director<S, C> {
    /// Primitives matching `selector`, in stage order.
    #[must_use]
    pub fn select(&self, selector: impl Into<Selector>) -> Vec<PrimitiveRef> {
        self.stage().select(&selector.into())
    }

    /// Current attributes of `primitive`.
    #[must_use]
    pub fn get(&self, primitive: &PrimitiveRef) -> Attrs {
        self.stage().get(primitive)
    }

    /// Spawn a primitive outside the timeline.
    pub fn spawn(
        &mut self,
        kind: &str,
        attrs: &Attrs,
        animation: Option<&AnimationParams>,
    ) -> DirectorResult<PrimitiveRef> {
        Ok(self.stage_mut().spawn(kind, attrs, None, animation)?)
    }

    pub fn remove(
        &mut self,
        primitive: &PrimitiveRef,
        animation: Option<&AnimationParams>,
    ) -> DirectorResult<&mut Self> {
        self.stage_mut().remove(primitive, animation)?;
        Ok(self)
    }

    pub fn set(&mut self, primitive: &PrimitiveRef, attrs: &Attrs) -> DirectorResult<&mut Self> {
        self.stage_mut().set(primitive, attrs)?;
        Ok(self)
    }

    pub fn animate(
        &mut self,
        primitive: &PrimitiveRef,
        attrs: &Attrs,
        animation: &AnimationParams,
    ) -> DirectorResult<&mut Self> {
        self.stage_mut().animate(primitive, attrs, animation)?;
        Ok(self)
    }

    /// Force transitions on matching primitives to completion.
    pub fn hurry(&mut self, selector: impl Into<Selector>) -> &mut Self {
        self.stage_mut().hurry(&selector.into());
        self
    }

    /// Sequence identifier the stage will assign to its next spawn.
    #[must_use]
    pub fn next_sequence(&self) -> SequenceId {
        self.stage().next_sequence()
    }
}
