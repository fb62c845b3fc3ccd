#![forbid(unsafe_code)]

//! The op model: one scripted action and its generated inverse.
//!
//! An [`Op`] is a closed enum with one variant per verb. Each variant carries
//! its own typed payload and knows how to apply itself to a [`Stage`] and how
//! to compute the ops that undo it.
//!
//! # Invariants
//!
//! 1. [`Op::invert`] reads the scene *before* the op is applied. The caller
//!    must invert first and apply second.
//! 2. Applying `op` and then, immediately, every op of `op.invert(stage)` in
//!    order leaves the scene observably equal to the pre-state.
//! 3. Inverses of `set`/`animate` address each target by its own identity
//!    ([`PrimitiveRef::identity`]), never by the original selector.
//! 4. Clamping ([`Op::clamped`]) produces a copy; scripted ops are never
//!    mutated.
//!
//! # Failure Modes
//!
//! - **Zero matches**: a selector that resolves to nothing yields no inverse
//!   and no stage calls.
//! - **Short per-target payload**: targets past the end of a
//!   [`Payload::PerTarget`] list are left untouched (and get no inverse).
//! - **Stage refusal**: [`Op::apply`] stops at the first [`StageError`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::animation::{AnimationParams, ROLLBACK_DURATION_CAP};
use crate::attrs::{Attrs, Value};
use crate::error::ScriptError;
use crate::selector::{PrimitiveRef, Selector, SequenceId};
use crate::stage::{Stage, StageResult};

/// Attribute key that may carry an explicit sequence id in textual `add` payloads.
pub const SEQUENCE_KEY: &str = "sequence";

// ---------------------------------------------------------------------------
// Verb
// ---------------------------------------------------------------------------

/// The four supported verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Add,
    Remove,
    Set,
    Animate,
}

impl Verb {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Set => "set",
            Self::Animate => "animate",
        }
    }
}

impl FromStr for Verb {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "set" => Ok(Self::Set),
            "animate" => Ok(Self::Animate),
            other => Err(ScriptError::UnknownVerb(other.to_string())),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Attributes for `set`/`animate`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The same map is written to every matched target.
    Uniform(Attrs),
    /// One map per matched target, consumed positionally.
    PerTarget(Vec<Attrs>),
}

impl Payload {
    /// The map for the `index`-th matched target.
    #[must_use]
    pub fn for_target(&self, index: usize) -> Option<&Attrs> {
        match self {
            Self::Uniform(attrs) => Some(attrs),
            Self::PerTarget(list) => list.get(index),
        }
    }
}

impl From<Attrs> for Payload {
    fn from(attrs: Attrs) -> Self {
        Self::Uniform(attrs)
    }
}

impl From<Vec<Attrs>> for Payload {
    fn from(list: Vec<Attrs>) -> Self {
        Self::PerTarget(list)
    }
}

// ---------------------------------------------------------------------------
// Op
// ---------------------------------------------------------------------------

/// One scripted action.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Spawn a primitive of type `kind`.
    Add {
        kind: String,
        attrs: Attrs,
        /// Explicit identity; `None` takes the stage's next sequence.
        sequence: Option<SequenceId>,
        animation: Option<AnimationParams>,
    },
    /// Remove every match.
    Remove {
        selector: Selector,
        animation: Option<AnimationParams>,
    },
    /// Write attributes synchronously to every match.
    Set { selector: Selector, payload: Payload },
    /// Start an attribute transition on every match.
    Animate {
        selector: Selector,
        payload: Payload,
        animation: AnimationParams,
    },
}

impl Op {
    /// `add` op for a primitive of type `kind`.
    #[must_use]
    pub fn add(kind: impl Into<String>, attrs: Attrs) -> Self {
        Self::Add {
            kind: kind.into(),
            attrs,
            sequence: None,
            animation: None,
        }
    }

    /// `remove` op.
    #[must_use]
    pub fn remove(selector: impl Into<Selector>) -> Self {
        Self::Remove {
            selector: selector.into(),
            animation: None,
        }
    }

    /// `set` op.
    #[must_use]
    pub fn set(selector: impl Into<Selector>, payload: impl Into<Payload>) -> Self {
        Self::Set {
            selector: selector.into(),
            payload: payload.into(),
        }
    }

    /// `animate` op.
    #[must_use]
    pub fn animate(
        selector: impl Into<Selector>,
        payload: impl Into<Payload>,
        animation: AnimationParams,
    ) -> Self {
        Self::Animate {
            selector: selector.into(),
            payload: payload.into(),
            animation,
        }
    }

    /// Give an `add` an explicit sequence id. No effect on other verbs.
    #[must_use]
    pub fn with_sequence(mut self, id: SequenceId) -> Self {
        if let Self::Add { sequence, .. } = &mut self {
            *sequence = Some(id);
        }
        self
    }

    /// Attach animation timing. `set` is synchronous and ignores it.
    #[must_use]
    pub fn with_animation(mut self, params: AnimationParams) -> Self {
        match &mut self {
            Self::Add { animation, .. } | Self::Remove { animation, .. } => {
                *animation = Some(params);
            }
            Self::Animate { animation, .. } => *animation = params,
            Self::Set { .. } => {}
        }
        self
    }

    /// Build an op from its textual parts.
    ///
    /// For `add`, `selector` names the primitive type and `payload` must be a
    /// single map; a numeric `sequence` entry in it becomes the explicit id.
    /// `animate` without timing gets a zero-length transition.
    pub fn from_parts(
        verb: &str,
        selector: &str,
        payload: Option<Payload>,
        animation: Option<AnimationParams>,
    ) -> Result<Self, ScriptError> {
        let verb: Verb = verb.parse()?;
        let selector = Selector::parse(selector);
        let payload = payload.unwrap_or_else(|| Payload::Uniform(Attrs::new()));

        match verb {
            Verb::Add => {
                let Selector::Type(kind) = selector else {
                    return Err(ScriptError::InvalidSelector {
                        verb: verb.as_str(),
                        selector,
                    });
                };
                let Payload::Uniform(mut attrs) = payload else {
                    return Err(ScriptError::InvalidPayload {
                        verb: verb.as_str(),
                        reason: "expected a single attribute map".into(),
                    });
                };
                let sequence = match attrs.remove(SEQUENCE_KEY) {
                    None => None,
                    Some(Value::Number(n)) if n >= 0.0 && n.fract() == 0.0 => {
                        Some(SequenceId(n as u64))
                    }
                    Some(other) => {
                        return Err(ScriptError::InvalidPayload {
                            verb: verb.as_str(),
                            reason: format!("sequence must be a non-negative integer, got {other}"),
                        });
                    }
                };
                Ok(Self::Add {
                    kind,
                    attrs,
                    sequence,
                    animation,
                })
            }
            Verb::Remove => Ok(Self::Remove {
                selector,
                animation,
            }),
            Verb::Set => Ok(Self::Set { selector, payload }),
            Verb::Animate => Ok(Self::Animate {
                selector,
                payload,
                animation: animation.unwrap_or_default(),
            }),
        }
    }

    #[must_use]
    pub const fn verb(&self) -> Verb {
        match self {
            Self::Add { .. } => Verb::Add,
            Self::Remove { .. } => Verb::Remove,
            Self::Set { .. } => Verb::Set,
            Self::Animate { .. } => Verb::Animate,
        }
    }

    /// The selector this op addresses. For `add` this is the type.
    #[must_use]
    pub fn selector(&self) -> Selector {
        match self {
            Self::Add { kind, .. } => Selector::Type(kind.clone()),
            Self::Remove { selector, .. }
            | Self::Set { selector, .. }
            | Self::Animate { selector, .. } => selector.clone(),
        }
    }

    /// Animation timing, if the op carries any.
    #[must_use]
    pub fn animation(&self) -> Option<&AnimationParams> {
        match self {
            Self::Add { animation, .. } | Self::Remove { animation, .. } => animation.as_ref(),
            Self::Animate { animation, .. } => Some(animation),
            Self::Set { .. } => None,
        }
    }

    // -----------------------------------------------------------------------
    // Inversion
    // -----------------------------------------------------------------------

    /// Ops that undo this one, computed against the current (pre-op) scene.
    ///
    /// Inverse transitions are capped at [`ROLLBACK_DURATION_CAP`].
    #[must_use]
    pub fn invert<S: Stage + ?Sized>(&self, stage: &S) -> Vec<Op> {
        self.invert_with_cap(stage, ROLLBACK_DURATION_CAP)
    }

    /// [`invert`](Self::invert) with an explicit cap on inverse transitions.
    #[must_use]
    pub fn invert_with_cap<S: Stage + ?Sized>(&self, stage: &S, cap: Duration) -> Vec<Op> {
        let inverse = self.inverse_ops(stage, cap);
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "director.op", op = %self, inverse = inverse.len(), "op inverted");
        inverse
    }

    fn inverse_ops<S: Stage + ?Sized>(&self, stage: &S, cap: Duration) -> Vec<Op> {
        match self {
            Self::Add { sequence, .. } => {
                let id = sequence.unwrap_or_else(|| stage.next_sequence());
                vec![Op::remove(Selector::Sequence(id))]
            }
            Self::Remove { selector, .. } => stage
                .select(selector)
                .into_iter()
                .map(|target| Op::Add {
                    attrs: stage.get(&target),
                    kind: target.kind,
                    sequence: Some(target.sequence),
                    animation: None,
                })
                .collect(),
            Self::Set { selector, payload } => {
                restore_targets(stage, selector, payload, |target, snapshot| Op::Set {
                    selector: target.identity(),
                    payload: Payload::Uniform(snapshot),
                })
            }
            Self::Animate {
                selector,
                payload,
                animation,
            } => {
                let timing = AnimationParams::for_rollback(Some(animation), cap);
                restore_targets(stage, selector, payload, |target, snapshot| Op::Animate {
                    selector: target.identity(),
                    payload: Payload::Uniform(snapshot),
                    animation: timing,
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Application
    // -----------------------------------------------------------------------

    /// Copy with instant timing: zero delay and durations capped at `cap`.
    ///
    /// With `cap == None` the op is borrowed unchanged.
    #[must_use]
    pub fn clamped(&self, cap: Option<Duration>) -> Cow<'_, Op> {
        let Some(cap) = cap else {
            return Cow::Borrowed(self);
        };
        let mut op = self.clone();
        match &mut op {
            Self::Add { animation, .. } | Self::Remove { animation, .. } => {
                *animation = animation.map(|a| a.clamped(cap));
            }
            Self::Animate { animation, .. } => *animation = animation.clamped(cap),
            Self::Set { .. } => return Cow::Borrowed(self),
        }
        Cow::Owned(op)
    }

    /// Dispatch this op to the stage.
    ///
    /// Returns the number of primitives touched.
    pub fn apply<S: Stage + ?Sized>(&self, stage: &mut S) -> StageResult<usize> {
        let touched = self.dispatch(stage)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "director.op", op = %self, touched, "op applied");
        Ok(touched)
    }

    fn dispatch<S: Stage + ?Sized>(&self, stage: &mut S) -> StageResult<usize> {
        match self {
            Self::Add {
                kind,
                attrs,
                sequence,
                animation,
            } => {
                stage.spawn(kind, attrs, *sequence, animation.as_ref())?;
                Ok(1)
            }
            Self::Remove {
                selector,
                animation,
            } => {
                let targets = stage.select(selector);
                for target in &targets {
                    stage.remove(target, animation.as_ref())?;
                }
                Ok(targets.len())
            }
            Self::Set { selector, payload } => {
                let mut touched = 0;
                for (i, target) in stage.select(selector).iter().enumerate() {
                    if let Some(attrs) = payload.for_target(i) {
                        stage.set(target, attrs)?;
                        touched += 1;
                    }
                }
                Ok(touched)
            }
            Self::Animate {
                selector,
                payload,
                animation,
            } => {
                let mut touched = 0;
                for (i, target) in stage.select(selector).iter().enumerate() {
                    if let Some(attrs) = payload.for_target(i) {
                        stage.animate(target, attrs, animation)?;
                        touched += 1;
                    }
                }
                Ok(touched)
            }
        }
    }
}

/// One inverse per matched target, carrying the target's pre-op snapshot
/// extended to cover every key the forward payload writes.
fn restore_targets<S, F>(stage: &S, selector: &Selector, payload: &Payload, build: F) -> Vec<Op>
where
    S: Stage + ?Sized,
    F: Fn(&PrimitiveRef, Attrs) -> Op,
{
    stage
        .select(selector)
        .iter()
        .enumerate()
        .filter_map(|(i, target)| {
            let touched = payload.for_target(i)?;
            Some(build(target, stage.get(target).covering(touched)))
        })
        .collect()
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { kind, sequence, .. } => match sequence {
                Some(id) => write!(f, "add {kind} @{id}"),
                None => write!(f, "add {kind}"),
            },
            other => write!(f, "{} {}", other.verb(), other.selector()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_parse_rejects_unknown() {
        assert_eq!("animate".parse::<Verb>(), Ok(Verb::Animate));
        assert_eq!(
            "explode".parse::<Verb>(),
            Err(ScriptError::UnknownVerb("explode".into()))
        );
    }

    #[test]
    fn from_parts_add_extracts_sequence() {
        let op = Op::from_parts(
            "add",
            "circle",
            Some(Attrs::new().with("radius", 5).with("sequence", 12).into()),
            None,
        )
        .unwrap();
        assert_eq!(
            op,
            Op::add("circle", Attrs::new().with("radius", 5)).with_sequence(SequenceId(12))
        );
    }

    #[test]
    fn from_parts_add_rejects_non_type_selector() {
        let err = Op::from_parts("add", "#axis", None, None).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidSelector { verb: "add", .. }));
    }

    #[test]
    fn from_parts_add_rejects_per_target_payload() {
        let err = Op::from_parts("add", "circle", Some(vec![Attrs::new()].into()), None)
            .unwrap_err();
        assert!(matches!(err, ScriptError::InvalidPayload { verb: "add", .. }));
    }

    #[test]
    fn from_parts_rejects_bad_sequence() {
        let err = Op::from_parts(
            "add",
            "circle",
            Some(Attrs::new().with("sequence", -1).into()),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::InvalidPayload { .. }));
    }

    #[test]
    fn from_parts_unknown_verb_is_error() {
        assert_eq!(
            Op::from_parts("spin", "*", None, None),
            Err(ScriptError::UnknownVerb("spin".into()))
        );
    }

    #[test]
    fn clamped_copies_and_leaves_source() {
        let op = Op::animate(
            "circle",
            Attrs::new().with("x", 1),
            AnimationParams::millis(1000).with_delay(Duration::from_millis(40)),
        );
        let fast = op.clamped(Some(Duration::ZERO));
        assert_eq!(fast.animation().unwrap().duration, Duration::ZERO);
        assert_eq!(fast.animation().unwrap().delay, Duration::ZERO);
        assert_eq!(op.animation().unwrap().duration, Duration::from_millis(1000));
        assert!(matches!(op.clamped(None), Cow::Borrowed(_)));
    }

    #[test]
    fn clamped_add_without_animation_stays_unanimated() {
        let op = Op::add("circle", Attrs::new());
        assert_eq!(op.clamped(Some(Duration::ZERO)).animation(), None);
    }

    #[test]
    fn with_animation_ignored_by_set() {
        let op = Op::set("*", Attrs::new()).with_animation(AnimationParams::millis(5));
        assert_eq!(op.animation(), None);
    }

    #[test]
    fn payload_positional_lookup() {
        let p = Payload::PerTarget(vec![Attrs::new().with("x", 1), Attrs::new().with("x", 2)]);
        assert_eq!(p.for_target(1).unwrap().get("x"), Some(&Value::Number(2.0)));
        assert!(p.for_target(2).is_none());
        let u = Payload::Uniform(Attrs::new().with("x", 3));
        assert!(u.for_target(99).is_some());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Op::remove(SequenceId(3)).to_string(), "remove 3");
        assert_eq!(
            Op::add("circle", Attrs::new())
                .with_sequence(SequenceId(9))
                .to_string(),
            "add circle @9"
        );
        assert_eq!(Op::set("#axis", Attrs::new()).to_string(), "set #axis");
    }
}
