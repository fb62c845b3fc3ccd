#![forbid(unsafe_code)]

//! Deterministic in-memory [`Stage`].
//!
//! [`MemoryStage`] keeps primitives in insertion order, assigns sequence
//! identifiers from its own counter, and models transitions as pending
//! writes that land when they complete. There is no interpolation: a
//! transition's target attributes snap in when it finishes, either through
//! [`advance`](MemoryStage::advance), [`hurry`](Stage::hurry), or
//! [`settle`](MemoryStage::settle).
//!
//! Every mutating call is appended to a [`StageCall`] journal so tests can
//! assert exactly what the timeline asked for.
//!
//! # Invariants
//!
//! 1. Sequence identifiers of live primitives are unique.
//! 2. A new transition or synchronous write on a primitive first completes
//!    any transition already in flight on it, so writes land in call order.
//! 3. Removing a primitive drops its pending transitions.
//! 4. A singleton name never changes after spawn; `set`/`animate` payloads
//!    that would rename or unname a primitive are rejected.

use std::time::Duration;

use ahash::AHashMap;
use director_core::{
    AnimationParams, Attrs, PrimitiveRef, Selector, SequenceId, Stage, StageError, StageResult,
    Value,
};

/// Attribute that registers a primitive under a singleton name.
pub const SINGLETON_KEY: &str = "id";

/// One mutating call received by the stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageCall {
    Spawn {
        kind: String,
        sequence: SequenceId,
        animation: Option<AnimationParams>,
    },
    Remove {
        sequence: SequenceId,
        animation: Option<AnimationParams>,
    },
    Set {
        sequence: SequenceId,
        attrs: Attrs,
    },
    Animate {
        sequence: SequenceId,
        attrs: Attrs,
        animation: AnimationParams,
    },
    Hurry(Selector),
}

/// A live primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub sequence: SequenceId,
    pub kind: String,
    pub attrs: Attrs,
}

impl Primitive {
    fn singleton(&self) -> Option<&str> {
        self.attrs.get(SINGLETON_KEY).and_then(Value::as_str)
    }

    fn to_ref(&self) -> PrimitiveRef {
        let r = PrimitiveRef::new(self.sequence, self.kind.clone());
        match self.singleton() {
            Some(name) => r.with_singleton(name),
            None => r,
        }
    }
}

/// A pending attribute transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub target: SequenceId,
    pub to: Attrs,
    pub animation: AnimationParams,
    pub elapsed: Duration,
}

/// In-memory stage.
#[derive(Debug, Clone)]
pub struct MemoryStage {
    primitives: Vec<Primitive>,
    singletons: AHashMap<String, SequenceId>,
    next: SequenceId,
    transitions: Vec<Transition>,
    journal: Vec<StageCall>,
    rejected_kinds: Vec<String>,
}

impl Default for MemoryStage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStage {
    /// Empty stage; the first spawned primitive gets sequence 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            singletons: AHashMap::new(),
            next: SequenceId(1),
            transitions: Vec::new(),
            journal: Vec::new(),
            rejected_kinds: Vec::new(),
        }
    }

    /// Refuse to spawn primitives of `kind` (builder pattern).
    ///
    /// Lets tests drive a step into a mid-apply failure.
    #[must_use]
    pub fn rejecting(mut self, kind: impl Into<String>) -> Self {
        self.rejected_kinds.push(kind.into());
        self
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Live primitives in insertion order.
    #[must_use]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    #[must_use]
    pub fn primitive(&self, sequence: SequenceId) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.sequence == sequence)
    }

    /// Current attributes of a primitive.
    #[must_use]
    pub fn attrs(&self, sequence: SequenceId) -> Option<&Attrs> {
        self.primitive(sequence).map(|p| &p.attrs)
    }

    /// Observable scene state, ordered by sequence id.
    ///
    /// Two stages with equal scenes hold the same primitives with the same
    /// attribute values, regardless of spawn order.
    #[must_use]
    pub fn scene(&self) -> Vec<Primitive> {
        let mut scene = self.primitives.clone();
        scene.sort_by_key(|p| p.sequence);
        scene
    }

    #[must_use]
    pub fn in_flight(&self) -> &[Transition] {
        &self.transitions
    }

    #[must_use]
    pub fn journal(&self) -> &[StageCall] {
        &self.journal
    }

    /// Drain the journal.
    pub fn take_journal(&mut self) -> Vec<StageCall> {
        std::mem::take(&mut self.journal)
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Progress every transition by `dt`, completing those that end.
    pub fn advance(&mut self, dt: Duration) {
        let mut done = Vec::new();
        let mut pending = Vec::new();
        for mut t in std::mem::take(&mut self.transitions) {
            t.elapsed += dt;
            if t.elapsed >= t.animation.end() {
                done.push(t);
            } else {
                pending.push(t);
            }
        }
        self.transitions = pending;
        for t in done {
            self.write(t.target, &t.to);
        }
    }

    /// Complete every transition now.
    pub fn settle(&mut self) {
        for t in std::mem::take(&mut self.transitions) {
            self.write(t.target, &t.to);
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn index_of(&self, sequence: SequenceId) -> Option<usize> {
        self.primitives.iter().position(|p| p.sequence == sequence)
    }

    fn finish_transitions_on(&mut self, sequence: SequenceId) {
        let (finished, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.transitions)
            .into_iter()
            .partition(|t| t.target == sequence);
        self.transitions = pending;
        for t in finished {
            self.write(t.target, &t.to);
        }
    }

    /// The primitive must exist and `attrs` must leave its singleton name alone.
    fn check_write(&self, sequence: SequenceId, attrs: &Attrs) -> StageResult {
        let primitive = self
            .primitive(sequence)
            .ok_or(StageError::UnknownPrimitive(sequence))?;
        match attrs.get(SINGLETON_KEY) {
            Some(value) if value.as_str() != primitive.singleton() => {
                Err(StageError::Rejected(format!(
                    "'{SINGLETON_KEY}' of {sequence} is fixed at spawn"
                )))
            }
            _ => Ok(()),
        }
    }

    fn write(&mut self, sequence: SequenceId, attrs: &Attrs) {
        if let Some(index) = self.index_of(sequence) {
            self.primitives[index].attrs.merge(attrs);
        }
    }

    fn matches(&self, primitive: &Primitive, selector: &Selector) -> bool {
        match selector {
            Selector::Sequence(id) => primitive.sequence == *id,
            Selector::Singleton(name) => primitive.singleton() == Some(name.as_str()),
            Selector::Type(kind) => primitive.kind == *kind,
            Selector::All => true,
            Selector::Query(query) => query_matches(primitive, query),
        }
    }
}

/// `kind[key=value]` attribute query. Numbers compare numerically.
fn query_matches(primitive: &Primitive, query: &str) -> bool {
    let Some((kind, rest)) = query.split_once('[') else {
        return false;
    };
    let Some(filter) = rest.strip_suffix(']') else {
        return false;
    };
    let Some((key, expected)) = filter.split_once('=') else {
        return false;
    };
    if !(kind.is_empty() || kind == "*" || kind == primitive.kind) {
        return false;
    }
    match (primitive.attrs.get(key.trim()), expected.trim()) {
        (Some(Value::Number(n)), expected) => expected.parse::<f64>().is_ok_and(|e| e == *n),
        (Some(Value::Text(s)), expected) => s == expected,
        (Some(Value::Bool(b)), expected) => expected.parse::<bool>().is_ok_and(|e| e == *b),
        _ => false,
    }
}

impl Stage for MemoryStage {
    fn select(&self, selector: &Selector) -> Vec<PrimitiveRef> {
        if let Selector::Singleton(name) = selector {
            return self
                .singletons
                .get(name)
                .and_then(|id| self.primitive(*id))
                .map(Primitive::to_ref)
                .into_iter()
                .collect();
        }
        self.primitives
            .iter()
            .filter(|p| self.matches(p, selector))
            .map(Primitive::to_ref)
            .collect()
    }

    fn get(&self, primitive: &PrimitiveRef) -> Attrs {
        self.attrs(primitive.sequence).cloned().unwrap_or_default()
    }

    fn spawn(
        &mut self,
        kind: &str,
        attrs: &Attrs,
        sequence: Option<SequenceId>,
        animation: Option<&AnimationParams>,
    ) -> StageResult<PrimitiveRef> {
        if self.rejected_kinds.iter().any(|k| k == kind) {
            return Err(StageError::UnknownType(kind.to_string()));
        }
        let sequence = match sequence {
            Some(id) if self.index_of(id).is_some() => {
                return Err(StageError::DuplicateSequence(id));
            }
            Some(id) => id,
            None => self.next,
        };
        if let Some(name) = attrs.get(SINGLETON_KEY).and_then(Value::as_str) {
            if self.singletons.contains_key(name) {
                return Err(StageError::Rejected(format!("singleton '{name}' already exists")));
            }
            self.singletons.insert(name.to_string(), sequence);
        }
        if sequence >= self.next {
            self.next = sequence.next();
        }

        let mut clean = Attrs::new();
        clean.merge(attrs);
        let primitive = Primitive {
            sequence,
            kind: kind.to_string(),
            attrs: clean,
        };
        let reference = primitive.to_ref();
        self.primitives.push(primitive);
        self.journal.push(StageCall::Spawn {
            kind: kind.to_string(),
            sequence,
            animation: animation.copied(),
        });
        tracing::trace!(target: "director.stage", %sequence, kind, "spawned");
        Ok(reference)
    }

    fn remove(
        &mut self,
        primitive: &PrimitiveRef,
        animation: Option<&AnimationParams>,
    ) -> StageResult {
        let index = self
            .index_of(primitive.sequence)
            .ok_or(StageError::UnknownPrimitive(primitive.sequence))?;
        let removed = self.primitives.remove(index);
        if let Some(name) = removed.singleton() {
            self.singletons.remove(name);
        }
        self.transitions.retain(|t| t.target != primitive.sequence);
        self.journal.push(StageCall::Remove {
            sequence: primitive.sequence,
            animation: animation.copied(),
        });
        tracing::trace!(target: "director.stage", sequence = %primitive.sequence, "removed");
        Ok(())
    }

    fn set(&mut self, primitive: &PrimitiveRef, attrs: &Attrs) -> StageResult {
        self.check_write(primitive.sequence, attrs)?;
        self.finish_transitions_on(primitive.sequence);
        self.write(primitive.sequence, attrs);
        self.journal.push(StageCall::Set {
            sequence: primitive.sequence,
            attrs: attrs.clone(),
        });
        Ok(())
    }

    fn animate(
        &mut self,
        primitive: &PrimitiveRef,
        attrs: &Attrs,
        animation: &AnimationParams,
    ) -> StageResult {
        self.check_write(primitive.sequence, attrs)?;
        self.finish_transitions_on(primitive.sequence);
        self.journal.push(StageCall::Animate {
            sequence: primitive.sequence,
            attrs: attrs.clone(),
            animation: *animation,
        });
        if animation.end().is_zero() {
            self.write(primitive.sequence, attrs);
        } else {
            self.transitions.push(Transition {
                target: primitive.sequence,
                to: attrs.clone(),
                animation: *animation,
                elapsed: Duration::ZERO,
            });
        }
        Ok(())
    }

    fn hurry(&mut self, selector: &Selector) {
        let targets: Vec<SequenceId> = self.select(selector).iter().map(|p| p.sequence).collect();
        let (finished, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.transitions)
            .into_iter()
            .partition(|t| targets.contains(&t.target));
        self.transitions = pending;
        let count = finished.len();
        for t in finished {
            self.write(t.target, &t.to);
        }
        self.journal.push(StageCall::Hurry(selector.clone()));
        tracing::trace!(target: "director.stage", %selector, count, "hurried transitions");
    }

    fn next_sequence(&self) -> SequenceId {
        self.next
    }
}
