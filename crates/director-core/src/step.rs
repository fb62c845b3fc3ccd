#![forbid(unsafe_code)]

//! Steps, the script, and the rollback log.
//!
//! ```text
//! Script:       [ step 0 ][ step 1 ][ step 2 ]
//! index:       0         1         2         3
//!                          ▲
//!                    current = 1
//! RollbackLog:  { 0: inverse(step 0) }
//! ```
//!
//! The rollback log holds an entry for every step index below the current
//! position, and none at or above it.

use std::collections::BTreeMap;

use crate::op::Op;

/// An ordered batch of ops applied and undone as a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    ops: Vec<Op>,
}

impl Step {
    #[must_use]
    pub fn new(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Ops in application order.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append an op at the end.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Splice `inverse` in front of everything already recorded.
    ///
    /// Used while accumulating a rollback: the inverse of the op applied
    /// last must run first, while the ops of one inverse keep their order.
    pub fn prepend(&mut self, inverse: Vec<Op>) {
        self.ops.splice(0..0, inverse);
    }
}

impl From<Op> for Step {
    fn from(op: Op) -> Self {
        Self { ops: vec![op] }
    }
}

impl From<Vec<Op>> for Step {
    fn from(ops: Vec<Op>) -> Self {
        Self { ops }
    }
}

impl FromIterator<Op> for Step {
    fn from_iter<I: IntoIterator<Item = Op>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Step {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// The ordered sequence of steps forming a presentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Splice a step in at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, step: Step) {
        let index = index.min(self.steps.len());
        self.steps.insert(index, step);
    }

    /// Remove and return the step at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Step> {
        (index < self.steps.len()).then(|| self.steps.remove(index))
    }
}

impl From<Vec<Step>> for Script {
    fn from(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

impl FromIterator<Step> for Script {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Inverse steps keyed by the step index they undo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollbackLog {
    entries: BTreeMap<usize, Step>,
}

impl RollbackLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the inverse for `index`, replacing any previous entry.
    pub fn record(&mut self, index: usize, inverse: Step) {
        self.entries.insert(index, inverse);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.entries.get(&index)
    }

    /// Remove and return the entry for `index`.
    pub fn take(&mut self, index: usize) -> Option<Step> {
        self.entries.remove(&index)
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices with a recorded entry, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }
}
