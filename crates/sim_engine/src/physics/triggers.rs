//! Trigger overlap persistence across physics steps
//!
//! Non-blocking pairs need "still colliding" answers without re-running a
//! narrow-phase test whose algorithm only detects *entering* overlap. The
//! tracker remembers which trigger pairs were overlapping last step; the
//! responder consults it before testing and records the fresh result
//! after.

use crate::physics::world::BodyKey;
use std::collections::HashSet;

/// Per-pair overlap memory for trigger collidables.
///
/// Lookup is order-independent: `(a, b)` and `(b, a)` address the same
/// entry. Absent entries read as "was not colliding". The tracker does no
/// liveness checking of its own; [`forget_body`](Self::forget_body) must
/// be called when a body is removed so no dangling identity keys remain.
#[derive(Debug, Default)]
pub struct TriggerTracker {
    overlapping: HashSet<(BodyKey, BodyKey)>,
}

impl TriggerTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pair was overlapping at the end of the previous step
    pub fn was_colliding(&self, a: BodyKey, b: BodyKey) -> bool {
        self.overlapping.contains(&ordered(a, b))
    }

    /// Record the pair's overlap state for this step.
    ///
    /// Inserts the entry on `true`; removes it on `false`, so entries
    /// exist only while a pair is overlapping.
    pub fn record(&mut self, a: BodyKey, b: BodyKey, colliding_now: bool) {
        let key = ordered(a, b);
        if colliding_now {
            self.overlapping.insert(key);
        } else {
            self.overlapping.remove(&key);
        }
    }

    /// Drop every entry naming `body`; called when a body is removed
    pub fn forget_body(&mut self, body: BodyKey) {
        self.overlapping.retain(|&(a, b)| a != body && b != body);
    }

    /// Number of pairs currently remembered as overlapping
    pub fn len(&self) -> usize {
        self.overlapping.len()
    }

    /// Whether no pair is remembered as overlapping
    pub fn is_empty(&self) -> bool {
        self.overlapping.is_empty()
    }

    /// Forget all pairs
    pub fn clear(&mut self) {
        self.overlapping.clear();
    }
}

fn ordered(a: BodyKey, b: BodyKey) -> (BodyKey, BodyKey) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
