//! Edge-triggered ship contact latches
//!
//! Ramming should fire once when two hulls first touch, not on every tick
//! they stay overlapped. The tracker remembers which unordered pairs are
//! currently in contact.

use std::collections::HashSet;

use super::state::ShipId;

/// Result of a contact check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Pair just started overlapping
    Began,
    /// Pair was already overlapping
    Ongoing,
    /// Pair stopped overlapping this check
    Ended,
    /// Pair is not overlapping
    Apart,
}

#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    latched: HashSet<(ShipId, ShipId)>,
}

fn pair(a: ShipId, b: ShipId) -> (ShipId, ShipId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the latch for `(a, b)` from the current overlap state
    pub fn check_and_latch(&mut self, a: ShipId, b: ShipId, overlapping: bool) -> Contact {
        let key = pair(a, b);
        match (overlapping, self.latched.contains(&key)) {
            (true, false) => {
                self.latched.insert(key);
                Contact::Began
            }
            (true, true) => Contact::Ongoing,
            (false, true) => {
                self.latched.remove(&key);
                Contact::Ended
            }
            (false, false) => Contact::Apart,
        }
    }

    pub fn is_latched(&self, a: ShipId, b: ShipId) -> bool {
        self.latched.contains(&pair(a, b))
    }

    /// Drop every latch involving `id`
    pub fn forget(&mut self, id: ShipId) {
        self.latched.retain(|&(a, b)| a != id && b != id);
    }

    pub fn len(&self) -> usize {
        self.latched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latched.is_empty()
    }
}
