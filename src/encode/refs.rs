/*!
 * Encoder Reference Table
 *
 * Maps node identity to reference slots during one encode call. A node is
 * assigned exactly one slot, at first encounter, before its children are
 * written; every later encounter emits a reference instead. Constructed
 * instances and prototyped objects defer their slot while their
 * constructor arguments / prototype are in flight, tracked here so a
 * premature self-reference becomes a detectable error rather than
 * unbounded recursion.
 */

use crate::core::types::{NodeId, SlotId};
use ahash::RandomState;
use std::collections::{HashMap, HashSet};

/// Per-call identity table for the encoder
#[derive(Debug, Default)]
pub struct EncodeRefs {
    slots: HashMap<NodeId, SlotId, RandomState>,
    deferred: HashSet<NodeId, RandomState>,
}

impl EncodeRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot previously assigned to this node, if any
    #[inline]
    pub fn lookup(&self, id: NodeId) -> Option<SlotId> {
        self.slots.get(&id).copied()
    }

    /// Assign the next slot to a first-encountered node
    pub fn assign(&mut self, id: NodeId) -> SlotId {
        let slot = self.slots.len() as SlotId;
        self.slots.insert(id, slot);
        slot
    }

    /// Mark a node whose slot assignment is deferred (constructor
    /// arguments or prototype currently being written)
    #[inline]
    pub fn begin_deferred(&mut self, id: NodeId) {
        self.deferred.insert(id);
    }

    #[inline]
    pub fn end_deferred(&mut self, id: NodeId) {
        self.deferred.remove(&id);
    }

    #[inline]
    pub fn is_deferred(&self, id: NodeId) -> bool {
        self.deferred.contains(&id)
    }

    /// Number of slots assigned so far
    #[inline]
    pub fn populated(&self) -> usize {
        self.slots.len()
    }
}
