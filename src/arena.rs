//! Slot arena owning every [`TraversalNode`] ever memoized (spec Section 3,
//! "Arena ownership").
//!
//! The Memoizer is the sole owner; the Frontier, Path Builder, and
//! predecessor chains hold only [`TraversalId`]s. This is the same
//! "own by `Vec`, reference by small integer id" shape the teacher crate
//! uses for its CRWI digraph (`adj: Vec<Vec<usize>>` in `inplace.rs`)
//! instead of a pointer-linked graph — it sidesteps self-referential
//! back-pointer lifetimes entirely.
//!
//! Storage is append-only: a supplanted `TraversalNode` is marked dead
//! (tracked in a parallel bitset) but its slot is never reused. Predecessor
//! chains hold `TraversalId`s captured at construction time and must remain
//! dereferenceable even after the entry they point to is superseded in the
//! Memoizer's index — an id-reusing free list (as the teacher's delta
//! command buffers can get away with, having no back-references to stale
//! slots) would let a reused id alias unrelated data and corrupt path
//! reconstruction.

use crate::types::TraversalId;
use crate::types::TraversalNode;

/// Append-only owning store for `TraversalNode`s, addressed by
/// [`TraversalId`]. "Removal" only flips the id's alive bit; the
/// `TraversalNode` itself remains in place so predecessor chains stay valid.
#[derive(Default)]
pub struct TraversalArena {
    slots: Vec<TraversalNode>,
    alive: Vec<bool>,
    alive_count: usize,
}

impl TraversalArena {
    pub fn new() -> Self {
        TraversalArena {
            slots: Vec::new(),
            alive: Vec::new(),
            alive_count: 0,
        }
    }

    /// Insert a node, returning its id. Ids are never reused.
    pub fn insert(&mut self, node: TraversalNode) -> TraversalId {
        let idx = self.slots.len() as u32;
        self.slots.push(node);
        self.alive.push(true);
        self.alive_count += 1;
        TraversalId(idx)
    }

    /// Borrow a node's data regardless of alive state. Predecessor-chain
    /// walks rely on this: a superseded `TraversalNode` still describes a
    /// valid path prefix even once it is no longer the best one.
    pub fn get(&self, id: TraversalId) -> &TraversalNode {
        &self.slots[id.0 as usize]
    }

    pub fn try_get(&self, id: TraversalId) -> Option<&TraversalNode> {
        self.slots.get(id.0 as usize)
    }

    #[inline]
    pub fn is_alive(&self, id: TraversalId) -> bool {
        self.alive.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Mark `id` dead (supplanted in the Memoizer's index) and return a
    /// clone of its data so the caller can carve surviving slices from it.
    /// The slot itself is retained for predecessor-chain reconstruction.
    pub fn remove(&mut self, id: TraversalId) -> TraversalNode {
        let idx = id.0 as usize;
        assert!(self.alive[idx], "TraversalArena::remove on already-dead id {id:?}");
        self.alive[idx] = false;
        self.alive_count -= 1;
        self.slots[idx].clone()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionalNodeId;

    fn dummy(start: u32, end: u32) -> TraversalNode {
        TraversalNode::seed(PositionalNodeId(0), 0, 1, start, end, 1, vec![], vec![])
    }

    #[test]
    fn insert_get_remove_roundtrip() {
        let mut arena = TraversalArena::new();
        let id = arena.insert(dummy(0, 10));
        assert!(arena.is_alive(id));
        assert_eq!(arena.get(id).sub_start, 0);
        let removed = arena.remove(id);
        assert_eq!(removed.sub_end, 10);
        assert!(!arena.is_alive(id));
    }

    #[test]
    fn dead_slots_remain_dereferenceable() {
        let mut arena = TraversalArena::new();
        let a = arena.insert(dummy(0, 1));
        let b = arena.insert(dummy(2, 3));
        arena.remove(a);
        assert_ne!(a, b, "ids are never reused, unlike a free-list arena");
        // `a` is dead but still readable — a predecessor chain pointing at
        // it must not panic.
        assert_eq!(arena.get(a).sub_start, 0);
        assert_eq!(arena.alive_count(), 1);
    }
}
