//! Frontier (spec Section 4.D, component D): a min-heap over memoized
//! `TraversalId`s keyed by `sub_end + node.length`, with lazy invalidation.
//!
//! Shaped on the teacher's Kahn-topological-sort ready-queue in
//! `inplace.rs::make_inplace` — a `BinaryHeap<Reverse<(key, id)>>` tie-broken
//! by id for determinism given equal keys, exactly the pattern needed here
//! (`BinaryHeap<Reverse<(copy_length, index)>>` there vs.
//! `BinaryHeap<Reverse<(frontier_key, TraversalId)>>` here).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::arena::TraversalArena;
use crate::types::TraversalId;

/// Candidate `TraversalId`s not yet expanded, ordered by earliest completion
/// position (`sub_end + node.length`). `poll`/`peek` apply lazy
/// invalidation: entries superseded in the Memoizer's arena are discarded
/// without a heap-removal, at the cost of potential heap bloat — bounded by
/// periodic [`Frontier::compact`] (spec Design Notes).
#[derive(Default)]
pub struct Frontier {
    heap: BinaryHeap<Reverse<(u64, TraversalId)>>,
}

impl Frontier {
    pub fn new() -> Self {
        Frontier {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, key: u64, id: TraversalId) {
        self.heap.push(Reverse((key, id)));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop dead heap entries until the top is alive or the heap is empty.
    /// Invariant restored: top is either alive or the heap is empty.
    fn flush_invalid_head(&mut self, arena: &TraversalArena) {
        while let Some(&Reverse((_, id))) = self.heap.peek() {
            if arena.is_alive(id) {
                break;
            }
            self.heap.pop();
        }
    }

    /// Peek the best alive id without removing it.
    pub fn peek(&mut self, arena: &TraversalArena) -> Option<TraversalId> {
        self.flush_invalid_head(arena);
        self.heap.peek().map(|&Reverse((_, id))| id)
    }

    /// Remove and return the best alive id (spec Section 8, "Frontier
    /// freshness": the returned T is alive immediately after this call).
    pub fn poll(&mut self, arena: &TraversalArena) -> Option<TraversalId> {
        self.flush_invalid_head(arena);
        self.heap.pop().map(|Reverse((_, id))| id)
    }

    /// Rebuild the heap keeping only entries alive in `arena`. The Driver
    /// invokes this once `len() > 2 * arena.alive_count()` (spec Design
    /// Notes: "bound it by periodic compaction").
    pub fn compact(&mut self, arena: &TraversalArena) {
        let alive: Vec<Reverse<(u64, TraversalId)>> = self
            .heap
            .drain()
            .filter(|&Reverse((_, id))| arena.is_alive(id))
            .collect();
        self.heap = BinaryHeap::from(alive);
    }

    pub fn should_compact(&self, arena: &TraversalArena) -> bool {
        self.heap.len() > 2 * arena.alive_count().max(1)
    }
}
