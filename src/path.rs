//! Path Builder (spec Section 2 row E, Section 4.E): depth-first assembly
//! of a concrete contig from memoized best-predecessor chains.
//!
//! The successor cursor is a restartable position into a materialized
//! `Vec`, not a consumed `Iterator` — the same shape as the teacher's
//! `find_cycle_in_scc` DFS frames, which resume a neighbor scan into
//! `adj[v]` after backtracking rather than re-deriving an iterator.

use std::collections::VecDeque;

use crate::arena::TraversalArena;
use crate::error::AssemblyError;
use crate::graph::GraphProvider;
use crate::types::{PositionalNodeId, TraversalId};

/// A restartable cursor into a node's materialized successor list.
struct SuccessorCursor {
    successors: Vec<(PositionalNodeId, u32, u32)>,
    next_index: usize,
}

impl SuccessorCursor {
    fn new(successors: Vec<(PositionalNodeId, u32, u32)>) -> Self {
        SuccessorCursor {
            successors,
            next_index: 0,
        }
    }

    fn next(&mut self) -> Option<(PositionalNodeId, u32, u32)> {
        let item = self.successors.get(self.next_index).copied();
        if item.is_some() {
            self.next_index += 1;
        }
        item
    }

    fn reset(&mut self) {
        self.next_index = 0;
    }
}

/// Direction the path is being extended in (spec Section 4.E). The Driver's
/// predecessor-chain walk (`AssemblyDriver::reconstruct`) works directly off
/// arena back-pointers rather than through a `Reverse`-direction builder, since
/// it already knows the exact chain and has no need to re-fetch successor
/// cursors; `Reverse` remains available on `PathBuilder` itself for callers
/// that want to grow a path backward from a fixed head node by cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// DFS stack over [`TraversalId`]s with a parallel stack of restartable
/// successor cursors (spec Section 4.E).
pub struct PathBuilder<'a> {
    path: VecDeque<TraversalId>,
    cursors: VecDeque<SuccessorCursor>,
    direction: Direction,
    graph: &'a dyn GraphProvider,
}

impl<'a> PathBuilder<'a> {
    /// Seed a path from a single root T (typically the result of a
    /// predecessor-chain reconstruction's innermost element).
    pub fn new(root: TraversalId, direction: Direction, graph: &'a dyn GraphProvider) -> Self {
        let mut path = VecDeque::new();
        path.push_back(root);
        PathBuilder {
            path,
            cursors: VecDeque::new(),
            direction,
            graph,
        }
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    fn head(&self) -> TraversalId {
        *match self.direction {
            Direction::Forward => self.path.back(),
            Direction::Reverse => self.path.front(),
        }
        .expect("path is never empty after construction")
    }

    /// Append `id` at the head determined by direction, with a fresh
    /// successor cursor fetched from the graph provider.
    pub fn push(&mut self, id: TraversalId, arena: &TraversalArena) -> Result<(), AssemblyError> {
        let node_id = arena.get(id).node;
        let successors: Vec<_> = self.graph.successors(node_id)?.collect();
        match self.direction {
            Direction::Forward => {
                self.path.push_back(id);
                self.cursors.push_back(SuccessorCursor::new(successors));
            }
            Direction::Reverse => {
                self.path.push_front(id);
                self.cursors.push_front(SuccessorCursor::new(successors));
            }
        }
        Ok(())
    }

    /// Remove the head element. Panics if only the root remains — popping
    /// the root is a programming error, matching the teacher's posture of
    /// asserting rather than silently no-opping on caller misuse.
    pub fn pop(&mut self) {
        debug_assert!(self.path.len() > 1, "pop() on the root element");
        assert!(
            self.path.len() > 1,
            "PathBuilder::pop called with only the root remaining"
        );
        match self.direction {
            Direction::Forward => {
                self.path.pop_back();
                self.cursors.pop_back();
            }
            Direction::Reverse => {
                self.path.pop_front();
                self.cursors.pop_front();
            }
        }
    }

    /// If the head's successor cursor has an unvisited entry reachable
    /// within the Memoizer (i.e., `resolve` returns `Some`), push it and
    /// return its id; else return `None` without mutating the path.
    pub fn next_child<F>(&mut self, arena: &TraversalArena, mut resolve: F) -> Result<Option<TraversalId>, AssemblyError>
    where
        F: FnMut(PositionalNodeId, u32, u32) -> Option<TraversalId>,
    {
        loop {
            let cursor = match self.direction {
                Direction::Forward => self.cursors.back_mut(),
                Direction::Reverse => self.cursors.front_mut(),
            };
            let Some(cursor) = cursor else { return Ok(None) };
            let Some((succ_node, s, e)) = cursor.next() else {
                return Ok(None);
            };
            if let Some(id) = resolve(succ_node, s, e) {
                self.push(id, arena)?;
                return Ok(Some(id));
            }
            // Successor not memoized (already supplanted, or not yet
            // visited) — keep scanning this cursor for the next candidate.
        }
    }

    /// Replace the head's cursor with a fresh one over the same node.
    pub fn reset_children(&mut self) {
        let cursor = match self.direction {
            Direction::Forward => self.cursors.back_mut(),
            Direction::Reverse => self.cursors.front_mut(),
        };
        if let Some(cursor) = cursor {
            cursor.reset();
        }
    }

    /// Repeatedly select the highest-weight admissible successor, pushing
    /// it, until none remains (spec Section 4.E). Tie-break: first
    /// encountered in iteration order.
    ///
    /// `budget_remaining` bounds how many additional nodes this call may
    /// push (spec Section 7, kind 2: the node budget covers both
    /// predecessor reconstruction and greedy extension). Returns `true` if
    /// the budget was exhausted before a natural stopping point was
    /// reached — the caller should then treat the whole emission as
    /// abandoned, not just truncated.
    pub fn greedy_traverse(
        &mut self,
        arena: &TraversalArena,
        allow_ref: bool,
        allow_non_ref: bool,
        budget_remaining: usize,
        mut weight_of: impl FnMut(PositionalNodeId) -> (u32, bool),
        mut resolve: impl FnMut(PositionalNodeId, u32, u32) -> Option<TraversalId>,
    ) -> Result<bool, AssemblyError> {
        let mut pushed = 0usize;
        loop {
            let head = self.head();
            let node_id = arena.get(head).node;
            let successors: Vec<_> = self.graph.successors(node_id)?.collect();

            let mut best: Option<(u32, PositionalNodeId, u32, u32)> = None;
            for (succ_id, s, e) in successors {
                let (w, is_ref) = weight_of(succ_id);
                let admissible = (is_ref && allow_ref) || (!is_ref && allow_non_ref);
                if !admissible {
                    continue;
                }
                if best.map(|(bw, ..)| w > bw).unwrap_or(true) {
                    best = Some((w, succ_id, s, e));
                }
            }

            let Some((_, succ_id, s, e)) = best else {
                return Ok(false);
            };
            let Some(id) = resolve(succ_id, s, e) else {
                return Ok(false);
            };
            if pushed >= budget_remaining {
                return Ok(true);
            }
            self.push(id, arena)?;
            pushed += 1;
        }
    }

    /// Sum of the *actually walked* path's node weights, looked up fresh
    /// against the graph provider for each element.
    ///
    /// The head's cached `score`/`path_length` are NOT used here: during
    /// greedy extension, `resolve` can hand back whatever alive
    /// `TraversalNode` the Memoizer currently has covering a successor's
    /// interval, and that entry's own `score`/`path_length` describe *its*
    /// best-known predecessor chain, which need not be the chain this
    /// builder actually walked to reach it (a converging DAG can memoize a
    /// node's best path through a different, higher-scoring predecessor
    /// than the one this path just traversed). Summing each walked
    /// element's own node weight keeps `current_weight`/`current_length`
    /// faithful to `elements()` (spec Section 3, Path invariant: "the
    /// overall score is the sum of node weights"; Section 8, Path
    /// coherence).
    pub fn current_weight(&self, arena: &TraversalArena) -> u64 {
        self.path
            .iter()
            .map(|&id| self.graph.node(arena.get(id).node).weight as u64)
            .sum()
    }

    pub fn current_length(&self, _arena: &TraversalArena) -> u32 {
        self.path.len() as u32
    }

    pub fn terminal_ranges(&self, arena: &TraversalArena) -> Vec<(u32, u32)> {
        arena.get(self.head()).terminal_ranges.clone()
    }

    /// The path elements in root-to-head order, regardless of direction.
    pub fn elements(&self) -> Vec<TraversalId> {
        self.path.iter().copied().collect()
    }
}
