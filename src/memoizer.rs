//! Memoizer (spec Section 4.C, component C) — the heart of the core.
//!
//! Interval-indexed best-score map: for every (k-mer, sub-interval) cell,
//! retains only the best-scoring path reaching that cell, slicing and
//! replacing overlapping candidates atomically.
//!
//! The ordered index is a `BTreeMap` keyed on `(first_kmer, sub_start,
//! sub_end)`, standing in for the teacher crate's hand-rolled, unsafe
//! `SplayTree<Vec<usize>>` (`splay.rs`) — both are "ordered map keyed on an
//! integer fingerprint, storing small per-key state", but the Memoizer needs
//! *range* queries (all entries overlapping `[s, e]` for a given k-mer), not
//! the splay tree's point `find`/`insert_or_get`. A safe `BTreeMap::range`
//! gives the same O(log n) skip-to-first-candidate the splay tree's
//! self-adjusting root gives for repeated point lookups, without the
//! raw-pointer unsafety — a substitution recorded in DESIGN.md.

use std::collections::BTreeMap;

use crate::arena::TraversalArena;
use crate::frontier::Frontier;
use crate::types::{TraversalId, TraversalNode};

type IndexKey = (u64, u32, u32);

/// Interval-indexed best-score map over [`TraversalNode`]s (spec Section 3:
/// "Memoizer index").
#[derive(Default)]
pub struct Memoizer {
    index: BTreeMap<IndexKey, TraversalId>,
}

impl Memoizer {
    pub fn new() -> Self {
        Memoizer {
            index: BTreeMap::new(),
        }
    }

    pub fn alive_count(&self) -> usize {
        self.index.len()
    }

    fn key_of(t: &TraversalNode) -> IndexKey {
        (t.first_kmer, t.sub_start, t.sub_end)
    }

    /// The leftmost alive entry for `first_kmer` whose interval overlaps
    /// `[s, e]`, if any. Entries for a single k-mer are disjoint and sorted
    /// by `sub_start` (the Memoizer's own invariant), so the scan can stop
    /// as soon as an entry starts after `e`.
    fn find_first_overlap(
        &self,
        first_kmer: u64,
        s: u32,
        e: u32,
    ) -> Option<(IndexKey, TraversalId)> {
        let lower = (first_kmer, 0u32, 0u32);
        let upper = (first_kmer, u32::MAX, u32::MAX);
        for (&key, &id) in self.index.range(lower..=upper) {
            let (_, existing_start, existing_end) = key;
            if existing_start > e {
                break;
            }
            if existing_end >= s {
                return Some((key, id));
            }
        }
        None
    }

    /// Accept a candidate `TraversalNode`, resolving overlaps against
    /// whatever is currently alive for its k-mer (spec Section 4.C
    /// algorithm). Surviving slices (the candidate, possibly narrowed, and
    /// any surviving pieces of entries it supplants) are inserted into the
    /// arena, indexed, and pushed onto `frontier`.
    ///
    /// All index mutations triggered by one `memoize` call are applied
    /// before returning — no partial state is observable by a concurrent
    /// `poll_frontier` (spec Section 5, "Ordering guarantees"), which holds
    /// trivially here since the core is single-threaded per region and this
    /// method never yields control mid-mutation.
    pub fn memoize(
        &mut self,
        arena: &mut TraversalArena,
        frontier: &mut Frontier,
        mut candidate: TraversalNode,
    ) {
        loop {
            let kmer = candidate.first_kmer;
            let (s, e) = (candidate.sub_start, candidate.sub_end);

            let Some((existing_key, existing_id)) = self.find_first_overlap(kmer, s, e) else {
                // No overlap anywhere in [s, e]: the whole candidate survives.
                self.insert_new(arena, frontier, candidate);
                return;
            };

            // Borrow-check: snapshot what we need before mutating.
            let existing_score = arena.get(existing_id).score;

            if candidate.score > existing_score {
                // Candidate wins: remove existing, keep its surviving edges.
                self.index.remove(&existing_key);
                let existing = arena.remove(existing_id);

                if existing.sub_start < s {
                    let left = TraversalNode::sliced(&existing, existing.sub_start, s - 1);
                    self.insert_new(arena, frontier, left);
                }
                if e < existing.sub_end {
                    let right = TraversalNode::sliced(&existing, e + 1, existing.sub_end);
                    self.insert_new(arena, frontier, right);
                }
                // Candidate itself may still overlap further entries to the
                // right; loop again with the same (full) candidate range.
                continue;
            } else {
                // Existing wins (including the tie case — stable).
                let existing = arena.get(existing_id);
                if candidate.sub_start < existing.sub_start {
                    // The prefix strictly before `existing` cannot overlap
                    // any other entry (entries are disjoint and sorted), so
                    // it survives unconditionally.
                    let prefix =
                        TraversalNode::sliced(&candidate, candidate.sub_start, existing.sub_start - 1);
                    self.insert_new(arena, frontier, prefix);
                }
                let new_start = existing.sub_end.saturating_add(1);
                if new_start > candidate.sub_end {
                    // Candidate fully consumed; nothing left to offer.
                    return;
                }
                candidate = TraversalNode::sliced(&candidate, new_start, candidate.sub_end);
                continue;
            }
        }
    }

    fn insert_new(&mut self, arena: &mut TraversalArena, frontier: &mut Frontier, node: TraversalNode) {
        let key = Self::key_of(&node);
        let frontier_key = node.frontier_key();
        let id = arena.insert(node);
        self.index.insert(key, id);
        frontier.push(frontier_key, id);
    }

    /// All alive ids whose k-mer matches `first_kmer`; used by ingestion to
    /// find the traversal(s) currently terminating at a node before pushing
    /// edges forward into its successors.
    pub fn alive_ids_for_kmer(&self, first_kmer: u64) -> Vec<TraversalId> {
        let lower = (first_kmer, 0u32, 0u32);
        let upper = (first_kmer, u32::MAX, u32::MAX);
        self.index.range(lower..=upper).map(|(_, &id)| id).collect()
    }

    /// Test/debug-only: verify the disjointness invariant holds (spec
    /// Section 8). O(n) over the index; never called on the happy path.
    #[cfg(test)]
    pub(crate) fn assert_disjoint(&self) {
        let mut last: Option<IndexKey> = None;
        for &(kmer, start, end) in self.index.keys() {
            if let Some((lk, _, le)) = last {
                if lk == kmer {
                    assert!(start > le, "overlap detected for kmer {kmer}");
                }
            }
            last = Some((kmer, start, end));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionalNodeId;

    fn seed(kmer: u64, s: u32, e: u32, score: u32) -> TraversalNode {
        TraversalNode::seed(PositionalNodeId(0), kmer, 1, s, e, score, vec![], vec![])
    }

    #[test]
    fn exact_match_tie_keeps_existing() {
        let mut arena = TraversalArena::new();
        let mut frontier = Frontier::new();
        let mut mem = Memoizer::new();
        mem.memoize(&mut arena, &mut frontier, seed(7, 100, 110, 5));
        mem.memoize(&mut arena, &mut frontier, seed(7, 100, 110, 5));
        assert_eq!(mem.alive_count(), 1);
        mem.assert_disjoint();
    }

    // Overlap slicing (spec Section 8, scenario 3).
    #[test]
    fn overlap_slicing_example() {
        let mut arena = TraversalArena::new();
        let mut frontier = Frontier::new();
        let mut mem = Memoizer::new();
        mem.memoize(&mut arena, &mut frontier, seed(7, 100, 110, 5));
        mem.memoize(&mut arena, &mut frontier, seed(7, 105, 115, 8));

        mem.assert_disjoint();
        let mut alive: Vec<_> = mem
            .alive_ids_for_kmer(7)
            .into_iter()
            .map(|id| {
                let t = arena.get(id);
                (t.sub_start, t.sub_end, t.score)
            })
            .collect();
        alive.sort();
        assert_eq!(alive, vec![(100, 104, 5), (105, 115, 8)]);
    }

    // Dominated candidate dropped (spec Section 8, scenario 4).
    #[test]
    fn fully_dominated_candidate_is_dropped() {
        let mut arena = TraversalArena::new();
        let mut frontier = Frontier::new();
        let mut mem = Memoizer::new();
        mem.memoize(&mut arena, &mut frontier, seed(3, 100, 120, 10));
        mem.memoize(&mut arena, &mut frontier, seed(3, 105, 115, 10));

        assert_eq!(mem.alive_count(), 1);
        let id = mem.alive_ids_for_kmer(3)[0];
        let t = arena.get(id);
        assert_eq!((t.sub_start, t.sub_end, t.score), (100, 120, 10));
    }

    #[test]
    fn candidate_fully_covering_multiple_existing_supplants_all() {
        let mut arena = TraversalArena::new();
        let mut frontier = Frontier::new();
        let mut mem = Memoizer::new();
        mem.memoize(&mut arena, &mut frontier, seed(1, 0, 10, 2));
        mem.memoize(&mut arena, &mut frontier, seed(1, 20, 30, 2));
        mem.memoize(&mut arena, &mut frontier, seed(1, 0, 30, 100));

        mem.assert_disjoint();
        let alive = mem.alive_ids_for_kmer(1);
        assert_eq!(alive.len(), 1);
        let t = arena.get(alive[0]);
        assert_eq!((t.sub_start, t.sub_end, t.score), (0, 30, 100));
    }

    #[test]
    fn distinct_kmers_never_interact() {
        let mut arena = TraversalArena::new();
        let mut frontier = Frontier::new();
        let mut mem = Memoizer::new();
        mem.memoize(&mut arena, &mut frontier, seed(1, 0, 10, 1));
        mem.memoize(&mut arena, &mut frontier, seed(2, 0, 10, 1));
        assert_eq!(mem.alive_count(), 2);
    }
}
