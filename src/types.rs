//! Core data model: PositionalNode, TraversalNode, ids, and configuration.
//!
//! Mirrors the shape of a positional de Bruijn graph's (k-mer,
//! position-interval) vertices and the best-path records built over them.

use std::fmt;

pub const DEFAULT_KMER_SIZE: usize = 25;
pub const DEFAULT_MAX_CONTIGS_PER_ITERATION: usize = 1024;
pub const DEFAULT_MIN_READS: usize = 3;

/// Identity of a [`PositionalNode`] as handed out by a [`crate::graph::GraphProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionalNodeId(pub u32);

/// Identity of a [`TraversalNode`] inside the Memoizer's arena (Section 3,
/// "Arena ownership"). Never dereferenced directly outside `crate::arena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraversalId(pub u32);

/// A k-mer annotated with a validity position-interval, weight, and
/// reference flag (spec Section 3, component A).
///
/// Pure data: no error modes beyond the construction-time assertion that
/// the interval is well-formed. Malformed geometry is a contract violation,
/// not a recoverable error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionalNode {
    pub first_kmer: u64,
    pub start_position: u32,
    pub end_position: u32,
    pub length: u32,
    pub weight: u32,
    pub is_reference: bool,
}

impl PositionalNode {
    /// Construct a node, asserting the interval and length invariants.
    ///
    /// # Panics
    /// Panics if `start_position > end_position` or `length == 0`. These are
    /// contract violations from the graph producer, not recoverable errors.
    pub fn new(
        first_kmer: u64,
        start_position: u32,
        end_position: u32,
        length: u32,
        weight: u32,
        is_reference: bool,
    ) -> Self {
        assert!(
            start_position <= end_position,
            "PositionalNode interval is empty: [{start_position}, {end_position}]"
        );
        assert!(length >= 1, "PositionalNode length must be >= 1");
        PositionalNode {
            first_kmer,
            start_position,
            end_position,
            length,
            weight,
            is_reference,
        }
    }

    #[inline]
    pub fn interval(&self) -> (u32, u32) {
        (self.start_position, self.end_position)
    }
}

impl fmt::Display for PositionalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "K(kmer={}, [{}, {}], len={}, w={}{})",
            self.first_kmer,
            self.start_position,
            self.end_position,
            self.length,
            self.weight,
            if self.is_reference { ", ref" } else { "" }
        )
    }
}

/// A (PositionalNode, predecessor, score, sub-interval) record: the best
/// known path reaching `node` within `[sub_start, sub_end]` (spec Section 3,
/// component B).
///
/// Stored exclusively inside the Memoizer's arena (`crate::arena`); callers
/// outside `crate` never see a `TraversalNode` directly, only its
/// [`TraversalId`] and accessors on [`crate::memoizer::Memoizer`].
#[derive(Clone, Debug)]
pub struct TraversalNode {
    pub node: PositionalNodeId,
    /// Cached from `PositionalNode::first_kmer` at construction time so the
    /// Memoizer can index and compare without re-querying the graph
    /// provider — the arena's records are self-contained, the way the
    /// teacher's `copy_info: Vec<(usize, usize, usize, usize)>` tuples in
    /// `inplace.rs` cache `(src, dst, length)` inline rather than
    /// re-dereferencing the original command list.
    pub first_kmer: u64,
    /// Cached from `PositionalNode::length`; used for the Frontier key.
    pub node_length: u32,
    pub sub_start: u32,
    pub sub_end: u32,
    pub predecessor: Option<TraversalId>,
    pub score: u64,
    pub path_length: u32,
    /// Terminal ranges carried forward; used by the Driver to decide where a
    /// path may emit an assembly (Section 3).
    pub terminal_ranges: Vec<(u32, u32)>,
    pub terminal_leaf_anchor_ranges: Vec<(u32, u32)>,
}

impl TraversalNode {
    /// Fresh seed: score = node_weight, path_length = 1, no predecessor.
    #[allow(clippy::too_many_arguments)]
    pub fn seed(
        node: PositionalNodeId,
        first_kmer: u64,
        node_length: u32,
        sub_start: u32,
        sub_end: u32,
        node_weight: u32,
        terminal_ranges: Vec<(u32, u32)>,
        terminal_leaf_anchor_ranges: Vec<(u32, u32)>,
    ) -> Self {
        assert!(sub_start <= sub_end, "TraversalNode sub-interval is empty");
        TraversalNode {
            node,
            first_kmer,
            node_length,
            sub_start,
            sub_end,
            predecessor: None,
            score: node_weight as u64,
            path_length: 1,
            terminal_ranges,
            terminal_leaf_anchor_ranges,
        }
    }

    /// Extension: score = predecessor.score + node_weight.
    #[allow(clippy::too_many_arguments)]
    pub fn extend(
        node: PositionalNodeId,
        first_kmer: u64,
        node_length: u32,
        sub_start: u32,
        sub_end: u32,
        node_weight: u32,
        predecessor: TraversalId,
        predecessor_score: u64,
        predecessor_path_length: u32,
        terminal_ranges: Vec<(u32, u32)>,
        terminal_leaf_anchor_ranges: Vec<(u32, u32)>,
    ) -> Self {
        assert!(sub_start <= sub_end, "TraversalNode sub-interval is empty");
        TraversalNode {
            node,
            first_kmer,
            node_length,
            sub_start,
            sub_end,
            predecessor: Some(predecessor),
            score: predecessor_score + node_weight as u64,
            path_length: predecessor_path_length + 1,
            terminal_ranges,
            terminal_leaf_anchor_ranges,
        }
    }

    /// Slicing constructor (spec Section 4.B, constructor 2): a narrower
    /// sub-interval of an existing T, preserving predecessor and score.
    /// Used exclusively by the Memoizer to carve surviving regions after
    /// overlap resolution.
    pub fn sliced(existing: &TraversalNode, s: u32, e: u32) -> Self {
        assert!(
            existing.sub_start <= s && e <= existing.sub_end && s <= e,
            "slice [{s}, {e}] is not within parent [{}, {}]",
            existing.sub_start,
            existing.sub_end
        );
        TraversalNode {
            node: existing.node,
            first_kmer: existing.first_kmer,
            node_length: existing.node_length,
            sub_start: s,
            sub_end: e,
            predecessor: existing.predecessor,
            score: existing.score,
            path_length: existing.path_length,
            terminal_ranges: existing.terminal_ranges.clone(),
            terminal_leaf_anchor_ranges: existing.terminal_leaf_anchor_ranges.clone(),
        }
    }

    /// The min-heap priority used by the Frontier: the earliest position at
    /// which downstream work becomes unblocked (spec Section 3).
    #[inline]
    pub fn frontier_key(&self) -> u64 {
        self.sub_end as u64 + self.node_length as u64
    }
}

/// Per-node successor visit cap (spec Section 6, `branching_factor`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchingFactor {
    Unbounded,
    Limited(u32),
}

impl BranchingFactor {
    #[inline]
    pub fn allows(&self, visited_so_far: u32) -> bool {
        match self {
            BranchingFactor::Unbounded => true,
            BranchingFactor::Limited(n) => visited_so_far < *n,
        }
    }
}

/// Flat struct of enumerated options, passed by borrow into the driver
/// (spec Section 6 and Design Notes: "Configuration is a flat struct...
/// Avoid process-wide mutable state"). Mirrors the teacher crate's
/// `DiffOptions`.
#[derive(Clone, Debug)]
pub struct AssemblerConfig {
    /// k-mer size (positive integer, typically 25).
    pub k: usize,
    /// Positive integer (default 1024).
    pub max_contigs_per_iteration: usize,
    /// Positive integer budget on builder work per emission.
    pub max_path_traversal_nodes: usize,
    pub allow_reference_kmer_reuse: bool,
    pub branching_factor: BranchingFactor,
    /// Multiplier on the maximum expected read-fragment size controlling how
    /// long the driver waits for upstream evidence before committing.
    pub subgraph_assembly_margin: f64,
    /// Multiplier bounding the positional extent of any single assembly
    /// subgraph.
    pub max_subgraph_width: f64,
    /// Filter threshold (positive integer, default 3).
    pub min_reads: usize,
    /// Run the optional debug-only acyclicity check (Section 9) before
    /// traversing a region. Off by default; meant for test/debug builds.
    pub debug_validate_acyclic: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            k: DEFAULT_KMER_SIZE,
            max_contigs_per_iteration: DEFAULT_MAX_CONTIGS_PER_ITERATION,
            max_path_traversal_nodes: usize::MAX,
            allow_reference_kmer_reuse: false,
            branching_factor: BranchingFactor::Unbounded,
            subgraph_assembly_margin: 3.0,
            max_subgraph_width: 8.0,
            min_reads: DEFAULT_MIN_READS,
            debug_validate_acyclic: false,
        }
    }
}

impl AssemblerConfig {
    /// Construct with a validated margin/width (must be non-negative,
    /// non-NaN rationals per spec Section 6).
    pub fn new(subgraph_assembly_margin: f64, max_subgraph_width: f64) -> Self {
        assert!(
            subgraph_assembly_margin.is_finite() && subgraph_assembly_margin >= 0.0,
            "subgraph_assembly_margin must be a non-negative finite number"
        );
        assert!(
            max_subgraph_width.is_finite() && max_subgraph_width >= 0.0,
            "max_subgraph_width must be a non-negative finite number"
        );
        AssemblerConfig {
            subgraph_assembly_margin,
            max_subgraph_width,
            ..AssemblerConfig::default()
        }
    }
}

/// Supporting-evidence fingerprint attached to an emitted contig. The core
/// treats these as opaque counters supplied alongside each node by the
/// (out-of-scope) graph producer; it does not interpret read data itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvidenceFingerprint {
    pub read_pair_support: u32,
    pub soft_clip_support: u32,
    pub remote_support: u32,
}

/// A completed assembly candidate, ready for [`crate::filter::evaluate`].
#[derive(Clone, Debug)]
pub struct AssemblyCandidate {
    pub breakend_length: u32,
    pub anchor_length: u32,
    pub evidence: EvidenceFingerprint,
    pub max_read_pair_read_length: u32,
    pub has_defined_break_position: bool,
}
