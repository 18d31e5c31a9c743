//! Positional de Bruijn graph traversal core: memoized best-path search
//! over positionally-annotated k-mer nodes, producing candidate contigs
//! for structural-variant assembly.
//!
//! Read ingestion, k-mer hashing, k-mer-graph construction, realignment,
//! and VCF emission are all out of scope — callers provide a
//! [`graph::GraphProvider`] and consume [`driver::AssemblyOutcome`]s.

pub mod arena;
pub mod cycle_check;
pub mod driver;
pub mod error;
pub mod filter;
pub mod frontier;
pub mod graph;
pub mod memoizer;
pub mod path;
pub mod types;

pub use arena::TraversalArena;
pub use driver::{AssemblyDriver, AssemblyOutcome};
pub use error::AssemblyError;
pub use filter::{evaluate as evaluate_filter, FilterOutcome, FilterReason};
pub use frontier::Frontier;
pub use graph::{GraphProvider, InMemoryGraph};
pub use memoizer::Memoizer;
pub use path::{Direction, PathBuilder};
pub use types::{
    AssemblerConfig, AssemblyCandidate, BranchingFactor, EvidenceFingerprint, PositionalNode,
    PositionalNodeId, TraversalId, TraversalNode, DEFAULT_KMER_SIZE,
    DEFAULT_MAX_CONTIGS_PER_ITERATION, DEFAULT_MIN_READS,
};
