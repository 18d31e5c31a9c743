//! Error taxonomy (spec Section 7).
//!
//! Hand-rolled enum with manual `Display`/`std::error::Error`, in the shape
//! of the teacher crate's `DeltaError`. Budget exhaustion is not modeled as
//! an error: it is recovered locally by the Driver and only logged at
//! debug level (spec Section 7, "Propagation").

use std::fmt;

use crate::types::PositionalNodeId;

/// Fatal faults the core surfaces to the caller. Budget exhaustion and
/// filter rejection are deliberately not variants here: the former is
/// silent/recoverable, the latter is a structured non-error outcome
/// (`crate::filter::FilterOutcome`).
#[derive(Debug)]
pub enum AssemblyError {
    /// A DAG property was broken, an interval was empty, or a memoized
    /// overlap was discovered after `memoize` completed. Fatal; carries
    /// diagnostic context for the offending node when known.
    InvariantViolation {
        detail: String,
        node: Option<PositionalNodeId>,
    },
    /// The graph provider produced an ill-formed edge: an interval not
    /// within the successor's interval, or an edge implying a cycle.
    ProviderFault {
        detail: String,
        node: PositionalNodeId,
    },
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyError::InvariantViolation { detail, node } => match node {
                Some(PositionalNodeId(id)) => {
                    write!(f, "invariant violation at node {id}: {detail}")
                }
                None => write!(f, "invariant violation: {detail}"),
            },
            AssemblyError::ProviderFault {
                detail,
                node: PositionalNodeId(id),
            } => write!(f, "graph provider fault at node {id}: {detail}"),
        }
    }
}

impl std::error::Error for AssemblyError {}
