//! # Error Types
//!
//! The single error taxonomy of the core crate.
//!
//! - No silent failures
//! - Use `Result<T, CredError>` for fallible operations
//! - The core never panics; malformed input fails at the offending call

use crate::address::Kind;
use thiserror::Error;

/// Errors that can occur in credgraph-core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredError {
    /// An address could not be built or decoded.
    #[error("bad address: {0}")]
    InvalidAddress(String),

    /// An address of one kind was used where the other kind was required.
    #[error("{}expected {expected}, got {actual}", label_prefix(.label))]
    WrongKind {
        /// The kind the call site required.
        expected: Kind,
        /// The kind that was supplied.
        actual: Kind,
        /// Optional caller-supplied context.
        label: Option<String>,
    },

    /// Two graphs carry different content under the same address.
    #[error("merge conflict at {address}")]
    MergeConflict {
        /// Display form of the conflicting address.
        address: String,
    },

    /// An edge references a node that is not part of the graph.
    #[error("edge {edge} references missing node {endpoint}")]
    DanglingEdge {
        /// Display form of the edge address.
        edge: String,
        /// Display form of the missing endpoint.
        endpoint: String,
    },

    /// A timeline violates its ordering or shape invariants.
    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),

    /// A score vector's length does not match the node ordering.
    #[error("score vector for interval {interval_index} has length {actual}, expected {expected}")]
    ScoreVectorLength {
        /// Position of the offending interval.
        interval_index: usize,
        /// Length of the node ordering.
        expected: usize,
        /// Length actually found.
        actual: usize,
    },

    /// An address appears more than once where a mapping is required.
    #[error("duplicate address {0}")]
    DuplicateAddress(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A score is NaN or infinite and could not be persisted faithfully.
    #[error("non-finite score {value} for {address} in interval {interval_index}")]
    NonFiniteScore {
        /// Position of the offending interval.
        interval_index: usize,
        /// Display form of the node address.
        address: String,
        /// The rejected value, rendered.
        value: String,
    },
}

fn label_prefix(label: &Option<String>) -> String {
    label
        .as_ref()
        .map(|l| format!("{l}: "))
        .unwrap_or_default()
}
