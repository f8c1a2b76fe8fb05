//! Error types for graph construction, traversal and execution.
//!
//! All errors are collected into a single [`GraphError`] enum via `thiserror`, matching
//! the error hierarchy used throughout this crate's public API:
//!
//! ```text
//! GraphError
//! ├── InvalidArgument  - programmer errors: null/empty ids, bad wiring requests
//! ├── Structural       - cycle detected, orphaned connection on validate
//! ├── Resolution       - property path could not be traversed
//! ├── Parse            - JSON parse failure (e.g. InputJson node)
//! ├── NodeFailure       - a node's execute() returned or raised an error
//! └── Cancelled         - cooperative cancellation observed
//! ```
//!
//! Expected policy rejections at the graph-model level (incompatible types, fan-in
//! violation, cycle) are *not* represented as errors — `add_connection` returns `None`
//! for those, per the contract in [`crate::graph::Graph::add_connection`]. `GraphError`
//! is reserved for programmer errors and the execution-time error kinds above.

use thiserror::Error;

/// Convenience alias used throughout the public API.
pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// A caller passed a null/empty identifier, an unregistered node type, or otherwise
    /// violated a precondition that is the caller's responsibility to avoid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The graph's structural invariants were violated (cycle on insert, connection
    /// orphaned from its owning nodes on `validate()`).
    #[error("structural error: {0}")]
    Structural(String),

    /// A property path could not be resolved against the target value.
    #[error("could not resolve path '{path}': {reason}")]
    Resolution { path: String, reason: String },

    /// JSON parsing failed (e.g. the configured source for an `InputJson` node).
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A node's `execute` returned or raised an error during a run.
    #[error("node '{node}' failed: {error}")]
    NodeFailure { node: String, error: String },

    /// Cooperative cancellation was observed. Never reported as `NodeFailure`.
    #[error("execution was cancelled")]
    Cancelled,
}

impl GraphError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    pub fn resolution(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn node_failure(node: impl Into<String>, error: impl Into<String>) -> Self {
        Self::NodeFailure {
            node: node.into(),
            error: error.into(),
        }
    }

    /// True iff this error is the cancellation sentinel, as opposed to a real failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GraphError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_failure_formats_with_node_name() {
        let err = GraphError::node_failure("set_variable", "boom");
        assert_eq!(err.to_string(), "node 'set_variable' failed: boom");
    }

    #[test]
    fn cancelled_is_recognised() {
        assert!(GraphError::Cancelled.is_cancelled());
        assert!(!GraphError::structural("cycle").is_cancelled());
    }
}
