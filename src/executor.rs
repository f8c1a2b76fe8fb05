//! Wraps a single [`Node::execute`] call, converting an `Err` into a failed
//! [`NodeResult`] unless cancellation was observed (§4.4, §4.10).
//!
//! This is the Rust equivalent of "any exception thrown by a node's work becomes
//! `NodeResult.Failed`": a node is free to return `Err` from `execute` for conditions it
//! didn't anticipate, and [`NodeExecutor::run`] normalises that into the same
//! `NodeResult` shape a node's own `NodeResult::failure` would produce, so
//! [`crate::runner::WorkflowRunner`] only ever has one result type to dispatch on.
//! `GraphError::Cancelled` is the one exception: it is re-raised unchanged so the
//! runner's cancellation path can observe it.

use crate::context::ExecutionContext;
use crate::error::{GraphError, Result};
use crate::node::{Node, NodeResult};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Stateless wrapper; a unit struct rather than a trait since there is exactly one
/// execution policy in this engine (§9 resolves the "canonical executor" open question
/// this way — see the design notes for the considered alternatives).
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeExecutor;

impl NodeExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Runs `node.execute(..)`. An `Ok` result (success or failure) passes straight
    /// through. An `Err` is converted to `NodeResult::failure` unless it is
    /// `GraphError::Cancelled`, which propagates unchanged.
    pub async fn run(
        &self,
        node: &dyn Node,
        context: &mut ExecutionContext,
        input_data: Option<Value>,
        cancel: &CancellationToken,
    ) -> Result<NodeResult> {
        match node.execute(context, input_data, cancel).await {
            Ok(result) => Ok(result),
            Err(GraphError::Cancelled) => Err(GraphError::Cancelled),
            Err(e) => {
                warn!(node = node.type_name(), error = %e, "node execution raised an error");
                Ok(NodeResult::failure(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::InputJsonNode;

    #[tokio::test]
    async fn ok_result_passes_through_unchanged() {
        let node = InputJsonNode::new(r#"{"a":1}"#);
        let mut ctx = ExecutionContext::new();
        let token = CancellationToken::new();
        let result = NodeExecutor::new().run(&node, &mut ctx, None, &token).await.unwrap();
        assert!(result.is_success());
    }
}
