//! `Merge`: joins two distinct upstream branches into one output, a fixed-arity node
//! whose `validate` overrides the default permissive shape check (§4.8).

use crate::context::ExecutionContext;
use crate::datatype::DataType;
use crate::error::GraphError;
use crate::graph::Connector;
use crate::ids::{Direction, NodeId};
use crate::node::{impl_node_base_accessors, Node, NodeBase, NodeResult};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Exactly two input connectors, one output. Whichever branch actually activates this
/// node's execution forwards its payload unchanged — `Merge` does not combine the two
/// inputs' data, since only one of them produced the payload that triggered this run
/// (fan-in ≤ 1 means at most one of the two inputs is ever the *source* of a given
/// invocation's `input_data`).
#[derive(Debug, Clone)]
pub struct MergeNode {
    base: NodeBase,
}

impl MergeNode {
    pub fn new() -> Self {
        let id = NodeId::new();
        let input_a = Connector::new(id, Direction::Input, DataType::any());
        let input_b = Connector::new(id, Direction::Input, DataType::any());
        let output = Connector::new(id, Direction::Output, DataType::any());
        Self {
            base: NodeBase::new(id, vec![input_a, input_b], vec![output]),
        }
    }
}

impl Default for MergeNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for MergeNode {
    impl_node_base_accessors!(MergeNode);

    fn validate(&self) -> bool {
        self.base.inputs.len() == 2 && self.base.outputs.len() == 1
    }

    fn type_name(&self) -> &'static str {
        "Merge"
    }

    async fn execute(
        &self,
        _context: &mut ExecutionContext,
        input_data: Option<Value>,
        _cancel: &CancellationToken,
    ) -> Result<NodeResult, GraphError> {
        let output = self.base.outputs[0].id();
        Ok(NodeResult::success(output, input_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_wrong_input_count() {
        let mut node = MergeNode::new();
        assert!(node.validate());
        node.base.inputs.pop();
        assert!(!node.validate());
    }

    #[tokio::test]
    async fn merge_forwards_input_unchanged() {
        let node = MergeNode::new();
        let mut ctx = ExecutionContext::new();
        let token = CancellationToken::new();
        let result = node
            .execute(&mut ctx, Some(serde_json::json!("hi")), &token)
            .await
            .unwrap();
        assert_eq!(result.output_data(), Some(&serde_json::json!("hi")));
        assert_eq!(result.activated_output(), Some(node.outputs()[0].id()));
    }
}
