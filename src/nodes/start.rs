//! `Start`: the canonical entry node. No inputs, one output, always succeeds.

use crate::context::ExecutionContext;
use crate::datatype::DataType;
use crate::error::GraphError;
use crate::graph::Connector;
use crate::ids::{Direction, NodeId};
use crate::node::{impl_node_base_accessors, Node, NodeBase, NodeResult};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Activates its single output unconditionally; used as the unique entry point a run
/// begins from (§4.2 entry point discovery relies on a node with no input connectors).
#[derive(Debug, Clone)]
pub struct StartNode {
    base: NodeBase,
}

impl StartNode {
    pub fn new() -> Self {
        let id = NodeId::new();
        let output = Connector::new(id, Direction::Output, DataType::any());
        Self {
            base: NodeBase::new(id, Vec::new(), vec![output]),
        }
    }
}

impl Default for StartNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for StartNode {
    impl_node_base_accessors!(StartNode);

    fn validate(&self) -> bool {
        self.base.inputs.is_empty() && self.base.outputs.len() == 1
    }

    fn type_name(&self) -> &'static str {
        "Start"
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

    #[tokio::test]
    async fn start_activates_its_only_output() {
        let node = StartNode::new();
        let mut ctx = ExecutionContext::new();
        let token = CancellationToken::new();
        let result = node.execute(&mut ctx, None, &token).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.activated_output(), Some(node.outputs()[0].id()));
    }

    #[test]
    fn validate_requires_no_inputs_and_one_output() {
        assert!(StartNode::new().validate());
    }
}
