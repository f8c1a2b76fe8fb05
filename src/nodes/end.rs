//! `End`: the canonical terminal node. One input, no outputs.

use crate::context::ExecutionContext;
use crate::datatype::DataType;
use crate::error::GraphError;
use crate::graph::Connector;
use crate::ids::{Direction, NodeId};
use crate::node::{impl_node_base_accessors, Node, NodeBase, NodeResult};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Consumes whatever reaches its single input and reports a terminal success — there is
/// no output port to activate (§4.2 exit point discovery relies on a node with no output
/// connectors).
#[derive(Debug, Clone)]
pub struct EndNode {
    base: NodeBase,
}

impl EndNode {
    pub fn new() -> Self {
        let id = NodeId::new();
        let input = Connector::new(id, Direction::Input, DataType::any());
        Self {
            base: NodeBase::new(id, vec![input], Vec::new()),
        }
    }
}

impl Default for EndNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for EndNode {
    impl_node_base_accessors!(EndNode);

    fn validate(&self) -> bool {
        self.base.inputs.len() == 1 && self.base.outputs.is_empty()
    }

    fn type_name(&self) -> &'static str {
        "End"
    }

    async fn execute(
        &self,
        _context: &mut ExecutionContext,
        _input_data: Option<Value>,
        _cancel: &CancellationToken,
    ) -> Result<NodeResult, GraphError> {
        Ok(NodeResult::terminal())
    }
}
