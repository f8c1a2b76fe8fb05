//! `InputJson`: parses a configured JSON source string and forwards the parsed value
//! (§4.8). No input connector — this is an entry-capable node alongside `Start`.

use crate::context::ExecutionContext;
use crate::datatype::DataType;
use crate::error::GraphError;
use crate::graph::Connector;
use crate::ids::{Direction, NodeId};
use crate::node::{impl_node_base_accessors, Node, NodeBase, NodeResult};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Holds the raw JSON text configured on this node. Parse failure (including an empty
/// source) is a domain-expected failure, reported as `NodeResult::failure` directly
/// rather than propagated as a `GraphError` (§4.4: "any exception... becomes
/// NodeResult.Failed").
#[derive(Debug, Clone)]
pub struct InputJsonNode {
    base: NodeBase,
    source: String,
}

impl InputJsonNode {
    pub fn new(source: impl Into<String>) -> Self {
        let id = NodeId::new();
        let output = Connector::new(id, Direction::Output, DataType::any());
        Self {
            base: NodeBase::new(id, Vec::new(), vec![output]),
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[async_trait]
impl Node for InputJsonNode {
    impl_node_base_accessors!(InputJsonNode);

    fn validate(&self) -> bool {
        self.base.inputs.is_empty() && self.base.outputs.len() == 1
    }

    fn type_name(&self) -> &'static str {
        "InputJson"
    }

    async fn execute(
        &self,
        _context: &mut ExecutionContext,
        _input_data: Option<Value>,
        _cancel: &CancellationToken,
    ) -> Result<NodeResult, GraphError> {
        if self.source.trim().is_empty() {
            return Ok(NodeResult::failure("empty JSON source"));
        }
        match serde_json::from_str::<Value>(&self.source) {
            Ok(value) => {
                let output = self.base.outputs[0].id();
                Ok(NodeResult::success(output, Some(value)))
            }
            Err(e) => Ok(NodeResult::failure(format!("invalid JSON source: {e}"))),
        }
    }
}
