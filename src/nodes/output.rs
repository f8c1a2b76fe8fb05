//! `Output`: captures whatever reaches it into the run's [`ExecutionContext`] under a
//! configured variable name (§4.8). One input, no outputs.

use crate::context::ExecutionContext;
use crate::datatype::DataType;
use crate::error::GraphError;
use crate::graph::Connector;
use crate::ids::{Direction, NodeId};
use crate::node::{impl_node_base_accessors, Node, NodeBase, NodeResult};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct OutputNode {
    base: NodeBase,
    variable_name: String,
}

impl OutputNode {
    pub fn new(variable_name: impl Into<String>) -> Self {
        let id = NodeId::new();
        let input = Connector::new(id, Direction::Input, DataType::any());
        Self {
            base: NodeBase::new(id, vec![input], Vec::new()),
            variable_name: variable_name.into(),
        }
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }
}

#[async_trait]
impl Node for OutputNode {
    impl_node_base_accessors!(OutputNode);

    fn validate(&self) -> bool {
        self.base.inputs.len() == 1
            && self.base.outputs.is_empty()
            && !self.variable_name.trim().is_empty()
    }

    fn type_name(&self) -> &'static str {
        "Output"
    }

    async fn execute(
        &self,
        context: &mut ExecutionContext,
        input_data: Option<Value>,
        _cancel: &CancellationToken,
    ) -> Result<NodeResult, GraphError> {
        context.set_variable(self.variable_name.clone(), input_data.unwrap_or(Value::Null));
        Ok(NodeResult::terminal())
    }
}
