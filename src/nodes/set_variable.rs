//! `SetVariable`: writes a fixed value into the run's [`ExecutionContext`] and forwards
//! its input unchanged (§4.8).

use crate::context::ExecutionContext;
use crate::datatype::DataType;
use crate::error::GraphError;
use crate::graph::Connector;
use crate::ids::{Direction, NodeId};
use crate::node::{impl_node_base_accessors, Node, NodeBase, NodeResult};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Stores `value` under `name` in the context on every execution, regardless of what
/// `input_data` carries, then passes `input_data` through to its single output.
#[derive(Debug, Clone)]
pub struct SetVariableNode {
    base: NodeBase,
    name: String,
    value: Value,
}

impl SetVariableNode {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        let id = NodeId::new();
        let input = Connector::new(id, Direction::Input, DataType::any());
        let output = Connector::new(id, Direction::Output, DataType::any());
        Self {
            base: NodeBase::new(id, vec![input], vec![output]),
            name: name.into(),
            value,
        }
    }

    pub fn variable_name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[async_trait]
impl Node for SetVariableNode {
    impl_node_base_accessors!(SetVariableNode);

    fn validate(&self) -> bool {
        self.base.inputs.len() == 1 && self.base.outputs.len() == 1 && !self.name.trim().is_empty()
    }

    fn type_name(&self) -> &'static str {
        "SetVariable"
    }

    async fn execute(
        &self,
        context: &mut ExecutionContext,
        input_data: Option<Value>,
        _cancel: &CancellationToken,
    ) -> Result<NodeResult, GraphError> {
        context.set_variable(self.name.clone(), self.value.clone());
        let output = self.base.outputs[0].id();
        Ok(NodeResult::success(output, input_data))
    }
}
