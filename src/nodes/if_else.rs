//! `IfElse`: the canonical conditional branch node (§4.7, §4.8). One input, two
//! outputs (`true_output` / `false_output`); exactly one is activated per run.

use crate::condition::{Combinator, ConditionRule, EvalTarget};
use crate::context::ExecutionContext;
use crate::datatype::DataType;
use crate::error::GraphError;
use crate::graph::Connector;
use crate::ids::{ConnectorId, Direction, NodeId};
use crate::node::{impl_node_base_accessors, Node, NodeBase, NodeResult};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Evaluates its rule list (combined with `combinator`) and activates `true_output` or
/// `false_output` accordingly. The evaluation target is `context[inputVariableName]` when
/// an input variable name is configured and present; otherwise it falls back to
/// `input_data` (treated as the JSON evaluation target; a missing payload resolves as
/// `Value::Null`). The chosen branch forwards `input_data` unchanged — `IfElse` routes,
/// it does not transform.
#[derive(Debug, Clone)]
pub struct IfElseNode {
    base: NodeBase,
    rules: Vec<ConditionRule>,
    combinator: Combinator,
    input_variable_name: Option<String>,
}

impl IfElseNode {
    pub fn new(rules: Vec<ConditionRule>, combinator: Combinator, input_variable_name: Option<String>) -> Self {
        let id = NodeId::new();
        let input = Connector::new(id, Direction::Input, DataType::any());
        let true_output = Connector::new(id, Direction::Output, DataType::any());
        let false_output = Connector::new(id, Direction::Output, DataType::any());
        Self {
            base: NodeBase::new(id, vec![input], vec![true_output, false_output]),
            rules,
            combinator,
            input_variable_name,
        }
    }

    pub fn true_output(&self) -> ConnectorId {
        self.base.outputs[0].id()
    }

    pub fn false_output(&self) -> ConnectorId {
        self.base.outputs[1].id()
    }
}

#[async_trait]
impl Node for IfElseNode {
    impl_node_base_accessors!(IfElseNode);

    fn validate(&self) -> bool {
        self.base.inputs.len() == 1 && self.base.outputs.len() == 2
    }

    fn type_name(&self) -> &'static str {
        "IfElse"
    }

    async fn execute(
        &self,
        context: &mut ExecutionContext,
        input_data: Option<Value>,
        _cancel: &CancellationToken,
    ) -> Result<NodeResult, GraphError> {
        let from_context = self
            .input_variable_name
            .as_deref()
            .and_then(|name| context.get_variable(name))
            .cloned();
        let value = from_context.or_else(|| input_data.clone()).unwrap_or(Value::Null);
        let taken = self.combinator.evaluate(&self.rules, EvalTarget::Json(&value));
        let output = if taken { self.true_output() } else { self.false_output() };
        Ok(NodeResult::success(output, input_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::NumericOp;
    use serde_json::json;

    #[tokio::test]
    async fn true_branch_activates_true_output() {
        let node = IfElseNode::new(
            vec![ConditionRule::numeric("count", NumericOp::Gt, 5.0)],
            Combinator::And,
            None,
        );
        let mut ctx = ExecutionContext::new();
        let token = CancellationToken::new();
        let result = node
            .execute(&mut ctx, Some(json!({"count": 10})), &token)
            .await
            .unwrap();
        assert_eq!(result.activated_output(), Some(node.true_output()));
    }

    #[tokio::test]
    async fn false_branch_activates_false_output() {
        let node = IfElseNode::new(
            vec![ConditionRule::numeric("count", NumericOp::Gt, 5.0)],
            Combinator::And,
            None,
        );
        let mut ctx = ExecutionContext::new();
        let token = CancellationToken::new();
        let result = node
            .execute(&mut ctx, Some(json!({"count": 1})), &token)
            .await
            .unwrap();
        assert_eq!(result.activated_output(), Some(node.false_output()));
    }

    #[tokio::test]
    async fn missing_input_resolves_as_null_and_takes_false_branch() {
        let node = IfElseNode::new(
            vec![ConditionRule::numeric("count", NumericOp::Gt, 5.0)],
            Combinator::And,
            None,
        );
        let mut ctx = ExecutionContext::new();
        let token = CancellationToken::new();
        let result = node.execute(&mut ctx, None, &token).await.unwrap();
        assert_eq!(result.activated_output(), Some(node.false_output()));
    }

    #[tokio::test]
    async fn configured_input_variable_name_is_read_from_context_over_input_data() {
        let node = IfElseNode::new(
            vec![ConditionRule::numeric("count", NumericOp::Gt, 5.0)],
            Combinator::And,
            Some("myValue".to_string()),
        );
        let mut ctx = ExecutionContext::new();
        ctx.set_variable("myValue", json!({"count": 10}));
        let token = CancellationToken::new();
        // input_data disagrees with the context variable; the variable wins.
        let result = node
            .execute(&mut ctx, Some(json!({"count": 1})), &token)
            .await
            .unwrap();
        assert_eq!(result.activated_output(), Some(node.true_output()));
    }

    #[tokio::test]
    async fn missing_context_variable_falls_back_to_input_data() {
        let node = IfElseNode::new(
            vec![ConditionRule::numeric("count", NumericOp::Gt, 5.0)],
            Combinator::And,
            Some("notSet".to_string()),
        );
        let mut ctx = ExecutionContext::new();
        let token = CancellationToken::new();
        let result = node
            .execute(&mut ctx, Some(json!({"count": 10})), &token)
            .await
            .unwrap();
        assert_eq!(result.activated_output(), Some(node.true_output()));
    }
}
