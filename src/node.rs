//! The node behavioural contract: `execute`, its result type, and the shared
//! [`NodeBase`] bookkeeping every canonical node embeds.

use crate::context::ExecutionContext;
use crate::error::GraphError;
use crate::graph::Connector;
use crate::ids::{ConnectorId, NodeId};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Immutable value returned from [`Node::execute`].
///
/// Construction is funnelled through [`NodeResult::success`] / [`NodeResult::failure`] /
/// [`NodeResult::terminal`] so the invariants in §3 ("failure ⇒ no activated output, no
/// output data; success ⇒ no error; `outputData` without `activatedOutput` is rejected")
/// hold for every value that escapes this module.
#[derive(Debug, Clone)]
pub struct NodeResult {
    success: bool,
    error: Option<String>,
    activated_output: Option<ConnectorId>,
    output_data: Option<Value>,
}

impl NodeResult {
    /// A successful result that activates `output` and forwards `data` downstream.
    pub fn success(output: ConnectorId, data: Option<Value>) -> Self {
        Self {
            success: true,
            error: None,
            activated_output: Some(output),
            output_data: data,
        }
    }

    /// A successful, terminal result (no output port to activate) — e.g. `End`.
    pub fn terminal() -> Self {
        Self {
            success: true,
            error: None,
            activated_output: None,
            output_data: None,
        }
    }

    /// A failed result carrying a descriptive error.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            activated_output: None,
            output_data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn activated_output(&self) -> Option<ConnectorId> {
        self.activated_output
    }

    pub fn output_data(&self) -> Option<&Value> {
        self.output_data.as_ref()
    }

    pub fn into_output_data(self) -> Option<Value> {
        self.output_data
    }
}

/// Shared structural state every canonical node embeds: identity, editor-round-trip
/// coordinates, and the two ordered connector collections.
///
/// A fresh [`NodeId`] must be generated *before* connectors are built, since each
/// [`Connector::new`] records its owning node id; [`NodeBase::new`] therefore takes the
/// id plus already-constructed connector lists rather than generating it internally.
#[derive(Debug, Clone)]
pub struct NodeBase {
    pub id: NodeId,
    pub position: (f64, f64),
    pub inputs: Vec<Connector>,
    pub outputs: Vec<Connector>,
}

impl NodeBase {
    pub fn new(id: NodeId, inputs: Vec<Connector>, outputs: Vec<Connector>) -> Self {
        Self {
            id,
            position: (0.0, 0.0),
            inputs,
            outputs,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = (x, y);
        self
    }
}

/// Helper for retrieving the current value of a single-valued input/output connector,
/// used by canonical nodes that expect exactly one port of a given direction.
pub fn single_connector_id(connectors: &[Connector]) -> Option<ConnectorId> {
    match connectors {
        [only] => Some(only.id()),
        _ => None,
    }
}

/// Implements the structural accessor methods of [`Node`] by delegating to a `base:
/// NodeBase` field. Every canonical node type in [`crate::nodes`] uses this instead of
/// re-typing four near-identical methods per type.
macro_rules! impl_node_base_accessors {
    ($ty:ty) => {
        fn id(&self) -> $crate::ids::NodeId {
            self.base.id
        }

        fn position(&self) -> (f64, f64) {
            self.base.position
        }

        fn inputs(&self) -> &[$crate::graph::Connector] {
            &self.base.inputs
        }

        fn inputs_mut(&mut self) -> &mut Vec<$crate::graph::Connector> {
            &mut self.base.inputs
        }

        fn outputs(&self) -> &[$crate::graph::Connector] {
            &self.base.outputs
        }

        fn outputs_mut(&mut self) -> &mut Vec<$crate::graph::Connector> {
            &mut self.base.outputs
        }
    };
}
pub(crate) use impl_node_base_accessors;

/// The behavioural + structural contract every graph node implements (§3, §4.4).
///
/// `execute` is the node's unit of work: it reads `input_data` (the upstream node's
/// forwarded payload, or `None` for entry nodes), may read/write `context` variables, and
/// must cooperatively observe `cancel`. It must not mutate the graph's structure.
#[async_trait]
pub trait Node: Send + Sync {
    fn id(&self) -> NodeId;

    /// Editor/UI round-trip coordinates; not otherwise interpreted by the engine.
    fn position(&self) -> (f64, f64);

    fn inputs(&self) -> &[Connector];
    fn inputs_mut(&mut self) -> &mut Vec<Connector>;
    fn outputs(&self) -> &[Connector];
    fn outputs_mut(&mut self) -> &mut Vec<Connector>;

    /// Self-check invoked by `Graph::validate`. Default accepts any port shape; nodes
    /// with a fixed arity (e.g. `Merge` requiring exactly two inputs) override this.
    fn validate(&self) -> bool {
        true
    }

    /// A short human-readable type name, used in node-catalog registration and in
    /// `NodeFailure` error messages.
    fn type_name(&self) -> &'static str;

    async fn execute(
        &self,
        context: &mut ExecutionContext,
        input_data: Option<Value>,
        cancel: &CancellationToken,
    ) -> Result<NodeResult, GraphError>;
}
