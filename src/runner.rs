//! Drives a single run of a graph from its entry node to completion (§4.6).
//!
//! ```text
//!  WorkflowStarted
//!        │
//!        ▼
//!  ┌─────────────┐   success, output activated   ┌─────────────┐
//!  │ NodeStarting │ ──────────────────────────▶  │ next Node    │
//!  └─────────────┘                                └─────────────┘
//!        │ failure                                       │ no output (terminal)
//!        ▼                                                ▼
//!  NodeFailed ──▶ WorkflowFailed                   WorkflowCompleted
//! ```
//!
//! Cancellation is checked before every node dispatch; observing it emits
//! `WorkflowCancelled` and stops the run without visiting further nodes.

use crate::context::{ExecutionContext, RunStatus};
use crate::error::{GraphError, Result};
use crate::executor::NodeExecutor;
use crate::graph::Graph;
use crate::ids::{ConnectorId, ExecutionId, NodeId};
use crate::traversal::topological_sort;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// How the runner decides which nodes to visit after the entry node (§9 open question 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchMode {
    /// Visit only nodes reachable by following *actually activated* outputs — the
    /// branch an `IfElse` does not take is never executed.
    RouteOnly,
    /// Visit every node in the start node's weakly-connected component, in topological
    /// order, regardless of whether any upstream connection activated it. Nodes with no
    /// activated upstream input still execute, with `input_data` of `None`. Useful for a
    /// full dry-run pass that exercises every node's validation/default path.
    ScheduleAll,
}

/// Tunable behaviour for a [`WorkflowRunner`]; see §9 for the open questions this
/// resolves.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    pub branch_mode: BranchMode,
    /// When `true`, connector type compatibility is required to be an exact name match
    /// (no symmetric-assignability fallback); reserved for callers that pre-validate
    /// graphs more strictly than [`crate::datatype::DataType::compatible`]'s permissive
    /// default. The runner itself does not re-check connector types (that happens once,
    /// at `Graph::add_connection` time) — this flag only governs whether
    /// `Graph::validate` was expected to have been run under strict mode before the
    /// graph reached this runner.
    pub strict_type_compatibility: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            branch_mode: BranchMode::ScheduleAll,
            strict_type_compatibility: false,
        }
    }
}

/// The seven lifecycle events a run emits, in the order §4.6 documents. Every variant
/// carries the wall-clock instant it was emitted, for downstream log correlation.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    WorkflowStarted { execution_id: ExecutionId, at: DateTime<Utc> },
    NodeStarting { execution_id: ExecutionId, node: NodeId, type_name: &'static str, at: DateTime<Utc> },
    NodeCompleted { execution_id: ExecutionId, node: NodeId, at: DateTime<Utc> },
    NodeFailed { execution_id: ExecutionId, node: NodeId, error: String, at: DateTime<Utc> },
    WorkflowFailed { execution_id: ExecutionId, error: String, at: DateTime<Utc> },
    WorkflowCompleted { execution_id: ExecutionId, at: DateTime<Utc> },
    WorkflowCancelled { execution_id: ExecutionId, at: DateTime<Utc> },
}

/// Looks up the first input connector on `node` whose single upstream connection's
/// source output is present (with data) in `activated`, cloning its value. Mirrors "the
/// node decides how to combine multiple inputs" — the runner only ever forwards a single
/// payload, picking the first input connector (in declaration order) that has one.
fn resolve_input_data(
    graph: &Graph,
    node_id: NodeId,
    activated: &HashMap<ConnectorId, Value>,
) -> Option<Value> {
    let node = graph.get_node(node_id)?;
    for input in node.inputs() {
        if let Some(connection_id) = input.connections().first() {
            if let Some(connection) = graph.get_connection(*connection_id) {
                let (_, source_connector) = connection.source();
                if let Some(value) = activated.get(&source_connector) {
                    return Some(value.clone());
                }
            }
        }
    }
    None
}

/// Executes graphs under a fixed [`RunnerConfig`]. Stateless beyond its configuration;
/// a single instance can drive any number of independent runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowRunner {
    config: RunnerConfig,
    executor: NodeExecutor,
}

impl WorkflowRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config, executor: NodeExecutor::new() }
    }

    pub fn config(&self) -> RunnerConfig {
        self.config
    }

    /// Runs the graph starting at `start`, invoking `on_event` for every lifecycle event
    /// as it happens. Returns `Ok(())` on `WorkflowCompleted`, `Err(GraphError::Cancelled)`
    /// on `WorkflowCancelled`, and `Err(GraphError::NodeFailure)` on `WorkflowFailed`.
    #[instrument(skip(self, graph, context, cancel, on_event), fields(execution_id = %context.execution_id()))]
    pub async fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        context: &mut ExecutionContext,
        cancel: &CancellationToken,
        mut on_event: impl FnMut(WorkflowEvent),
    ) -> Result<()> {
        let execution_id = context.execution_id();

        if graph.get_node(start).is_none() {
            return Err(GraphError::invalid_argument(format!("start node {start} is not present in the graph")));
        }

        // A cancellation signalled before dispatch never fires `WorkflowStarted` (§4.6
        // step 1) — the run is cancelled, not started-then-cancelled.
        if cancel.is_cancelled() {
            context.set_status(RunStatus::Cancelled)?;
            warn!("workflow cancelled before start");
            on_event(WorkflowEvent::WorkflowCancelled { execution_id, at: Utc::now() });
            return Err(GraphError::Cancelled);
        }

        context.set_status(RunStatus::Running)?;
        info!("workflow started");
        on_event(WorkflowEvent::WorkflowStarted { execution_id, at: Utc::now() });

        let result = match self.config.branch_mode {
            BranchMode::RouteOnly => self.run_route_only(graph, start, context, cancel, &mut on_event).await,
            BranchMode::ScheduleAll => self.run_schedule_all(graph, start, context, cancel, &mut on_event).await,
        };

        match result {
            Ok(()) => {
                context.set_status(RunStatus::Completed)?;
                info!("workflow completed");
                on_event(WorkflowEvent::WorkflowCompleted { execution_id, at: Utc::now() });
                Ok(())
            }
            Err(GraphError::Cancelled) => {
                context.set_status(RunStatus::Cancelled)?;
                warn!("workflow cancelled");
                on_event(WorkflowEvent::WorkflowCancelled { execution_id, at: Utc::now() });
                Err(GraphError::Cancelled)
            }
            Err(e) => {
                context.set_status(RunStatus::Failed)?;
                warn!(error = %e, "workflow failed");
                on_event(WorkflowEvent::WorkflowFailed { execution_id, error: e.to_string(), at: Utc::now() });
                Err(e)
            }
        }
    }

    async fn run_route_only(
        &self,
        graph: &Graph,
        start: NodeId,
        context: &mut ExecutionContext,
        cancel: &CancellationToken,
        on_event: &mut impl FnMut(WorkflowEvent),
    ) -> Result<()> {
        let execution_id = context.execution_id();
        let mut queue: VecDeque<(NodeId, Option<Value>)> = VecDeque::new();
        let mut executed = HashSet::new();
        queue.push_back((start, None));

        while let Some((node_id, input_data)) = queue.pop_front() {
            if !executed.insert(node_id) {
                continue;
            }
            if cancel.is_cancelled() {
                return Err(GraphError::Cancelled);
            }
            let Some(node) = graph.get_node(node_id) else {
                continue;
            };

            on_event(WorkflowEvent::NodeStarting { execution_id, node: node_id, type_name: node.type_name(), at: Utc::now() });
            let result = self.executor.run(node.as_ref(), context, input_data, cancel).await?;
            if cancel.is_cancelled() {
                return Err(GraphError::Cancelled);
            }

            if !result.is_success() {
                let error = result.error().unwrap_or("unknown failure").to_string();
                on_event(WorkflowEvent::NodeFailed { execution_id, node: node_id, error: error.clone(), at: Utc::now() });
                return Err(GraphError::node_failure(node.type_name(), error));
            }
            on_event(WorkflowEvent::NodeCompleted { execution_id, node: node_id, at: Utc::now() });

            let Some(activated) = result.activated_output() else {
                continue;
            };
            let Some(output_connector) = node.outputs().iter().find(|c| c.id() == activated) else {
                continue;
            };
            let data = result.output_data().cloned();
            for connection_id in output_connector.connections() {
                if let Some(connection) = graph.get_connection(*connection_id) {
                    let (target_node, _) = connection.target();
                    queue.push_back((target_node, data.clone()));
                }
            }
        }
        Ok(())
    }

    async fn run_schedule_all(
        &self,
        graph: &Graph,
        start: NodeId,
        context: &mut ExecutionContext,
        cancel: &CancellationToken,
        on_event: &mut impl FnMut(WorkflowEvent),
    ) -> Result<()> {
        let execution_id = context.execution_id();
        let order = topological_sort(graph, start)?;
        let mut activated: HashMap<ConnectorId, Value> = HashMap::new();

        for node_id in order {
            if cancel.is_cancelled() {
                return Err(GraphError::Cancelled);
            }
            let Some(node) = graph.get_node(node_id) else {
                continue;
            };
            let input_data = resolve_input_data(graph, node_id, &activated);

            on_event(WorkflowEvent::NodeStarting { execution_id, node: node_id, type_name: node.type_name(), at: Utc::now() });
            let result = self.executor.run(node.as_ref(), context, input_data, cancel).await?;
            if cancel.is_cancelled() {
                return Err(GraphError::Cancelled);
            }

            if !result.is_success() {
                let error = result.error().unwrap_or("unknown failure").to_string();
                on_event(WorkflowEvent::NodeFailed { execution_id, node: node_id, error: error.clone(), at: Utc::now() });
                return Err(GraphError::node_failure(node.type_name(), error));
            }
            on_event(WorkflowEvent::NodeCompleted { execution_id, node: node_id, at: Utc::now() });

            if let Some(output_id) = result.activated_output() {
                if let Some(data) = result.output_data() {
                    activated.insert(output_id, data.clone());
                }
            }
        }
        Ok(())
    }
}
