//! # graphflow - Directed-Graph Workflow Execution Engine
//!
//! A graph of typed nodes and ports, wired by directed connections, executed
//! asynchronously from a single entry point to completion, failure or cancellation.
//!
//! ## Core concepts
//!
//! - **Node** ([`node::Node`]) — a unit of async work with zero or more typed input
//!   connectors and zero or more typed output connectors.
//! - **Connector** ([`graph::Connector`]) — a typed attachment point on a node; inputs
//!   accept at most one connection each (fan-in ≤ 1), outputs may fan out freely.
//! - **Connection** ([`graph::Connection`]) — a directed edge from one node's output
//!   connector to another node's input connector.
//! - **Graph** ([`graph::Graph`]) — owns every node and connection by stable id
//!   ([`ids`]), enforcing type compatibility, fan-in and acyclicity on every insert.
//! - **ExecutionContext** ([`context::ExecutionContext`]) — the mutable variable store
//!   and run-status tracker scoped to a single run.
//! - **WorkflowRunner** ([`runner::WorkflowRunner`]) — drives one run from an entry
//!   node, dispatching nodes, routing activated outputs to downstream inputs, and
//!   emitting [`runner::WorkflowEvent`]s at each lifecycle step.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────┐   output   connection   input   ┌─────────┐
//!   │ Node A  │──────●───────────────────●───────│ Node B  │
//!   └─────────┘                                   └─────────┘
//!        ▲                                              │
//!        │                                              ▼
//!   WorkflowRunner::run ── dispatches ── NodeExecutor::run ── Node::execute
//!        │
//!        ▼
//!   WorkflowEvent { Started, NodeStarting, NodeCompleted, NodeFailed,
//!                   Failed, Completed, Cancelled }
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use graphflow::context::ExecutionContext;
//! use graphflow::graph::Graph;
//! use graphflow::nodes::{EndNode, StartNode};
//! use graphflow::runner::{RunnerConfig, WorkflowRunner};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> graphflow::error::Result<()> {
//!     let mut graph = Graph::new();
//!     let start = StartNode::new();
//!     let (start_id, start_out) = (start.id(), start.outputs()[0].id());
//!     graph.add_node(Box::new(start));
//!
//!     let end = EndNode::new();
//!     let (end_id, end_in) = (end.id(), end.inputs()[0].id());
//!     graph.add_node(Box::new(end));
//!
//!     graph.add_connection((start_id, start_out), (end_id, end_in));
//!
//!     let runner = WorkflowRunner::new(RunnerConfig::default());
//!     let mut context = ExecutionContext::new();
//!     let cancel = CancellationToken::new();
//!     runner.run(&graph, start_id, &mut context, &cancel, |_event| {}).await
//! }
//! ```
//!
//! ## Module organisation
//!
//! - [`ids`] — stable UUID-backed identifiers for nodes, connectors, connections and runs
//! - [`datatype`] — connector type tags and the assignability relation between them
//! - [`error`] — the crate's error taxonomy
//! - [`node`] — the `Node` trait, `NodeResult`, and shared node bookkeeping
//! - [`graph`] — connectors, connections, and the `Graph` aggregate
//! - [`context`] — per-run variable store and status tracking
//! - [`condition`] — property-path resolution and condition rule evaluation
//! - [`traversal`] — walks, shortest path, entry/exit discovery, topological sort
//! - [`nodes`] — the canonical node vocabulary (`Start`, `End`, `Merge`, ...)
//! - [`catalog`] — node-type registry for instantiation by name
//! - [`executor`] — wraps a single node execution, normalising errors
//! - [`runner`] — drives a full run and emits lifecycle events

pub mod catalog;
pub mod condition;
pub mod context;
pub mod datatype;
pub mod error;
pub mod executor;
pub mod graph;
pub mod ids;
pub mod node;
pub mod nodes;
pub mod runner;
pub mod traversal;

pub use catalog::{NodeCatalog, NodeFactory, NodeMetadata};
pub use condition::{Combinator, ConditionRule, EvalTarget, NumericOp, PropertyPathResolver, StringOp};
pub use context::{ExecutionContext, RunStatus};
pub use datatype::{DataType, TypeRegistry};
pub use error::{GraphError, Result};
pub use executor::NodeExecutor;
pub use graph::{Connection, Connector, Graph};
pub use ids::{ConnectionId, ConnectorId, Direction, ExecutionId, NodeId};
pub use node::{Node, NodeBase, NodeResult};
pub use runner::{BranchMode, RunnerConfig, WorkflowEvent, WorkflowRunner};
