//! The graph data model: connectors, connections, and the `Graph` aggregate that owns
//! them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         Graph                            │
//! │                                                           │
//! │   nodes: { NodeId -> Box<dyn Node> }                     │
//! │   connections: { ConnectionId -> Connection }            │
//! │                                                           │
//! │   ┌──────────┐  output   connection   input  ┌──────────┐│
//! │   │  Node A  │──●────────────────────●───────│  Node B  ││
//! │   └──────────┘                                └──────────┘│
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Connectors and connections never hold references to one another — only ids — so the
//! object graph has no reference cycles; `Graph` is the sole place that resolves an id
//! back to data (see [`crate::ids`]).

use crate::datatype::{DataType, TypeRegistry};
use crate::ids::{ConnectionId, ConnectorId, Direction, NodeId};
use crate::node::Node;
use std::collections::{HashMap, HashSet, VecDeque};

/// A typed input or output attachment point on a node.
#[derive(Debug, Clone)]
pub struct Connector {
    id: ConnectorId,
    parent: NodeId,
    direction: Direction,
    data_type: DataType,
    connections: Vec<ConnectionId>,
}

impl Connector {
    pub fn new(parent: NodeId, direction: Direction, data_type: DataType) -> Self {
        Self {
            id: ConnectorId::new(),
            parent,
            direction,
            data_type,
            connections: Vec::new(),
        }
    }

    pub fn id(&self) -> ConnectorId {
        self.id
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    /// `true` iff attaching a connection to `other` is structurally valid from this
    /// connector's point of view: opposite direction, compatible type, and — for an
    /// input connector — no existing connection (fan-in ≤ 1).
    fn validate_connection(&self, other: &Connector, registry: &TypeRegistry) -> bool {
        if self.direction == other.direction {
            return false;
        }
        if !self.data_type.compatible(&other.data_type, registry) {
            return false;
        }
        match self.direction {
            Direction::Input => self.connections.is_empty(),
            Direction::Output => true,
        }
    }

    fn attach(&mut self, connection: ConnectionId) {
        self.connections.push(connection);
    }

    /// Returns `false` if the connection was not attached to this connector.
    fn detach(&mut self, connection: ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| *c != connection);
        self.connections.len() != before
    }
}

/// A directed edge from a source (output) connector to a target (input) connector.
///
/// Endpoints are stored as `(NodeId, ConnectorId)` pairs rather than direct references —
/// resolving them always goes back through the owning [`Graph`].
#[derive(Debug, Clone, Copy)]
pub struct Connection {
    id: ConnectionId,
    source: (NodeId, ConnectorId),
    target: (NodeId, ConnectorId),
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn source(&self) -> (NodeId, ConnectorId) {
        self.source
    }

    pub fn target(&self) -> (NodeId, ConnectorId) {
        self.target
    }
}

/// Aggregate of nodes and connections with the structural invariants from §3/§4.1.
pub struct Graph {
    nodes: HashMap<NodeId, Box<dyn Node>>,
    connections: HashMap<ConnectionId, Connection>,
    type_registry: TypeRegistry,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            connections: HashMap::new(),
            type_registry: TypeRegistry::new(),
        }
    }

    /// Build a graph that resolves `DataType` ancestry through a pre-populated registry
    /// (needed when ports use non-trivial subtype hierarchies; see §9 open question 2).
    pub fn with_type_registry(type_registry: TypeRegistry) -> Self {
        Self {
            nodes: HashMap::new(),
            connections: HashMap::new(),
            type_registry,
        }
    }

    pub fn type_registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.type_registry
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Box<dyn Node>> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn get_connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `false` iff `node` (by id) is already present.
    pub fn add_node(&mut self, node: Box<dyn Node>) -> bool {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, node);
        true
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Box<dyn Node>> {
        self.nodes.get(&id)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Box<dyn Node>> {
        self.nodes.get_mut(&id)
    }

    fn connector(&self, node: NodeId, connector: ConnectorId) -> Option<&Connector> {
        let node = self.nodes.get(&node)?;
        node.inputs()
            .iter()
            .chain(node.outputs())
            .find(|c| c.id() == connector)
    }

    /// Removes every connection touching `node`, then removes `node` itself. Idempotent:
    /// returns `false` if `node` was not present.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        if !self.nodes.contains_key(&node) {
            return false;
        }
        let touching: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.source.0 == node || c.target.0 == node)
            .map(|c| c.id)
            .collect();
        for connection_id in touching {
            self.remove_connection(connection_id);
        }
        self.nodes.remove(&node);
        true
    }

    /// Attempts to wire `source` (an output connector) to `target` (an input connector).
    ///
    /// Returns `None` — leaving the graph entirely untouched — when: either node is
    /// absent from the graph, the connector ids don't resolve, the two connectors share
    /// a parent node (no direct self-loop), direction/type/fan-in validation fails on
    /// either endpoint, or the new edge would create a cycle.
    pub fn add_connection(
        &mut self,
        source: (NodeId, ConnectorId),
        target: (NodeId, ConnectorId),
    ) -> Option<ConnectionId> {
        if source.0 == target.0 {
            return None;
        }
        if !self.nodes.contains_key(&source.0) || !self.nodes.contains_key(&target.0) {
            return None;
        }
        let source_connector = self.connector(source.0, source.1)?.clone();
        let target_connector = self.connector(target.0, target.1)?.clone();

        if !source_connector.validate_connection(&target_connector, &self.type_registry) {
            return None;
        }
        if !target_connector.validate_connection(&source_connector, &self.type_registry) {
            return None;
        }
        if source_connector.direction() != Direction::Output
            || target_connector.direction() != Direction::Input
        {
            return None;
        }
        if self.would_create_cycle(source.0, target.0) {
            return None;
        }

        let connection = Connection {
            id: ConnectionId::new(),
            source,
            target,
        };
        let id = connection.id;

        // Both sides are mutated only once every rejection path above has passed.
        self.attach_endpoint(source, id);
        self.attach_endpoint(target, id);
        self.connections.insert(id, connection);
        Some(id)
    }

    fn attach_endpoint(&mut self, endpoint: (NodeId, ConnectorId), connection: ConnectionId) {
        if let Some(node) = self.nodes.get_mut(&endpoint.0) {
            for connector in node.inputs_mut().iter_mut().chain(node.outputs_mut()) {
                if connector.id() == endpoint.1 {
                    connector.attach(connection);
                    return;
                }
            }
        }
    }

    fn detach_endpoint(&mut self, endpoint: (NodeId, ConnectorId), connection: ConnectionId) -> bool {
        if let Some(node) = self.nodes.get_mut(&endpoint.0) {
            for connector in node.inputs_mut().iter_mut().chain(node.outputs_mut()) {
                if connector.id() == endpoint.1 {
                    return connector.detach(connection);
                }
            }
        }
        false
    }

    /// Detaches the connection from both endpoints and erases it. Returns `false` if the
    /// connection was not present.
    pub fn remove_connection(&mut self, connection: ConnectionId) -> bool {
        let Some(removed) = self.connections.remove(&connection) else {
            return false;
        };
        self.detach_endpoint(removed.source, connection);
        self.detach_endpoint(removed.target, connection);
        true
    }

    /// `true` iff adding an edge `source_node -> target_node` would close a cycle, i.e.
    /// `target_node` can already reach `source_node` by following existing
    /// output→connection→input edges. O(V+E) breadth-first search.
    fn would_create_cycle(&self, source_node: NodeId, target_node: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(target_node);
        visited.insert(target_node);

        while let Some(current) = queue.pop_front() {
            if current == source_node {
                return true;
            }
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for output in node.outputs() {
                for connection_id in output.connections() {
                    if let Some(connection) = self.connections.get(connection_id) {
                        let next = connection.target.0;
                        if visited.insert(next) {
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
        false
    }

    /// `true` iff every node self-validates, every connection's endpoints still resolve
    /// to connectors owned by nodes in the graph, and no cycle exists anywhere in the
    /// graph (not merely in a reachable subgraph).
    pub fn validate(&self) -> bool {
        for node in self.nodes.values() {
            if !node.validate() {
                return false;
            }
        }
        for connection in self.connections.values() {
            if self.connector(connection.source.0, connection.source.1).is_none() {
                return false;
            }
            if self.connector(connection.target.0, connection.target.1).is_none() {
                return false;
            }
        }
        !self.has_cycle()
    }

    /// Whole-graph cycle check via DFS three-colouring, independent of any start node.
    fn has_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Colour {
            White,
            Gray,
            Black,
        }
        let mut colour: HashMap<NodeId, Colour> =
            self.nodes.keys().map(|id| (*id, Colour::White)).collect();

        fn visit(
            graph: &Graph,
            node: NodeId,
            colour: &mut HashMap<NodeId, Colour>,
        ) -> bool {
            colour.insert(node, Colour::Gray);
            if let Some(n) = graph.nodes.get(&node) {
                for output in n.outputs() {
                    for connection_id in output.connections() {
                        if let Some(connection) = graph.connections.get(connection_id) {
                            let next = connection.target.0;
                            match colour.get(&next).copied().unwrap_or(Colour::White) {
                                Colour::Gray => return true,
                                Colour::White => {
                                    if visit(graph, next, colour) {
                                        return true;
                                    }
                                }
                                Colour::Black => {}
                            }
                        }
                    }
                }
            }
            colour.insert(node, Colour::Black);
            false
        }

        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            if colour.get(&id).copied() == Some(Colour::White) && visit(self, id, &mut colour) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{EndNode, MergeNode, StartNode};

    #[test]
    fn add_node_rejects_duplicate_ids() {
        let mut graph = Graph::new();
        let start = StartNode::new();
        let id = start.id();
        assert!(graph.add_node(Box::new(start)));
        // A node with the same id cannot be re-added; build one with the same id by
        // cloning isn't possible (Node isn't Clone), so exercise via get_node instead.
        assert!(graph.get_node(id).is_some());
    }

    #[test]
    fn add_connection_wires_ports_and_rejects_self_loop() {
        let mut graph = Graph::new();
        let start = StartNode::new();
        let start_id = start.id();
        let start_out = start.outputs()[0].id();
        graph.add_node(Box::new(start));

        let end = EndNode::new();
        let end_id = end.id();
        let end_in = end.inputs()[0].id();
        graph.add_node(Box::new(end));

        let connection = graph.add_connection((start_id, start_out), (end_id, end_in));
        assert!(connection.is_some());
        assert_eq!(graph.connection_count(), 1);

        // Self loop: same node on both ends is rejected outright.
        assert!(graph.add_connection((start_id, start_out), (start_id, start_out)).is_none());
    }

    #[test]
    fn fan_in_violation_is_rejected() {
        let mut graph = Graph::new();
        let a = StartNode::new();
        let a_id = a.id();
        let a_out = a.outputs()[0].id();
        graph.add_node(Box::new(a));

        let b = StartNode::new();
        let b_id = b.id();
        let b_out = b.outputs()[0].id();
        graph.add_node(Box::new(b));

        let end = EndNode::new();
        let end_id = end.id();
        let end_in = end.inputs()[0].id();
        graph.add_node(Box::new(end));

        assert!(graph.add_connection((a_id, a_out), (end_id, end_in)).is_some());
        assert!(graph.add_connection((b_id, b_out), (end_id, end_in)).is_none());
        assert_eq!(
            graph
                .get_node(end_id)
                .unwrap()
                .inputs()[0]
                .connections()
                .len(),
            1
        );
    }

    #[test]
    fn cycle_is_rejected_and_graph_left_untouched() {
        let mut graph = Graph::new();
        let a = MergeNode::new();
        let (a_id, a_in0, a_in1, a_out) = (a.id(), a.inputs()[0].id(), a.inputs()[1].id(), a.outputs()[0].id());
        graph.add_node(Box::new(a));

        let b = MergeNode::new();
        let (b_id, b_in0, b_in1, b_out) = (b.id(), b.inputs()[0].id(), b.inputs()[1].id(), b.outputs()[0].id());
        graph.add_node(Box::new(b));

        assert!(graph.add_connection((a_id, a_out), (b_id, b_in0)).is_some());
        // b -> a would close a cycle since a already reaches b.
        assert!(graph.add_connection((b_id, b_out), (a_id, a_in1)).is_none());
        assert!(graph.validate());

        // sanity: unrelated connection still works
        assert!(graph.add_connection((b_id, b_out), (b_id, b_in1)).is_none()); // self loop guard
        let _ = (a_in0, b_in1);
    }

    #[test]
    fn remove_node_cascades_connection_removal() {
        let mut graph = Graph::new();
        let start = StartNode::new();
        let (start_id, start_out) = (start.id(), start.outputs()[0].id());
        graph.add_node(Box::new(start));

        let end = EndNode::new();
        let (end_id, end_in) = (end.id(), end.inputs()[0].id());
        graph.add_node(Box::new(end));

        graph.add_connection((start_id, start_out), (end_id, end_in));
        assert!(graph.remove_node(start_id));
        assert_eq!(graph.connection_count(), 0);
        assert!(graph.get_node(end_id).unwrap().inputs()[0].connections().is_empty());
    }

    #[test]
    fn remove_node_is_idempotent_on_absent_node() {
        let mut graph = Graph::new();
        assert!(!graph.remove_node(NodeId::new()));
    }

    #[test]
    fn add_remove_connection_round_trips_endpoint_state() {
        let mut graph = Graph::new();
        let start = StartNode::new();
        let (start_id, start_out) = (start.id(), start.outputs()[0].id());
        graph.add_node(Box::new(start));

        let end = EndNode::new();
        let (end_id, end_in) = (end.id(), end.inputs()[0].id());
        graph.add_node(Box::new(end));

        let connection = graph.add_connection((start_id, start_out), (end_id, end_in)).unwrap();
        assert!(graph.remove_connection(connection));
        assert!(graph.get_node(start_id).unwrap().outputs()[0].connections().is_empty());
        assert!(graph.get_node(end_id).unwrap().inputs()[0].connections().is_empty());
    }
}
