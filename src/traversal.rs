//! Read-only algorithms over the graph model: walks, shortest path, entry/exit
//! discovery, and topological ordering (§4.2).
//!
//! `depth_first`/`breadth_first` walk forward (output) edges only, matching ordinary
//! directed-graph traversal. `find_node_by_id`, `get_entry_points`, `get_exit_points`
//! and the reachable-node set feeding `topological_sort` treat the graph as undirected —
//! they follow both input and output edges — so they discover the whole weakly
//! connected component around `start`, not just its forward-reachable descendants.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::ids::NodeId;
use std::collections::{HashMap, HashSet, VecDeque};

fn output_neighbors(graph: &Graph, node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    if let Some(n) = graph.get_node(node) {
        for output in n.outputs() {
            for connection_id in output.connections() {
                if let Some(connection) = graph.get_connection(*connection_id) {
                    result.push(connection.target().0);
                }
            }
        }
    }
    result
}

fn input_neighbors(graph: &Graph, node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    if let Some(n) = graph.get_node(node) {
        for input in n.inputs() {
            for connection_id in input.connections() {
                if let Some(connection) = graph.get_connection(*connection_id) {
                    result.push(connection.source().0);
                }
            }
        }
    }
    result
}

fn undirected_neighbors(graph: &Graph, node: NodeId) -> Vec<NodeId> {
    let mut result = output_neighbors(graph, node);
    result.extend(input_neighbors(graph, node));
    result
}

/// BFS over both directions, visiting each node at most once. Returns the visitation
/// order (insertion/discovery order is preserved, which is what `get_entry_points` /
/// `get_exit_points` rely on for deterministic output).
fn undirected_reachable(graph: &Graph, start: NodeId) -> Vec<NodeId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();
    if graph.get_node(start).is_none() {
        return order;
    }
    queue.push_back(start);
    visited.insert(start);
    while let Some(current) = queue.pop_front() {
        order.push(current);
        for next in undirected_neighbors(graph, current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    order
}

/// Depth-first walk along output edges, invoking `visit(node)` for each node reached
/// (each node at most once). Stops the whole traversal as soon as `visit` returns
/// `false`.
pub fn depth_first(graph: &Graph, start: NodeId, mut visit: impl FnMut(NodeId) -> bool) {
    if graph.get_node(start).is_none() {
        return;
    }
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    visited.insert(start);
    while let Some(current) = stack.pop() {
        if !visit(current) {
            return;
        }
        // Push in reverse so the first output connector is explored first (stack pops
        // from the back).
        for next in output_neighbors(graph, current).into_iter().rev() {
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }
}

/// Breadth-first walk along output edges, FIFO ordering, same early-stop contract as
/// [`depth_first`].
pub fn breadth_first(graph: &Graph, start: NodeId, mut visit: impl FnMut(NodeId) -> bool) {
    if graph.get_node(start).is_none() {
        return;
    }
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited.insert(start);
    while let Some(current) = queue.pop_front() {
        if !visit(current) {
            return;
        }
        for next in output_neighbors(graph, current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
}

/// BFS lookup across both input and output edges: `true` iff `id` is reachable from
/// `start` treating the graph as undirected (including `start == id`).
pub fn find_node_by_id(graph: &Graph, start: NodeId, id: NodeId) -> bool {
    undirected_reachable(graph, start).into_iter().any(|n| n == id)
}

/// BFS along output edges only; returns the first path found (minimum edge count) as a
/// list of node ids from `start` to `end` inclusive, or an empty vec if `end` is
/// unreachable. Ties are broken by the insertion order of connectors/connections, which
/// falls out naturally from iterating each node's output connectors in storage order.
pub fn find_shortest_path(graph: &Graph, start: NodeId, end: NodeId) -> Vec<NodeId> {
    if graph.get_node(start).is_none() || graph.get_node(end).is_none() {
        return Vec::new();
    }
    if start == end {
        return vec![start];
    }
    let mut visited = HashSet::new();
    let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited.insert(start);

    while let Some(current) = queue.pop_front() {
        for next in output_neighbors(graph, current) {
            if visited.insert(next) {
                parent.insert(next, current);
                if next == end {
                    let mut path = vec![end];
                    let mut cursor = end;
                    while let Some(&p) = parent.get(&cursor) {
                        path.push(p);
                        cursor = p;
                    }
                    path.reverse();
                    return path;
                }
                queue.push_back(next);
            }
        }
    }
    Vec::new()
}

/// Reachable (undirected) nodes all of whose input connectors have zero attached
/// connections — vacuously true for nodes with no input connectors at all (e.g. `Start`).
pub fn get_entry_points(graph: &Graph, start: NodeId) -> Vec<NodeId> {
    undirected_reachable(graph, start)
        .into_iter()
        .filter(|id| {
            graph
                .get_node(*id)
                .map(|n| n.inputs().iter().all(|c| c.connections().is_empty()))
                .unwrap_or(false)
        })
        .collect()
}

/// Reachable (undirected) nodes all of whose output connectors have zero attached
/// connections — vacuously true for nodes with no output connectors at all (e.g. `End`).
pub fn get_exit_points(graph: &Graph, start: NodeId) -> Vec<NodeId> {
    undirected_reachable(graph, start)
        .into_iter()
        .filter(|id| {
            graph
                .get_node(*id)
                .map(|n| n.outputs().iter().all(|c| c.connections().is_empty()))
                .unwrap_or(false)
        })
        .collect()
}

/// Topological order of the whole weakly-connected component reachable (undirected)
/// from `start`: a post-order DFS along *output* edges restricted to that reachable set,
/// reversed. For an acyclic graph this yields `index(u) < index(v)` for every
/// output→input edge `u -> v` (§8 topological correctness property). Errors with
/// [`GraphError::Structural`] if a directed cycle is found within the reachable subgraph
/// — which should not occur for any graph built solely through
/// [`crate::graph::Graph::add_connection`], since that call already rejects
/// cycle-creating edges; this is a defensive check for graphs assembled by other means.
pub fn topological_sort(graph: &Graph, start: NodeId) -> Result<Vec<NodeId>> {
    if graph.get_node(start).is_none() {
        return Err(GraphError::invalid_argument(format!(
            "start node {start} is not present in the graph"
        )));
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Colour {
        White,
        Gray,
        Black,
    }

    let reachable_order = undirected_reachable(graph, start);
    let reachable: HashSet<NodeId> = reachable_order.iter().copied().collect();
    let mut colour: HashMap<NodeId, Colour> =
        reachable_order.iter().map(|id| (*id, Colour::White)).collect();
    let mut post_order = Vec::with_capacity(reachable_order.len());

    fn visit(
        graph: &Graph,
        node: NodeId,
        reachable: &HashSet<NodeId>,
        colour: &mut HashMap<NodeId, Colour>,
        post_order: &mut Vec<NodeId>,
    ) -> Result<()> {
        colour.insert(node, Colour::Gray);
        for next in output_neighbors(graph, node) {
            if !reachable.contains(&next) {
                continue;
            }
            match colour.get(&next).copied().unwrap_or(Colour::White) {
                Colour::White => visit(graph, next, reachable, colour, post_order)?,
                Colour::Gray => {
                    return Err(GraphError::structural(format!(
                        "cycle detected in reachable subgraph at node {next}"
                    )))
                }
                Colour::Black => {}
            }
        }
        colour.insert(node, Colour::Black);
        post_order.push(node);
        Ok(())
    }

    for node in reachable_order {
        if colour.get(&node).copied() == Some(Colour::White) {
            visit(graph, node, &reachable, &mut colour, &mut post_order)?;
        }
    }
    post_order.reverse();
    Ok(post_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{EndNode, MergeNode, StartNode};

    fn linear_graph() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let start = StartNode::new();
        let (start_id, start_out) = (start.id(), start.outputs()[0].id());
        graph.add_node(Box::new(start));

        let end = EndNode::new();
        let (end_id, end_in) = (end.id(), end.inputs()[0].id());
        graph.add_node(Box::new(end));

        graph.add_connection((start_id, start_out), (end_id, end_in));
        (graph, start_id, end_id)
    }

    #[test]
    fn depth_first_visits_each_node_once_and_stops_on_false() {
        let (graph, start_id, end_id) = linear_graph();
        let mut seen = Vec::new();
        depth_first(&graph, start_id, |n| {
            seen.push(n);
            true
        });
        assert_eq!(seen, vec![start_id, end_id]);

        let mut seen = Vec::new();
        depth_first(&graph, start_id, |n| {
            seen.push(n);
            false
        });
        assert_eq!(seen, vec![start_id]);
    }

    #[test]
    fn breadth_first_visits_in_fifo_order() {
        let (graph, start_id, end_id) = linear_graph();
        let mut seen = Vec::new();
        breadth_first(&graph, start_id, |n| {
            seen.push(n);
            true
        });
        assert_eq!(seen, vec![start_id, end_id]);
    }

    #[test]
    fn find_node_by_id_is_undirected() {
        let (graph, start_id, end_id) = linear_graph();
        assert!(find_node_by_id(&graph, end_id, start_id));
        assert!(find_node_by_id(&graph, start_id, end_id));
    }

    #[test]
    fn find_shortest_path_returns_minimum_edge_path() {
        let (graph, start_id, end_id) = linear_graph();
        let path = find_shortest_path(&graph, start_id, end_id);
        assert_eq!(path, vec![start_id, end_id]);
    }

    #[test]
    fn find_shortest_path_empty_when_unreachable() {
        let mut graph = Graph::new();
        let a = StartNode::new();
        let a_id = a.id();
        graph.add_node(Box::new(a));
        let b = EndNode::new();
        let b_id = b.id();
        graph.add_node(Box::new(b));

        assert!(find_shortest_path(&graph, a_id, b_id).is_empty());
    }

    #[test]
    fn entry_and_exit_points_match_unconnected_ports() {
        let (graph, start_id, end_id) = linear_graph();
        assert_eq!(get_entry_points(&graph, start_id), vec![start_id]);
        assert_eq!(get_exit_points(&graph, start_id), vec![end_id]);
    }

    #[test]
    fn topological_sort_orders_source_before_target() {
        let mut graph = Graph::new();
        let start = StartNode::new();
        let (start_id, start_out) = (start.id(), start.outputs()[0].id());
        graph.add_node(Box::new(start));

        let merge = MergeNode::new();
        let (merge_id, merge_in0, merge_out) =
            (merge.id(), merge.inputs()[0].id(), merge.outputs()[0].id());
        graph.add_node(Box::new(merge));

        let end = EndNode::new();
        let (end_id, end_in) = (end.id(), end.inputs()[0].id());
        graph.add_node(Box::new(end));

        graph.add_connection((start_id, start_out), (merge_id, merge_in0));
        graph.add_connection((merge_id, merge_out), (end_id, end_in));

        let order = topological_sort(&graph, start_id).unwrap();
        let pos = |id: NodeId| order.iter().position(|n| *n == id).unwrap();
        assert!(pos(start_id) < pos(merge_id));
        assert!(pos(merge_id) < pos(end_id));
    }

    #[test]
    fn topological_sort_errors_on_unknown_start() {
        let graph = Graph::new();
        assert!(topological_sort(&graph, NodeId::new()).is_err());
    }
}
