//! Directed-graph cycle detection.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// Adjacency lists keyed by node, in insertion order.
///
/// Nodes that appear only as neighbours have no outgoing edges.
pub type Graph<'a> = IndexMap<&'a str, Vec<&'a str>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS path.
    Grey,
    /// Fully explored.
    Black,
}

/// Find the first cycle in `graph`, starting roots in insertion order.
///
/// The cycle is returned with its first node repeated at the end, e.g.
/// `["A", "B", "A"]`; a self-loop is `["A", "A"]`.
pub fn detect_cycle<'a>(graph: &Graph<'a>) -> Option<Vec<&'a str>> {
    let mut marks: FxHashMap<&'a str, Mark> = FxHashMap::default();
    let mut path: Vec<&'a str> = Vec::new();

    for &root in graph.keys() {
        if marks.contains_key(root) {
            continue;
        }
        if let Some(cycle) = visit(graph, root, &mut marks, &mut path) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'a>(
    graph: &Graph<'a>,
    node: &'a str,
    marks: &mut FxHashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<&'a str>> {
    marks.insert(node, Mark::Grey);
    path.push(node);

    for &next in graph.get(node).map(Vec::as_slice).unwrap_or_default() {
        match marks.get(next) {
            Some(Mark::Grey) => {
                let start = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            Some(Mark::Black) => {}
            None => {
                if let Some(cycle) = visit(graph, next, marks, path) {
                    return Some(cycle);
                }
            }
        }
    }

    path.pop();
    marks.insert(node, Mark::Black);
    None
}
