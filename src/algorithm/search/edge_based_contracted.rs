use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::model::contracted::{EdgeBasedContractedEdge, EdgeBasedContractedGraph};
use crate::model::network::{DirectedEdgeId, EdgeId, Graph, VertexId};
use crate::util::priority_queue::InternalPriorityQueue;

use super::search_error::SearchError;
use super::search_options::SearchOptions;
use super::search_tree::SearchTree;

/// one side of an edge-based contracted-hierarchy search: the
/// search-tree node key is a [`DirectedEdgeId`] rather than a vertex, so a
/// turn restriction is respected simply by the hierarchy never containing
/// the forbidden edge-to-edge transition; no per-step trail check is
/// needed, unlike the uncontracted edge-based kernel. like the
/// node-based kernel, both directions climb the same `up_out` adjacency,
/// differing only in which weight field they read.
pub struct EdgeBasedContractedFrontier {
    queue: InternalPriorityQueue<DirectedEdgeId, Reverse<OrderedFloat<f64>>>,
    pub tree: SearchTree<DirectedEdgeId, usize>,
    use_backward_weight: bool,
}

impl EdgeBasedContractedFrontier {
    pub fn new(use_backward_weight: bool) -> Self {
        EdgeBasedContractedFrontier {
            queue: InternalPriorityQueue::default(),
            tree: SearchTree::new(),
            use_backward_weight,
        }
    }

    pub fn push_root(&mut self, edge: DirectedEdgeId, weight: f64) {
        if self.tree.relax(edge, weight, None, None).is_some() {
            self.queue.0.push(edge, Reverse(OrderedFloat(weight)));
        }
    }

    pub fn peek_weight(&self) -> Option<f64> {
        self.queue.0.peek().map(|(_, Reverse(w))| w.0)
    }

    pub fn pop(&mut self) -> Option<(DirectedEdgeId, f64)> {
        self.queue.0.pop().map(|(e, Reverse(w))| (e, w.0))
    }

    pub fn relax(&mut self, hierarchy: &EdgeBasedContractedGraph, edge: DirectedEdgeId, weight: f64) {
        let predecessor_idx = self.tree.index_of(edge);
        let use_backward = self.use_backward_weight;
        let edges: Vec<(usize, DirectedEdgeId, f64)> = hierarchy
            .up_out(edge)
            .map(|(idx, e)| {
                let w = if use_backward { e.backward_weight } else { e.forward_weight };
                (idx, e.to, w)
            })
            .collect();
        for (idx, terminal, edge_weight) in edges {
            let candidate_weight = weight + edge_weight;
            if self
                .tree
                .relax(terminal, candidate_weight, Some(idx), predecessor_idx)
                .is_some()
            {
                self.queue
                    .0
                    .push(terminal, Reverse(OrderedFloat(candidate_weight)));
            }
        }
    }
}

/// result of an edge-based contracted-hierarchy search: the two upward
/// search trees and the directed edge at which they met.
pub struct EdgeBasedContractedResult {
    pub forward_tree: SearchTree<DirectedEdgeId, usize>,
    pub reverse_tree: SearchTree<DirectedEdgeId, usize>,
    pub meeting_edge: DirectedEdgeId,
    pub weight: f64,
}

/// edge-based contracted-hierarchy bidirectional search:
/// identical alternation and meet-in-the-middle termination to the
/// node-based kernel, but search-tree nodes are directed edges.
pub fn run(
    hierarchy: &EdgeBasedContractedGraph,
    forward_roots: &[(DirectedEdgeId, f64)],
    reverse_roots: &[(DirectedEdgeId, f64)],
    source: DirectedEdgeId,
    target: DirectedEdgeId,
    options: &SearchOptions,
) -> Result<EdgeBasedContractedResult, SearchError> {
    let mut forward = EdgeBasedContractedFrontier::new(false);
    let mut reverse = EdgeBasedContractedFrontier::new(true);
    for &(e, w) in forward_roots {
        forward.push_root(e, w);
    }
    for &(e, w) in reverse_roots {
        reverse.push_root(e, w);
    }

    let mut best_weight = f64::INFINITY;
    let mut meeting_edge: Option<DirectedEdgeId> = None;
    let mut settled = 0usize;

    loop {
        if options.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        let f_top = forward.peek_weight();
        let r_top = reverse.peek_weight();
        if f_top.is_none() && r_top.is_none() {
            break;
        }
        let should_stop = match (f_top, r_top) {
            (Some(f), Some(r)) => f + r >= best_weight,
            (Some(f), None) => f >= best_weight,
            (None, Some(r)) => r >= best_weight,
            (None, None) => true,
        };
        if should_stop {
            break;
        }

        let expand_forward = match (f_top, r_top) {
            (Some(f), Some(r)) => f <= r,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => unreachable!(),
        };

        if expand_forward {
            let Some((edge, weight)) = forward.pop() else {
                continue;
            };
            if options.exceeds_max_weight(weight) {
                break;
            }
            settled += 1;
            if options.exceeds_max_settled(settled) {
                break;
            }
            if let Some(other_weight) = reverse.tree.weight_of(edge) {
                let total = weight + other_weight;
                if total < best_weight {
                    best_weight = total;
                    meeting_edge = Some(edge);
                }
            }
            forward.relax(hierarchy, edge, weight);
        } else {
            let Some((edge, weight)) = reverse.pop() else {
                continue;
            };
            if options.exceeds_max_weight(weight) {
                break;
            }
            settled += 1;
            if options.exceeds_max_settled(settled) {
                break;
            }
            if let Some(other_weight) = forward.tree.weight_of(edge) {
                let total = weight + other_weight;
                if total < best_weight {
                    best_weight = total;
                    meeting_edge = Some(edge);
                }
            }
            reverse.relax(hierarchy, edge, weight);
        }
    }

    let meeting_edge = meeting_edge.ok_or_else(|| {
        let (source_edge, _) = source.decode().unwrap_or((EdgeId(0), true));
        let (target_edge, _) = target.decode().unwrap_or((EdgeId(0), true));
        SearchError::NoPathExistsBetweenEdges(source_edge, target_edge, settled)
    })?;
    log::debug!(
        "search iterations: {}, size of search tree: {}",
        settled,
        forward.tree.len() + reverse.tree.len()
    );
    Ok(EdgeBasedContractedResult {
        forward_tree: forward.tree,
        reverse_tree: reverse.tree,
        meeting_edge,
        weight: best_weight,
    })
}

/// a one-sided edge-based contracted search, climbing only upward edges from
/// `roots` until the queue empties or a budget in `options` is exceeded. used
/// by the many-to-many engine to build one side's "middle set"
/// when the active profile has an edge-based hierarchy.
pub fn run_one_sided(
    hierarchy: &EdgeBasedContractedGraph,
    roots: &[(DirectedEdgeId, f64)],
    use_backward_weight: bool,
    options: &SearchOptions,
) -> Result<SearchTree<DirectedEdgeId, usize>, SearchError> {
    let mut frontier = EdgeBasedContractedFrontier::new(use_backward_weight);
    for &(e, w) in roots {
        frontier.push_root(e, w);
    }
    let mut settled = 0usize;
    while let Some((edge, weight)) = frontier.pop() {
        if options.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if options.exceeds_max_weight(weight) {
            break;
        }
        settled += 1;
        if options.exceeds_max_settled(settled) {
            break;
        }
        frontier.relax(hierarchy, edge, weight);
    }
    log::debug!(
        "search iterations: {}, size of search tree: {}",
        settled,
        frontier.tree.len()
    );
    Ok(frontier.tree)
}

fn directed_endpoints(graph: &Graph, directed: DirectedEdgeId) -> Option<(VertexId, VertexId)> {
    let (edge_id, is_forward) = directed.decode()?;
    let edge = graph.get_edge(&edge_id).ok()?;
    Some(if is_forward {
        (edge.from, edge.to)
    } else {
        (edge.to, edge.from)
    })
}

fn append_forward_hop(out: &mut Vec<VertexId>, graph: &Graph, hierarchy: &EdgeBasedContractedGraph, idx: usize) {
    for edge in hierarchy.expand(hierarchy.edge(idx)) {
        if let Some((_, to_v)) = directed_endpoints(graph, edge.to) {
            out.push(to_v);
        }
    }
}

fn append_backward_hop(out: &mut Vec<VertexId>, graph: &Graph, hierarchy: &EdgeBasedContractedGraph, idx: usize) {
    let mut chain = hierarchy.expand(hierarchy.edge(idx));
    chain.reverse();
    for edge in chain {
        if let Some((from_v, _)) = directed_endpoints(graph, edge.from) {
            out.push(from_v);
        }
    }
}

/// reconstructs the full original-vertex path between an edge-based
/// contracted search's two roots, expanding every shortcut and decoding
/// each directed original edge back to the base graph's vertices.
pub fn materialize_route(
    graph: &Graph,
    hierarchy: &EdgeBasedContractedGraph,
    forward_tree: &SearchTree<DirectedEdgeId, usize>,
    reverse_tree: &SearchTree<DirectedEdgeId, usize>,
    meeting_edge: DirectedEdgeId,
) -> Vec<VertexId> {
    let forward_path = forward_tree.path_to(meeting_edge);
    let mut out = match forward_path.first().and_then(|&e| directed_endpoints(graph, e)) {
        Some((from_v, _)) => vec![from_v],
        None => return Vec::new(),
    };
    for &e in &forward_path[1..] {
        if let Some(idx) = forward_tree.branch_of(e).and_then(|b| b.incoming_edge) {
            append_forward_hop(&mut out, graph, hierarchy, idx);
        }
    }

    let reverse_path = reverse_tree.path_to(meeting_edge);
    for i in (1..reverse_path.len()).rev() {
        let e = reverse_path[i];
        if let Some(idx) = reverse_tree.branch_of(e).and_then(|b| b.incoming_edge) {
            append_backward_hop(&mut out, graph, hierarchy, idx);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn de(id: i64) -> DirectedEdgeId {
        DirectedEdgeId(id)
    }

    fn hierarchy() -> EdgeBasedContractedGraph {
        let mut levels = IndexMap::new();
        levels.insert(de(1), 0);
        levels.insert(de(2), 1);
        levels.insert(de(3), 2);
        let edges = vec![
            EdgeBasedContractedEdge {
                from: de(1),
                to: de(2),
                forward_weight: 10.0,
                backward_weight: 10.0,
                contracted_edge: None,
            },
            EdgeBasedContractedEdge {
                from: de(2),
                to: de(3),
                forward_weight: 5.0,
                backward_weight: 5.0,
                contracted_edge: None,
            },
            EdgeBasedContractedEdge {
                from: de(1),
                to: de(3),
                forward_weight: 15.0,
                backward_weight: 15.0,
                contracted_edge: Some(de(2)),
            },
        ];
        EdgeBasedContractedGraph::from_parts(levels, edges).unwrap()
    }

    #[test]
    fn test_edge_based_contracted_search_finds_shortcut() {
        let h = hierarchy();
        let options = SearchOptions::default();
        let result = run(&h, &[(de(1), 0.0)], &[(de(3), 0.0)], de(1), de(3), &options).unwrap();
        assert_eq!(result.weight, 15.0);
    }
}
