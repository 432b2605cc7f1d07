use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::model::contracted::{ContractedEdge, ContractedGraph};
use crate::model::network::VertexId;
use crate::util::priority_queue::InternalPriorityQueue;

use super::search_error::SearchError;
use super::search_options::SearchOptions;
use super::search_tree::SearchTree;

/// one side of a contracted-hierarchy search: both directions
/// relax the same upward edge set (`ContractedGraph::up_out`, every edge
/// oriented lower-level-to-higher-level by construction), reading
/// `forward_weight` for the forward search and `backward_weight` for the
/// backward one. relaxing only upward edges means the frontier naturally
/// stops at local search-space peaks without any explicit level check; a
/// settled node's `incoming_edge` is the `usize` index into the hierarchy's
/// edge array rather than an `EdgeId`, since a shortcut has no counterpart
/// among the original graph's edges.
pub struct ContractedFrontier {
    queue: InternalPriorityQueue<VertexId, Reverse<OrderedFloat<f64>>>,
    pub tree: SearchTree<VertexId, usize>,
    use_backward_weight: bool,
}

impl ContractedFrontier {
    pub fn new(use_backward_weight: bool) -> Self {
        ContractedFrontier {
            queue: InternalPriorityQueue::default(),
            tree: SearchTree::new(),
            use_backward_weight,
        }
    }

    pub fn push_root(&mut self, vertex: VertexId, weight: f64) {
        if self.tree.relax(vertex, weight, None, None).is_some() {
            self.queue.0.push(vertex, Reverse(OrderedFloat(weight)));
        }
    }

    pub fn peek_weight(&self) -> Option<f64> {
        self.queue.0.peek().map(|(_, Reverse(w))| w.0)
    }

    pub fn pop(&mut self) -> Option<(VertexId, f64)> {
        self.queue.0.pop().map(|(v, Reverse(w))| (v, w.0))
    }

    /// relaxes every upward edge leaving `vertex`, using `forward_weight` for
    /// the forward search or `backward_weight` (the cost of traversing the
    /// edge against its stored orientation) for the backward one.
    pub fn relax(&mut self, hierarchy: &ContractedGraph, vertex: VertexId, weight: f64) {
        let predecessor_idx = self.tree.index_of(vertex);
        let use_backward = self.use_backward_weight;
        let edges: Vec<(usize, VertexId, f64)> = hierarchy
            .up_out(vertex)
            .map(|(idx, edge)| {
                let w = if use_backward {
                    edge.backward_weight
                } else {
                    edge.forward_weight
                };
                (idx, edge.to, w)
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

/// result of a node-based contracted-hierarchy search: the two upward
/// search trees and the vertex at which they met.
pub struct ContractedResult {
    pub forward_tree: SearchTree<VertexId, usize>,
    pub reverse_tree: SearchTree<VertexId, usize>,
    pub meeting_vertex: VertexId,
    pub weight: f64,
}

/// contracted-hierarchy bidirectional search: both frontiers
/// climb only upward edges, so search spaces are far smaller than the
/// uncontracted kernel's. a settled vertex is a meeting candidate the
/// moment both trees have reached it; meeting weight is refined whenever a
/// vertex is settled by both searches, and the search stops once both
/// frontier tops exceed the best meeting weight found so far.
pub fn run(
    hierarchy: &ContractedGraph,
    forward_roots: &[(VertexId, f64)],
    reverse_roots: &[(VertexId, f64)],
    source: VertexId,
    target: VertexId,
    options: &SearchOptions,
) -> Result<ContractedResult, SearchError> {
    let mut forward = ContractedFrontier::new(false);
    let mut reverse = ContractedFrontier::new(true);
    for &(v, w) in forward_roots {
        forward.push_root(v, w);
    }
    for &(v, w) in reverse_roots {
        reverse.push_root(v, w);
    }

    let mut best_weight = f64::INFINITY;
    let mut meeting_vertex: Option<VertexId> = None;
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
            let Some((vertex, weight)) = forward.pop() else {
                continue;
            };
            if options.exceeds_max_weight(weight) {
                break;
            }
            settled += 1;
            if options.exceeds_max_settled(settled) {
                break;
            }
            if let Some(other_weight) = reverse.tree.weight_of(vertex) {
                let total = weight + other_weight;
                if total < best_weight {
                    best_weight = total;
                    meeting_vertex = Some(vertex);
                }
            }
            forward.relax(hierarchy, vertex, weight);
        } else {
            let Some((vertex, weight)) = reverse.pop() else {
                continue;
            };
            if options.exceeds_max_weight(weight) {
                break;
            }
            settled += 1;
            if options.exceeds_max_settled(settled) {
                break;
            }
            if let Some(other_weight) = forward.tree.weight_of(vertex) {
                let total = weight + other_weight;
                if total < best_weight {
                    best_weight = total;
                    meeting_vertex = Some(vertex);
                }
            }
            reverse.relax(hierarchy, vertex, weight);
        }
    }

    let meeting_vertex =
        meeting_vertex.ok_or(SearchError::NoPathExistsBetweenVertices(source, target, settled))?;
    log::debug!(
        "search iterations: {}, size of search tree: {}",
        settled,
        forward.tree.len() + reverse.tree.len()
    );
    Ok(ContractedResult {
        forward_tree: forward.tree,
        reverse_tree: reverse.tree,
        meeting_vertex,
        weight: best_weight,
    })
}

/// a one-sided contracted search, climbing only upward edges from `roots`
/// until the queue empties or a budget in `options` is exceeded. used by the
/// many-to-many engine to build one side's "middle set" without
/// pairing it against a specific opposite frontier.
pub fn run_one_sided(
    hierarchy: &ContractedGraph,
    roots: &[(VertexId, f64)],
    use_backward_weight: bool,
    options: &SearchOptions,
) -> Result<SearchTree<VertexId, usize>, SearchError> {
    let mut frontier = ContractedFrontier::new(use_backward_weight);
    for &(v, w) in roots {
        frontier.push_root(v, w);
    }
    let mut settled = 0usize;
    while let Some((vertex, weight)) = frontier.pop() {
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
        frontier.relax(hierarchy, vertex, weight);
    }
    log::debug!(
        "search iterations: {}, size of search tree: {}",
        settled,
        frontier.tree.len()
    );
    Ok(frontier.tree)
}

fn append_forward_hop(out: &mut Vec<VertexId>, hierarchy: &ContractedGraph, idx: usize) {
    for edge in hierarchy.expand(hierarchy.edge(idx)) {
        out.push(edge.to);
    }
}

/// appends a hop traversed against its canonical (low-to-high level)
/// orientation: the backward tree settles the same canonical edges as the
/// forward tree, but `backward_weight` means the edge is physically
/// traveled `to -> from`, so the expanded chain is walked in reverse,
/// pushing each piece's `from` vertex.
fn append_backward_hop(out: &mut Vec<VertexId>, hierarchy: &ContractedGraph, idx: usize) {
    let mut chain = hierarchy.expand(hierarchy.edge(idx));
    chain.reverse();
    for edge in chain {
        out.push(edge.from);
    }
}

/// reconstructs the full original-vertex path between a contracted
/// bidirectional search's two roots, expanding every shortcut encountered
/// along the way by recursively replacing it with its two children.
pub fn materialize_route(
    hierarchy: &ContractedGraph,
    forward_tree: &SearchTree<VertexId, usize>,
    reverse_tree: &SearchTree<VertexId, usize>,
    meeting_vertex: VertexId,
) -> Vec<VertexId> {
    let forward_path = forward_tree.path_to(meeting_vertex);
    let mut out = match forward_path.first() {
        Some(&root) => vec![root],
        None => return Vec::new(),
    };
    for &v in &forward_path[1..] {
        if let Some(idx) = forward_tree.branch_of(v).and_then(|b| b.incoming_edge) {
            append_forward_hop(&mut out, hierarchy, idx);
        }
    }

    let reverse_path = reverse_tree.path_to(meeting_vertex);
    for i in (1..reverse_path.len()).rev() {
        let v = reverse_path[i];
        if let Some(idx) = reverse_tree.branch_of(v).and_then(|b| b.incoming_edge) {
            append_backward_hop(&mut out, hierarchy, idx);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn hierarchy() -> ContractedGraph {
        // 0 -> 1 -> 2, levels strictly increasing, plus shortcut 0 -> 2.
        let mut levels = IndexMap::new();
        levels.insert(VertexId(0), 0);
        levels.insert(VertexId(1), 1);
        levels.insert(VertexId(2), 2);
        let edges = vec![
            ContractedEdge {
                from: VertexId(0),
                to: VertexId(1),
                forward_weight: 10.0,
                backward_weight: 10.0,
                contracted_vertex: None,
            },
            ContractedEdge {
                from: VertexId(1),
                to: VertexId(2),
                forward_weight: 5.0,
                backward_weight: 5.0,
                contracted_vertex: None,
            },
            ContractedEdge {
                from: VertexId(0),
                to: VertexId(2),
                forward_weight: 15.0,
                backward_weight: 15.0,
                contracted_vertex: Some(VertexId(1)),
            },
        ];
        ContractedGraph::from_parts(3, levels, edges).unwrap()
    }

    #[test]
    fn test_contracted_search_finds_shortcut_weight() {
        let h = hierarchy();
        let options = SearchOptions::default();
        let result = run(
            &h,
            &[(VertexId(0), 0.0)],
            &[(VertexId(2), 0.0)],
            VertexId(0),
            VertexId(2),
            &options,
        )
        .unwrap();
        assert_eq!(result.weight, 15.0);
    }

    #[test]
    fn test_materialize_route_unpacks_shortcut() {
        let h = hierarchy();
        let options = SearchOptions::default();
        let result = run(
            &h,
            &[(VertexId(0), 0.0)],
            &[(VertexId(2), 0.0)],
            VertexId(0),
            VertexId(2),
            &options,
        )
        .unwrap();
        let vertices = materialize_route(
            &h,
            &result.forward_tree,
            &result.reverse_tree,
            result.meeting_vertex,
        );
        assert_eq!(vertices, vec![VertexId(0), VertexId(1), VertexId(2)]);
    }
}
