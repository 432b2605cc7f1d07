use std::cmp::Reverse;
use std::collections::HashSet;

use ordered_float::OrderedFloat;

use crate::model::network::{Graph, VertexId};
use crate::model::profile::ProfileFactorCache;
use crate::util::priority_queue::InternalPriorityQueue;

use super::direction::Direction;
use super::edge_weight::traversal_weight;
use super::search_error::SearchError;
use super::search_options::SearchOptions;
use super::search_tree::SearchTree;

/// one side of a Dijkstra search: a min-priority queue of frontier vertices
/// ordered by ascending weight (teacher's `InternalPriorityQueue` wrapped
/// around `std::cmp::Reverse` to turn the underlying max-heap into a
/// min-heap) plus the predecessor tree being built as vertices settle.
pub struct DijkstraFrontier {
    queue: InternalPriorityQueue<VertexId, Reverse<OrderedFloat<f64>>>,
    pub tree: SearchTree<VertexId>,
}

impl DijkstraFrontier {
    pub fn new() -> Self {
        DijkstraFrontier {
            queue: InternalPriorityQueue::default(),
            tree: SearchTree::new(),
        }
    }

    /// seeds the frontier with a root vertex at a starting weight. used both
    /// for a single-vertex Dijkstra source and for the two roots of an
    /// edge-interior starting point.
    pub fn push_root(&mut self, vertex: VertexId, weight: f64) {
        let idx = self.tree.relax(vertex, weight, None, None);
        if idx.is_some() {
            self.queue.0.push(vertex, Reverse(OrderedFloat(weight)));
        }
    }

    /// the weight of the vertex currently at the head of the queue, without
    /// popping it.
    pub fn peek_weight(&self) -> Option<f64> {
        self.queue.0.peek().map(|(_, Reverse(w))| w.0)
    }

    /// pops and returns the next frontier vertex and its settled weight, or
    /// `None` once the queue is exhausted.
    pub fn pop(&mut self) -> Option<(VertexId, f64)> {
        self.queue.0.pop().map(|(v, Reverse(w))| (v, w.0))
    }

    /// relaxes every edge incident to `vertex` in `direction`, pushing
    /// improved neighbors back onto the queue.
    pub fn relax_neighbors(
        &mut self,
        graph: &Graph,
        cache: &ProfileFactorCache,
        direction: Direction,
        vertex: VertexId,
        weight: f64,
    ) -> Result<(), SearchError> {
        let predecessor = self.tree.branch_of(vertex).map(|_| ());
        if predecessor.is_none() {
            return Ok(());
        }
        let predecessor_idx = self
            .tree
            .branch_of(vertex)
            .and_then(|_| self.tree_index_of(vertex));
        for edge_id in graph.incident_edges_iter(&vertex, &direction) {
            let edge = graph.get_edge(edge_id)?;
            let Some(edge_weight) = traversal_weight(edge, direction, cache) else {
                continue;
            };
            let terminal = graph.terminal_vertex(edge_id, &direction)?;
            let candidate_weight = weight + edge_weight;
            if let Some(idx) =
                self.tree
                    .relax(terminal, candidate_weight, Some(*edge_id), predecessor_idx)
            {
                self.queue
                    .0
                    .push(terminal, Reverse(OrderedFloat(candidate_weight)));
                let _ = idx;
            }
        }
        Ok(())
    }

    fn tree_index_of(&self, vertex: VertexId) -> Option<usize> {
        self.tree.branch_of(vertex).map(|_| ());
        self.tree.index_of(vertex)
    }
}

impl Default for DijkstraFrontier {
    fn default() -> Self {
        Self::new()
    }
}

/// standard one-directional Dijkstra. relaxes the frontier
/// until either `target` settles, the queue empties, or a budget in
/// `options` is exceeded.
pub fn run(
    graph: &Graph,
    cache: &ProfileFactorCache,
    direction: Direction,
    roots: &[(VertexId, f64)],
    target: Option<VertexId>,
    options: &SearchOptions,
) -> Result<SearchTree<VertexId>, SearchError> {
    let mut frontier = DijkstraFrontier::new();
    for &(vertex, weight) in roots {
        frontier.push_root(vertex, weight);
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
        if Some(vertex) == target {
            break;
        }
        frontier.relax_neighbors(graph, cache, direction, vertex, weight)?;
    }
    log::debug!(
        "search iterations: {}, size of search tree: {}",
        settled,
        frontier.tree.len()
    );
    Ok(frontier.tree)
}

/// Dijkstra augmented with a set of targets rather than a single one:
/// relaxes the frontier until every vertex in `targets` has settled,
/// the queue empties, or a budget in `options` is exceeded. used by the
/// many-to-many engine's uncontracted fallback and full-route paths, where a
/// single one-sided search must answer for every remaining destination at
/// once rather than stopping at the first.
pub fn run_until_all_settled(
    graph: &Graph,
    cache: &ProfileFactorCache,
    direction: Direction,
    roots: &[(VertexId, f64)],
    targets: &[VertexId],
    options: &SearchOptions,
) -> Result<SearchTree<VertexId>, SearchError> {
    let mut frontier = DijkstraFrontier::new();
    for &(vertex, weight) in roots {
        frontier.push_root(vertex, weight);
    }

    let mut remaining: HashSet<VertexId> = targets.iter().copied().collect();
    for &(vertex, _) in roots {
        remaining.remove(&vertex);
    }

    let mut settled = 0usize;
    while !remaining.is_empty() {
        let Some((vertex, weight)) = frontier.pop() else {
            break;
        };
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
        remaining.remove(&vertex);
        frontier.relax_neighbors(graph, cache, direction, vertex, weight)?;
    }
    log::debug!(
        "search iterations: {}, size of search tree: {}",
        settled,
        frontier.tree.len()
    );
    Ok(frontier.tree)
}
