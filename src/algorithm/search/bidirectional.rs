use crate::model::network::{Graph, VertexId};
use crate::model::profile::ProfileFactorCache;

use super::direction::Direction;
use super::plain_dijkstra::DijkstraFrontier;
use super::search_error::SearchError;
use super::search_options::SearchOptions;
use super::search_tree::SearchTree;

/// the two predecessor trees built by a bidirectional search and the vertex
/// at which they met.
pub struct BidirectionalResult {
    pub forward_tree: SearchTree<VertexId>,
    pub reverse_tree: SearchTree<VertexId>,
    pub meeting_vertex: VertexId,
    pub weight: f64,
}

/// bidirectional Dijkstra with meet-in-the-middle termination:
/// alternates expansion between whichever frontier currently has the smaller
/// top-of-queue weight, tracking the best complete path seen across both
/// trees (a vertex settled on one side with a known weight on the other).
/// search stops once the sum of both frontiers' top weights reaches the best
/// path found, at which point no unexplored vertex could improve on it.
#[allow(clippy::too_many_arguments)]
pub fn run(
    graph: &Graph,
    cache: &ProfileFactorCache,
    forward_roots: &[(VertexId, f64)],
    reverse_roots: &[(VertexId, f64)],
    source: VertexId,
    target: VertexId,
    options: &SearchOptions,
) -> Result<BidirectionalResult, SearchError> {
    let mut forward = DijkstraFrontier::new();
    let mut reverse = DijkstraFrontier::new();
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
            forward.relax_neighbors(graph, cache, Direction::Forward, vertex, weight)?;
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
            reverse.relax_neighbors(graph, cache, Direction::Reverse, vertex, weight)?;
        }
    }

    let meeting_vertex =
        meeting_vertex.ok_or(SearchError::NoPathExistsBetweenVertices(source, target, settled))?;
    log::debug!(
        "search iterations: {}, size of search tree: {}",
        settled,
        forward.tree.len() + reverse.tree.len()
    );
    Ok(BidirectionalResult {
        forward_tree: forward.tree,
        reverse_tree: reverse.tree,
        meeting_vertex,
        weight: best_weight,
    })
}

/// the full vertex path between a bidirectional search's two roots: since
/// tree keys are vertices themselves, this is just the forward tree's
/// root-to-meeting-vertex path followed by the reverse tree's, reversed and
/// deduplicated at the shared meeting vertex.
pub fn materialize_route(result: &BidirectionalResult) -> Vec<VertexId> {
    let mut forward_path = result.forward_tree.path_to(result.meeting_vertex);
    let mut reverse_path = result.reverse_tree.path_to(result.meeting_vertex);
    reverse_path.reverse();
    if !reverse_path.is_empty() {
        reverse_path.remove(0);
    }
    forward_path.append(&mut reverse_path);
    forward_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::{Edge, Graph};
    use crate::model::profile::profile::test::MockProfile;

    fn line_graph() -> Graph {
        let vertices = vec![
            crate::model::network::Vertex::new(0, 0.0, 0.0),
            crate::model::network::Vertex::new(1, 0.0, 1.0),
            crate::model::network::Vertex::new(2, 0.0, 2.0),
            crate::model::network::Vertex::new(3, 0.0, 3.0),
        ]
        .into_boxed_slice();
        let edges = vec![
            Edge::new(0, 0, 1, 10.0, 0, 0, None, false),
            Edge::new(1, 1, 2, 10.0, 0, 0, None, false),
            Edge::new(2, 2, 3, 10.0, 0, 0, None, false),
        ]
        .into_boxed_slice();
        Graph::new(vertices, edges).unwrap()
    }

    #[test]
    fn test_bidirectional_finds_same_weight_as_plain() {
        let graph = line_graph();
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        let options = SearchOptions::default();

        let result = run(
            &graph,
            &cache,
            &[(VertexId(0), 0.0)],
            &[(VertexId(3), 0.0)],
            VertexId(0),
            VertexId(3),
            &options,
        )
        .unwrap();
        assert_eq!(result.weight, 30.0);

        let plain = super::plain_dijkstra::run(
            &graph,
            &cache,
            Direction::Forward,
            &[(VertexId(0), 0.0)],
            Some(VertexId(3)),
            &options,
        )
        .unwrap();
        assert_eq!(plain.weight_of(VertexId(3)), Some(30.0));
    }
}
