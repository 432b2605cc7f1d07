use std::cmp::Reverse;
use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::model::network::{Graph, VertexId};
use crate::model::profile::ProfileFactorCache;
use crate::model::restriction::RestrictionsIndex;
use crate::util::priority_queue::InternalPriorityQueue;

use super::direction::Direction;
use super::edge_weight::traversal_weight;
use super::search_error::SearchError;
use super::search_options::SearchOptions;
use super::search_tree::SearchTree;

/// search-tree key for the restriction-aware kernel: the
/// vertex the state stands on, plus a rolling buffer of the most recently
/// visited vertices, long enough to decide any restriction for the active
/// profile. two states can share a `vertex` while carrying different
/// trails, so unlike the plain kernel, states are not keyed by vertex alone.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TrailState {
    pub vertex: VertexId,
    trail: Vec<VertexId>,
}

impl TrailState {
    fn root(vertex: VertexId) -> TrailState {
        TrailState {
            vertex,
            trail: vec![vertex],
        }
    }

    /// the trailing sequence extended with `next`, capped to `max_len`
    /// vertices: only the longest restriction's vertex count is ever needed
    /// to check a future extension.
    fn extended(&self, next: VertexId, max_len: usize) -> TrailState {
        let mut trail = self.trail.clone();
        trail.push(next);
        let cap = max_len.max(1);
        if trail.len() > cap {
            let excess = trail.len() - cap;
            trail.drain(0..excess);
        }
        TrailState {
            vertex: next,
            trail,
        }
    }
}

/// a Dijkstra frontier over [`TrailState`]s, restricted by a
/// [`RestrictionsIndex`]. relaxation mirrors the plain
/// kernel's but additionally refuses to extend a state's trail into a
/// forbidden contiguous vertex sequence. `by_vertex` indexes every settled
/// state by the vertex it stands on, since a bidirectional meeting check
/// must consider every trail variant present at a given vertex, not just
/// the one most recently popped.
pub struct RestrictedFrontier {
    queue: InternalPriorityQueue<TrailState, Reverse<OrderedFloat<f64>>>,
    pub tree: SearchTree<TrailState>,
    by_vertex: HashMap<VertexId, Vec<TrailState>>,
    max_trail_len: usize,
}

impl RestrictedFrontier {
    pub fn new(max_trail_len: usize) -> Self {
        RestrictedFrontier {
            queue: InternalPriorityQueue::default(),
            tree: SearchTree::new(),
            by_vertex: HashMap::new(),
            max_trail_len,
        }
    }

    fn register(&mut self, state: TrailState) {
        self.by_vertex.entry(state.vertex).or_default().push(state);
    }

    pub fn states_at(&self, vertex: VertexId) -> &[TrailState] {
        self.by_vertex.get(&vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push_root(&mut self, vertex: VertexId, weight: f64) {
        let state = TrailState::root(vertex);
        if self.tree.relax(state.clone(), weight, None, None).is_some() {
            self.register(state.clone());
            self.queue.0.push(state, Reverse(OrderedFloat(weight)));
        }
    }

    pub fn peek_weight(&self) -> Option<f64> {
        self.queue.0.peek().map(|(_, Reverse(w))| w.0)
    }

    pub fn pop(&mut self) -> Option<(TrailState, f64)> {
        self.queue.0.pop().map(|(s, Reverse(w))| (s, w.0))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn relax_neighbors(
        &mut self,
        graph: &Graph,
        cache: &ProfileFactorCache,
        restrictions: &RestrictionsIndex,
        profile_id: u16,
        direction: Direction,
        state: &TrailState,
        weight: f64,
    ) -> Result<(), SearchError> {
        let predecessor_idx = self.tree.index_of(state.clone());
        for edge_id in graph.incident_edges_iter(&state.vertex, &direction) {
            let edge = graph.get_edge(edge_id)?;
            let Some(edge_weight) = traversal_weight(edge, direction, cache) else {
                continue;
            };
            let terminal = graph.terminal_vertex(edge_id, &direction)?;
            if restrictions.forbids_extension(profile_id, &state.trail, terminal) {
                continue;
            }
            let next_state = state.extended(terminal, self.max_trail_len);
            let candidate_weight = weight + edge_weight;
            if self
                .tree
                .relax(
                    next_state.clone(),
                    candidate_weight,
                    Some(*edge_id),
                    predecessor_idx,
                )
                .is_some()
            {
                self.register(next_state.clone());
                self.queue
                    .0
                    .push(next_state, Reverse(OrderedFloat(candidate_weight)));
            }
        }
        Ok(())
    }
}

/// the per-trail buffer length needed to evaluate every restriction
/// registered for `profile_id`: one less than the longest restriction's
/// vertex count, floored at 1 so a root state's single-vertex trail is
/// always valid.
pub fn max_trail_len(restrictions: &RestrictionsIndex, profile_id: u16) -> usize {
    restrictions
        .max_restriction_len(profile_id)
        .saturating_sub(1)
        .max(1)
}

/// result of a restriction-aware bidirectional search: the two frontiers'
/// trees plus the forward/reverse trail states at which they met, so the
/// caller can stitch a vertex path exactly as in the plain bidirectional
/// kernel.
pub struct EdgeBasedResult {
    pub forward_tree: SearchTree<TrailState>,
    pub reverse_tree: SearchTree<TrailState>,
    pub meeting_state: (TrailState, TrailState),
    pub weight: f64,
}

/// restriction-aware bidirectional Dijkstra. alternates expansion between the smaller-top
/// frontier exactly as the plain bidirectional kernel; every candidate
/// meeting point is re-validated against the full stitched vertex sequence
/// before being accepted, since a forward trail and a reverse trail can each
/// be individually valid while their concatenation crosses a forbidden
/// sequence at the seam. a rejected candidate does not stop the search —
/// the kernel keeps scanning until no further improvement is possible, so it
/// can never return a path that violates a restriction.
#[allow(clippy::too_many_arguments)]
pub fn run(
    graph: &Graph,
    cache: &ProfileFactorCache,
    restrictions: &RestrictionsIndex,
    profile_id: u16,
    forward_roots: &[(VertexId, f64)],
    reverse_roots: &[(VertexId, f64)],
    source: VertexId,
    target: VertexId,
    options: &SearchOptions,
) -> Result<EdgeBasedResult, SearchError> {
    let trail_len = max_trail_len(restrictions, profile_id);
    let mut forward = RestrictedFrontier::new(trail_len);
    let mut reverse = RestrictedFrontier::new(trail_len);
    for &(v, w) in forward_roots {
        forward.push_root(v, w);
    }
    for &(v, w) in reverse_roots {
        reverse.push_root(v, w);
    }

    let mut best_weight = f64::INFINITY;
    let mut meeting: Option<(TrailState, TrailState)> = None;
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
            let Some((state, weight)) = forward.pop() else {
                continue;
            };
            if options.exceeds_max_weight(weight) {
                break;
            }
            settled += 1;
            if options.exceeds_max_settled(settled) {
                break;
            }
            try_meet(
                restrictions,
                profile_id,
                &forward,
                &reverse,
                &state,
                weight,
                true,
                &mut best_weight,
                &mut meeting,
            );
            forward.relax_neighbors(
                graph,
                cache,
                restrictions,
                profile_id,
                Direction::Forward,
                &state,
                weight,
            )?;
        } else {
            let Some((state, weight)) = reverse.pop() else {
                continue;
            };
            if options.exceeds_max_weight(weight) {
                break;
            }
            settled += 1;
            if options.exceeds_max_settled(settled) {
                break;
            }
            try_meet(
                restrictions,
                profile_id,
                &forward,
                &reverse,
                &state,
                weight,
                false,
                &mut best_weight,
                &mut meeting,
            );
            reverse.relax_neighbors(
                graph,
                cache,
                restrictions,
                profile_id,
                Direction::Reverse,
                &state,
                weight,
            )?;
        }
    }

    let (forward_state, reverse_state) = meeting.ok_or(SearchError::NoPathExistsBetweenVertices(
        source, target, settled,
    ))?;
    log::debug!(
        "search iterations: {}, size of search tree: {}",
        settled,
        forward.tree.len() + reverse.tree.len()
    );
    Ok(EdgeBasedResult {
        forward_tree: forward.tree,
        reverse_tree: reverse.tree,
        meeting_state: (forward_state, reverse_state),
        weight: best_weight,
    })
}

/// vertex path stitched from a forward/reverse [`TrailState`] pair at a
/// meeting point: all vertices in travel order, so a restriction can be
/// checked across the whole seam, not just within one side.
fn stitched_vertices(
    forward_tree: &SearchTree<TrailState>,
    reverse_tree: &SearchTree<TrailState>,
    forward_state: &TrailState,
    reverse_state: &TrailState,
) -> Vec<VertexId> {
    let mut forward_path: Vec<VertexId> = forward_tree
        .path_to(forward_state.clone())
        .into_iter()
        .map(|s| s.vertex)
        .collect();
    let mut reverse_path: Vec<VertexId> = reverse_tree
        .path_to(reverse_state.clone())
        .into_iter()
        .map(|s| s.vertex)
        .collect();
    reverse_path.reverse();
    // both paths include the meeting vertex; drop the duplicate.
    if !reverse_path.is_empty() {
        reverse_path.remove(0);
    }
    forward_path.append(&mut reverse_path);
    forward_path
}

/// the full vertex path of a completed restriction-aware search, for the
/// route builder.
pub fn materialize_route(result: &EdgeBasedResult) -> Vec<VertexId> {
    let (forward_state, reverse_state) = &result.meeting_state;
    stitched_vertices(&result.forward_tree, &result.reverse_tree, forward_state, reverse_state)
}

fn stitched_path_is_valid(path: &[VertexId], restrictions: &RestrictionsIndex, profile_id: u16) -> bool {
    for end in 2..=path.len() {
        let candidate = path[end - 1];
        let trailing = &path[..end - 1];
        if restrictions.forbids_extension(profile_id, trailing, candidate) {
            return false;
        }
    }
    true
}

/// checks whether the state just settled on one side completes a valid,
/// improving path with every trail variant known on the other side at the
/// same vertex.
#[allow(clippy::too_many_arguments)]
fn try_meet(
    restrictions: &RestrictionsIndex,
    profile_id: u16,
    forward: &RestrictedFrontier,
    reverse: &RestrictedFrontier,
    settled_state: &TrailState,
    settled_weight: f64,
    settled_is_forward: bool,
    best_weight: &mut f64,
    meeting: &mut Option<(TrailState, TrailState)>,
) {
    let vertex = settled_state.vertex;
    let opposite_states = if settled_is_forward {
        reverse.states_at(vertex)
    } else {
        forward.states_at(vertex)
    };
    for other in opposite_states {
        let other_weight = if settled_is_forward {
            reverse.tree.weight_of(other.clone())
        } else {
            forward.tree.weight_of(other.clone())
        };
        let Some(other_weight) = other_weight else {
            continue;
        };
        let total = settled_weight + other_weight;
        if total >= *best_weight {
            continue;
        }
        let (forward_state, reverse_state) = if settled_is_forward {
            (settled_state, other)
        } else {
            (other, settled_state)
        };
        let stitched = stitched_vertices(&forward.tree, &reverse.tree, forward_state, reverse_state);
        if stitched_path_is_valid(&stitched, restrictions, profile_id) {
            *best_weight = total;
            *meeting = Some((forward_state.clone(), reverse_state.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::{Edge, Vertex};
    use crate::model::profile::profile::test::MockProfile;
    use crate::model::restriction::Restriction;

    fn line_graph() -> Graph {
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(1, 0.0, 1.0),
            Vertex::new(2, 0.0, 2.0),
            Vertex::new(3, 0.0, 3.0),
        ]
        .into_boxed_slice();
        let edges = vec![
            Edge::new(0, 0, 1, 10.0, 0, 0, None, false),
            Edge::new(1, 1, 2, 10.0, 0, 0, None, false),
            Edge::new(2, 2, 3, 10.0, 0, 0, None, false),
            Edge::new(3, 0, 3, 100.0, 0, 0, None, false),
        ]
        .into_boxed_slice();
        Graph::new(vertices, edges).unwrap()
    }

    #[test]
    fn test_unrestricted_matches_plain_shortest_path() {
        let graph = line_graph();
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        let restrictions = RestrictionsIndex::empty();
        let options = SearchOptions::default();

        let result = run(
            &graph,
            &cache,
            &restrictions,
            0,
            &[(VertexId(0), 0.0)],
            &[(VertexId(3), 0.0)],
            VertexId(0),
            VertexId(3),
            &options,
        )
        .unwrap();
        assert_eq!(result.weight, 30.0);
    }

    #[test]
    fn test_restriction_forces_longer_path() {
        let graph = line_graph();
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        let mut restrictions = RestrictionsIndex::empty();
        restrictions.insert(
            0,
            Restriction::new(vec![VertexId(0), VertexId(1), VertexId(2)]).unwrap(),
        );
        let options = SearchOptions::default();

        let result = run(
            &graph,
            &cache,
            &restrictions,
            0,
            &[(VertexId(0), 0.0)],
            &[(VertexId(3), 0.0)],
            VertexId(0),
            VertexId(3),
            &options,
        )
        .unwrap();
        // the direct 0-1-2-3 chain is forbidden past vertex 2, so the only
        // remaining path is the 100-weight shortcut edge 0->3.
        assert_eq!(result.weight, 100.0);
    }
}
