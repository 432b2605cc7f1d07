use crate::model::contracted::{ContractedGraph, EdgeBasedContractedGraph};
use crate::model::network::{DirectedEdgeId, Edge, Graph, VertexId};
use crate::model::profile::ProfileFactorCache;
use crate::model::resolver::RouterPoint;
use crate::model::restriction::RestrictionsIndex;

use super::search_error::SearchError;
use super::search_options::SearchOptions;
use super::{bidirectional, contracted, edge_based, edge_based_contracted};

/// which of the five kernels a query was routed to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum KernelKind {
    /// 4.2.2: bidirectional Dijkstra over the uncontracted graph.
    Bidirectional,
    /// 4.2.3 wrapped as bidirectional: restriction-aware, uncontracted.
    EdgeBased,
    /// 4.2.4: contracted bidirectional, node-based.
    ContractedNodeBased,
    /// 4.2.5: contracted bidirectional, edge-based.
    ContractedEdgeBased,
}

/// everything a query needs to pick and run a kernel: the immutable network
/// state for one profile, plus per-query budgets. borrowed for the
/// lifetime of a single query; the engine owns all of it behind `Arc`.
pub struct KernelContext<'a> {
    pub graph: &'a Graph,
    pub cache: &'a ProfileFactorCache,
    pub restrictions: &'a RestrictionsIndex,
    pub profile_id: u16,
    pub contracted: Option<&'a ContractedGraph>,
    pub edge_based_contracted: Option<&'a EdgeBasedContractedGraph>,
    pub options: &'a SearchOptions,
}

impl<'a> KernelContext<'a> {
    pub(crate) fn has_contracted(&self) -> bool {
        self.contracted.is_some()
    }

    /// "complex restrictions" means the profile has at least one registered
    /// restriction; a profile with none is served by the plain kernels
    /// regardless of whether a contracted graph exists.
    pub(crate) fn has_complex_restrictions(&self) -> bool {
        !self.restrictions.is_empty_for(self.profile_id)
    }

    pub(crate) fn has_edge_based_hierarchy(&self) -> bool {
        self.edge_based_contracted.is_some()
    }
}

/// a completed route before the route builder expands it into
/// coordinates: the vertex path and its total weight. empty `vertices` means
/// the trip stayed on a single edge.
#[derive(Clone, Debug)]
pub struct KernelRoute {
    pub vertices: Vec<VertexId>,
    pub weight: f64,
}

/// selects a kernel from the capabilities configured for a profile. the one
/// combination with no direct kernel (contracted graph present, complex
/// restrictions present, no edge-based hierarchy) falls back to the
/// uncontracted restriction-aware kernel and logs a warning.
fn select_kernel(ctx: &KernelContext) -> KernelKind {
    match (
        ctx.has_contracted(),
        ctx.has_complex_restrictions(),
        ctx.has_edge_based_hierarchy(),
    ) {
        (false, false, _) => KernelKind::Bidirectional,
        (false, true, _) => KernelKind::EdgeBased,
        (true, false, _) => KernelKind::ContractedNodeBased,
        (true, true, true) => KernelKind::ContractedEdgeBased,
        (true, true, false) => {
            log::warn!(
                "profile {} has a contracted graph and restrictions but no edge-based \
                 hierarchy; falling back to the uncontracted restriction-aware kernel",
                ctx.profile_id
            );
            KernelKind::EdgeBased
        }
    }
}

/// roots for a forward-direction frontier starting inside `edge` at `point`
///. the frontier can reach
/// `edge.to` by finishing the edge forward, or `edge.from` by traversing the
/// already-covered portion backward, whichever directions the profile
/// allows.
pub(crate) fn source_vertex_roots(edge: &Edge, point: &RouterPoint, cache: &ProfileFactorCache) -> Vec<(VertexId, f64)> {
    let factor = cache.factor(edge.profile_id);
    if !factor.is_traversable() {
        return Vec::new();
    }
    let mut roots = Vec::new();
    if factor.direction.allows_forward() {
        roots.push((edge.to, point.distance_to_destination(edge) / factor.value));
    }
    if factor.direction.allows_backward() {
        roots.push((edge.from, point.distance_from_origin(edge) / factor.value));
    }
    roots
}

/// roots for a reverse-direction frontier ending inside `edge` at `point`:
/// mirror image of [`source_vertex_roots`], since a reverse search walks the
/// same edge toward the query point rather than away from it.
pub(crate) fn target_vertex_roots(edge: &Edge, point: &RouterPoint, cache: &ProfileFactorCache) -> Vec<(VertexId, f64)> {
    let factor = cache.factor(edge.profile_id);
    if !factor.is_traversable() {
        return Vec::new();
    }
    let mut roots = Vec::new();
    if factor.direction.allows_forward() {
        roots.push((edge.from, point.distance_from_origin(edge) / factor.value));
    }
    if factor.direction.allows_backward() {
        roots.push((edge.to, point.distance_to_destination(edge) / factor.value));
    }
    roots
}

pub(crate) fn source_directed_roots(edge: &Edge, point: &RouterPoint, cache: &ProfileFactorCache) -> Vec<(DirectedEdgeId, f64)> {
    let factor = cache.factor(edge.profile_id);
    if !factor.is_traversable() {
        return Vec::new();
    }
    let mut roots = Vec::new();
    if factor.direction.allows_forward() {
        roots.push((
            edge.edge_id.directed(true),
            point.distance_to_destination(edge) / factor.value,
        ));
    }
    if factor.direction.allows_backward() {
        roots.push((
            edge.edge_id.directed(false),
            point.distance_from_origin(edge) / factor.value,
        ));
    }
    roots
}

pub(crate) fn target_directed_roots(edge: &Edge, point: &RouterPoint, cache: &ProfileFactorCache) -> Vec<(DirectedEdgeId, f64)> {
    let factor = cache.factor(edge.profile_id);
    if !factor.is_traversable() {
        return Vec::new();
    }
    let mut roots = Vec::new();
    if factor.direction.allows_forward() {
        roots.push((
            edge.edge_id.directed(true),
            point.distance_from_origin(edge) / factor.value,
        ));
    }
    if factor.direction.allows_backward() {
        roots.push((
            edge.edge_id.directed(false),
            point.distance_to_destination(edge) / factor.value,
        ));
    }
    roots
}

fn run_bidirectional(
    ctx: &KernelContext,
    source: RouterPoint,
    target: RouterPoint,
) -> Result<KernelRoute, SearchError> {
    let source_edge = ctx.graph.get_edge(&source.edge_id)?;
    let target_edge = ctx.graph.get_edge(&target.edge_id)?;
    let forward_roots = source_vertex_roots(source_edge, &source, ctx.cache);
    let reverse_roots = target_vertex_roots(target_edge, &target, ctx.cache);
    let result = bidirectional::run(
        ctx.graph,
        ctx.cache,
        &forward_roots,
        &reverse_roots,
        source_edge.to,
        target_edge.from,
        ctx.options,
    )?;
    let vertices = bidirectional::materialize_route(&result);
    Ok(KernelRoute {
        vertices,
        weight: result.weight,
    })
}

fn run_edge_based(
    ctx: &KernelContext,
    source: RouterPoint,
    target: RouterPoint,
) -> Result<KernelRoute, SearchError> {
    let source_edge = ctx.graph.get_edge(&source.edge_id)?;
    let target_edge = ctx.graph.get_edge(&target.edge_id)?;
    let forward_roots = source_vertex_roots(source_edge, &source, ctx.cache);
    let reverse_roots = target_vertex_roots(target_edge, &target, ctx.cache);
    let result = edge_based::run(
        ctx.graph,
        ctx.cache,
        ctx.restrictions,
        ctx.profile_id,
        &forward_roots,
        &reverse_roots,
        source_edge.to,
        target_edge.from,
        ctx.options,
    )?;
    let vertices = edge_based::materialize_route(&result);
    Ok(KernelRoute {
        vertices,
        weight: result.weight,
    })
}

fn run_contracted_node_based(
    ctx: &KernelContext,
    source: RouterPoint,
    target: RouterPoint,
) -> Result<KernelRoute, SearchError> {
    let hierarchy = ctx.contracted.ok_or_else(|| {
        SearchError::InternalError("contracted kernel selected without a contracted graph".to_string())
    })?;
    let source_edge = ctx.graph.get_edge(&source.edge_id)?;
    let target_edge = ctx.graph.get_edge(&target.edge_id)?;
    let forward_roots = source_vertex_roots(source_edge, &source, ctx.cache);
    let reverse_roots = target_vertex_roots(target_edge, &target, ctx.cache);
    let result = contracted::run(
        hierarchy,
        &forward_roots,
        &reverse_roots,
        source_edge.to,
        target_edge.from,
        ctx.options,
    )?;
    let vertices = contracted::materialize_route(
        hierarchy,
        &result.forward_tree,
        &result.reverse_tree,
        result.meeting_vertex,
    );
    Ok(KernelRoute {
        vertices,
        weight: result.weight,
    })
}

fn run_contracted_edge_based(
    ctx: &KernelContext,
    source: RouterPoint,
    target: RouterPoint,
) -> Result<KernelRoute, SearchError> {
    let hierarchy = ctx.edge_based_contracted.ok_or_else(|| {
        SearchError::InternalError(
            "edge-based contracted kernel selected without an edge-based hierarchy".to_string(),
        )
    })?;
    let source_edge = ctx.graph.get_edge(&source.edge_id)?;
    let target_edge = ctx.graph.get_edge(&target.edge_id)?;
    let forward_roots = source_directed_roots(source_edge, &source, ctx.cache);
    let reverse_roots = target_directed_roots(target_edge, &target, ctx.cache);
    let source_directed = source_edge.edge_id.directed(true);
    let target_directed = target_edge.edge_id.directed(true);
    let result = edge_based_contracted::run(
        hierarchy,
        &forward_roots,
        &reverse_roots,
        source_directed,
        target_directed,
        ctx.options,
    )?;
    let vertices = edge_based_contracted::materialize_route(
        ctx.graph,
        hierarchy,
        &result.forward_tree,
        &result.reverse_tree,
        result.meeting_edge,
    );
    Ok(KernelRoute {
        vertices,
        weight: result.weight,
    })
}

/// the direct on-edge path when `source` and `target` resolve to the same
/// edge: forward along the edge if the source offset does not
/// exceed the target offset, otherwise a U-turn at whichever endpoint the
/// profile both permits entering from one side and stopping on. returns
/// `None` when no such path exists (impassable profile, or a required
/// direction/stoppability condition fails), in which case the search-produced
/// path stands.
pub(crate) fn same_edge_route(ctx: &KernelContext, source: RouterPoint, target: RouterPoint) -> Option<KernelRoute> {
    let edge = ctx.graph.get_edge(&source.edge_id).ok()?;
    let factor = ctx.cache.factor(edge.profile_id);
    if !factor.is_traversable() {
        return None;
    }

    if source.offset <= target.offset {
        if !factor.direction.allows_forward() {
            return None;
        }
        let distance = (target.offset as f64 - source.offset as f64) / u16::MAX as f64 * edge.distance;
        return Some(KernelRoute {
            vertices: Vec::new(),
            weight: distance / factor.value,
        });
    }

    let mut candidates: Vec<KernelRoute> = Vec::new();
    if factor.direction.allows_forward() && factor.direction.allows_backward() && ctx.cache.can_stop_on(edge.profile_id)
    {
        // U-turn at `to`: forward from source to the end, then backward to target.
        let distance = source.distance_to_destination(edge) + target.distance_to_destination(edge);
        candidates.push(KernelRoute {
            vertices: vec![edge.to],
            weight: distance / factor.value,
        });
        // U-turn at `from`: backward from source to the start, then forward to target.
        let distance = source.distance_from_origin(edge) + target.distance_from_origin(edge);
        candidates.push(KernelRoute {
            vertices: vec![edge.from],
            weight: distance / factor.value,
        });
    }
    candidates
        .into_iter()
        .min_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap_or(std::cmp::Ordering::Equal))
}

/// picks a kernel and runs it, then checks the same-edge shortcut. the
/// shortcut replaces the searched path only when it is strictly shorter,
/// preferring the searched path on ties so reconstruction work is not
/// duplicated needlessly.
pub fn run(ctx: &KernelContext, source: RouterPoint, target: RouterPoint) -> Result<KernelRoute, SearchError> {
    let kind = select_kernel(ctx);
    let mut route = match kind {
        KernelKind::Bidirectional => run_bidirectional(ctx, source, target)?,
        KernelKind::EdgeBased => run_edge_based(ctx, source, target)?,
        KernelKind::ContractedNodeBased => run_contracted_node_based(ctx, source, target)?,
        KernelKind::ContractedEdgeBased => run_contracted_edge_based(ctx, source, target)?,
    };

    if source.edge_id == target.edge_id {
        if let Some(direct) = same_edge_route(ctx, source, target) {
            if direct.weight < route.weight {
                route = direct;
            }
        }
    }

    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::{Edge, Graph, Vertex};
    use crate::model::profile::profile::test::MockProfile;
    use crate::model::profile::ProfileFactorCache;
    use crate::model::restriction::Restriction;

    fn line_graph() -> Graph {
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(1, 0.0, 1.0),
            Vertex::new(2, 0.0, 2.0),
        ]
        .into_boxed_slice();
        let edges = vec![
            Edge::new(0, 0, 1, 100.0, 0, 0, None, false),
            Edge::new(1, 1, 2, 100.0, 0, 0, None, false),
        ]
        .into_boxed_slice();
        Graph::new(vertices, edges).unwrap()
    }

    #[test]
    fn test_select_kernel_defaults_to_bidirectional() {
        let graph = line_graph();
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        let restrictions = RestrictionsIndex::empty();
        let options = SearchOptions::default();
        let ctx = KernelContext {
            graph: &graph,
            cache: &cache,
            restrictions: &restrictions,
            profile_id: 0,
            contracted: None,
            edge_based_contracted: None,
            options: &options,
        };
        assert_eq!(select_kernel(&ctx), KernelKind::Bidirectional);
    }

    #[test]
    fn test_select_kernel_uses_edge_based_with_restrictions() {
        let graph = line_graph();
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        let mut restrictions = RestrictionsIndex::empty();
        restrictions.insert(0, Restriction::new(vec![VertexId(0), VertexId(1), VertexId(2)]).unwrap());
        let options = SearchOptions::default();
        let ctx = KernelContext {
            graph: &graph,
            cache: &cache,
            restrictions: &restrictions,
            profile_id: 0,
            contracted: None,
            edge_based_contracted: None,
            options: &options,
        };
        assert_eq!(select_kernel(&ctx), KernelKind::EdgeBased);
    }

    #[test]
    fn test_run_picks_shorter_same_edge_direct_path() {
        let graph = line_graph();
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        let restrictions = RestrictionsIndex::empty();
        let options = SearchOptions::default();
        let ctx = KernelContext {
            graph: &graph,
            cache: &cache,
            restrictions: &restrictions,
            profile_id: 0,
            contracted: None,
            edge_based_contracted: None,
            options: &options,
        };
        let source = RouterPoint::new(crate::model::network::EdgeId(0), 10_000, 0.0, 0.0);
        let target = RouterPoint::new(crate::model::network::EdgeId(0), 20_000, 0.0, 0.0);
        let route = run(&ctx, source, target).unwrap();
        assert!(route.vertices.is_empty());
        let expected = (20_000.0 - 10_000.0) / u16::MAX as f64 * 100.0;
        assert!((route.weight - expected).abs() < 1e-6);
    }
}
