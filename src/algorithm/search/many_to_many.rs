use std::collections::HashMap;

use kdam::BarExt;
use rayon::prelude::*;

use crate::model::contracted::{ContractedGraph, EdgeBasedContractedGraph};
use crate::model::network::{DirectedEdgeId, VertexId};
use crate::model::resolver::RouterPoint;

use super::direction::Direction;
use super::kernel::{self, KernelContext, KernelRoute};
use super::search_error::SearchError;
use super::search_tree::SearchTree;
use super::{contracted, edge_based_contracted, plain_dijkstra};

/// weights from every `sources` point to every `targets` point,
/// laid out `weights[i][j]` = cost of source `i` to target `j`. a source or
/// target whose row/column is mostly unreachable is flagged rather than
/// silently reported as infinite everywhere.
pub struct ManyToManyWeights {
    pub weights: Vec<Vec<f64>>,
    pub invalid_sources: Vec<usize>,
    pub invalid_targets: Vec<usize>,
}

/// computes the full weight matrix, picking among three strategies
/// depending on what hierarchies the profile has:
///
/// - a contracted graph with no complex restrictions: one-sided upward
///   searches from every source and target, intersected at their common
///   "middle set" of settled vertices.
/// - a contracted graph, complex restrictions, and an edge-based hierarchy:
///   the same intersection, keyed by directed edge rather than vertex.
/// - anything else: a plain Dijkstra from every source, augmented to keep
///   relaxing until every target has settled.
pub fn calculate_weights(
    ctx: &KernelContext,
    sources: &[RouterPoint],
    targets: &[RouterPoint],
) -> Result<ManyToManyWeights, SearchError> {
    let mut weights = if ctx.has_contracted() && ctx.has_complex_restrictions() && ctx.has_edge_based_hierarchy() {
        edge_based_contracted_weights(ctx, sources, targets)?
    } else if ctx.has_contracted() && !ctx.has_complex_restrictions() {
        contracted_weights(ctx, sources, targets)?
    } else {
        fallback_weights(ctx, sources, targets)?
    };
    apply_same_edge_shortcut(ctx, &mut weights, sources, targets);

    let (invalid_sources, invalid_targets) = mark_invalid(&weights, sources, targets);
    Ok(ManyToManyWeights {
        weights,
        invalid_sources,
        invalid_targets,
    })
}

fn contracted_weights(
    ctx: &KernelContext,
    sources: &[RouterPoint],
    targets: &[RouterPoint],
) -> Result<Vec<Vec<f64>>, SearchError> {
    let hierarchy: &ContractedGraph = ctx.contracted.ok_or_else(|| {
        SearchError::InternalError("many-to-many contracted weights requested without a contracted graph".to_string())
    })?;

    let forward_trees: Vec<SearchTree<VertexId, usize>> = sources
        .par_iter()
        .map(|point| -> Result<_, SearchError> {
            let edge = ctx.graph.get_edge(&point.edge_id)?;
            let roots = kernel::source_vertex_roots(edge, point, ctx.cache);
            contracted::run_one_sided(hierarchy, &roots, false, ctx.options)
        })
        .collect::<Result<_, _>>()?;

    let reverse_trees: Vec<SearchTree<VertexId, usize>> = targets
        .par_iter()
        .map(|point| -> Result<_, SearchError> {
            let edge = ctx.graph.get_edge(&point.edge_id)?;
            let roots = kernel::target_vertex_roots(edge, point, ctx.cache);
            contracted::run_one_sided(hierarchy, &roots, true, ctx.options)
        })
        .collect::<Result<_, _>>()?;

    Ok(intersect_middle_sets(&forward_trees, &reverse_trees, "many-to-many (node-based)"))
}

fn edge_based_contracted_weights(
    ctx: &KernelContext,
    sources: &[RouterPoint],
    targets: &[RouterPoint],
) -> Result<Vec<Vec<f64>>, SearchError> {
    let hierarchy: &EdgeBasedContractedGraph = ctx.edge_based_contracted.ok_or_else(|| {
        SearchError::InternalError(
            "many-to-many edge-based weights requested without an edge-based hierarchy".to_string(),
        )
    })?;

    let forward_trees: Vec<SearchTree<DirectedEdgeId, usize>> = sources
        .par_iter()
        .map(|point| -> Result<_, SearchError> {
            let edge = ctx.graph.get_edge(&point.edge_id)?;
            let roots = kernel::source_directed_roots(edge, point, ctx.cache);
            edge_based_contracted::run_one_sided(hierarchy, &roots, false, ctx.options)
        })
        .collect::<Result<_, _>>()?;

    let reverse_trees: Vec<SearchTree<DirectedEdgeId, usize>> = targets
        .par_iter()
        .map(|point| -> Result<_, SearchError> {
            let edge = ctx.graph.get_edge(&point.edge_id)?;
            let roots = kernel::target_directed_roots(edge, point, ctx.cache);
            edge_based_contracted::run_one_sided(hierarchy, &roots, true, ctx.options)
        })
        .collect::<Result<_, _>>()?;

    Ok(intersect_middle_sets(&forward_trees, &reverse_trees, "many-to-many (edge-based)"))
}

/// for every (forward, reverse) tree pair, sums the weights of every node
/// both trees settled and keeps the smallest: the standard middle-set
/// intersection used by contracted many-to-many queries.
fn intersect_middle_sets<K: Clone + Eq + std::hash::Hash, E>(
    forward_trees: &[SearchTree<K, E>],
    reverse_trees: &[SearchTree<K, E>],
    desc: &str,
) -> Vec<Vec<f64>> {
    let mut bar = kdam::Bar::builder()
        .total(forward_trees.len())
        .desc(desc.to_string())
        .build()
        .ok();

    let mut weights = Vec::with_capacity(forward_trees.len());
    for forward in forward_trees {
        let forward_map: HashMap<K, f64> = forward.entries().collect();
        let row: Vec<f64> = reverse_trees
            .iter()
            .map(|reverse| {
                reverse
                    .entries()
                    .filter_map(|(node, w)| forward_map.get(&node).map(|fw| fw + w))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        weights.push(row);
        if let Some(pb) = bar.as_mut() {
            let _ = pb.update(1);
        }
    }
    weights
}

/// the uncontracted fallback: a plain Dijkstra from each source,
/// kept alive until every target vertex has settled. restriction-aware
/// edge-based many-to-many has no batch form, so this path is also used
/// whenever a profile's restrictions lack a matching edge-based hierarchy.
fn fallback_weights(
    ctx: &KernelContext,
    sources: &[RouterPoint],
    targets: &[RouterPoint],
) -> Result<Vec<Vec<f64>>, SearchError> {
    let target_finishes: Vec<Vec<(VertexId, f64)>> = targets
        .iter()
        .map(|point| -> Result<_, SearchError> {
            let edge = ctx.graph.get_edge(&point.edge_id)?;
            Ok(kernel::target_vertex_roots(edge, point, ctx.cache))
        })
        .collect::<Result<_, _>>()?;
    let target_vertices: Vec<VertexId> = target_finishes
        .iter()
        .flat_map(|finishes| finishes.iter().map(|&(v, _)| v))
        .collect();

    sources
        .par_iter()
        .map(|point| -> Result<Vec<f64>, SearchError> {
            let edge = ctx.graph.get_edge(&point.edge_id)?;
            let roots = kernel::source_vertex_roots(edge, point, ctx.cache);
            let tree = plain_dijkstra::run_until_all_settled(
                ctx.graph,
                ctx.cache,
                Direction::Forward,
                &roots,
                &target_vertices,
                ctx.options,
            )?;
            Ok(target_finishes
                .iter()
                .map(|finishes| {
                    finishes
                        .iter()
                        .filter_map(|&(v, finish_cost)| tree.weight_of(v).map(|w| w + finish_cost))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect())
        })
        .collect()
}

/// overrides each `weights[i][j]` whose source and target resolve to the
/// same edge with the direct on-edge path when that path is strictly
/// shorter, mirroring the shortcut `kernel::run` applies to a single pair;
/// none of the three batch strategies above account for the on-edge case on
/// their own.
fn apply_same_edge_shortcut(ctx: &KernelContext, weights: &mut [Vec<f64>], sources: &[RouterPoint], targets: &[RouterPoint]) {
    for (i, row) in weights.iter_mut().enumerate() {
        for (j, w) in row.iter_mut().enumerate() {
            if sources[i].edge_id == targets[j].edge_id {
                if let Some(direct) = kernel::same_edge_route(ctx, sources[i], targets[j]) {
                    if direct.weight < *w {
                        *w = direct.weight;
                    }
                }
            }
        }
    }
}

/// flags a source or target whose row/column is mostly unreachable: among
/// the entries not involving an exact source-target self-match, a
/// row/column is invalid once more than half are unreachable, i.e.
/// `unreachable > (comparable - 1) / 2`.
fn mark_invalid(
    weights: &[Vec<f64>],
    sources: &[RouterPoint],
    targets: &[RouterPoint],
) -> (Vec<usize>, Vec<usize>) {
    let mut invalid_sources = Vec::new();
    for (i, row) in weights.iter().enumerate() {
        let mut comparable = 0usize;
        let mut unreachable = 0usize;
        for (j, &w) in row.iter().enumerate() {
            if sources[i] == targets[j] {
                continue;
            }
            comparable += 1;
            if !w.is_finite() {
                unreachable += 1;
            }
        }
        let threshold = (comparable as f64 - 1.0) / 2.0;
        if comparable > 0 && unreachable as f64 > threshold {
            invalid_sources.push(i);
        }
    }

    let mut invalid_targets = Vec::new();
    for j in 0..targets.len() {
        let mut comparable = 0usize;
        let mut unreachable = 0usize;
        for (i, row) in weights.iter().enumerate() {
            if sources[i] == targets[j] {
                continue;
            }
            comparable += 1;
            if !row[j].is_finite() {
                unreachable += 1;
            }
        }
        let threshold = (comparable as f64 - 1.0) / 2.0;
        if comparable > 0 && unreachable as f64 > threshold {
            invalid_targets.push(j);
        }
    }

    (invalid_sources, invalid_targets)
}

/// full routes between every source and target. unlike
/// [`calculate_weights`], this always uses the uncontracted engine: a
/// contracted route still has to be unpacked edge by edge, which costs as
/// much as just materializing the path from an augmented plain search in
/// the first place.
pub fn calculate_routes(
    ctx: &KernelContext,
    sources: &[RouterPoint],
    targets: &[RouterPoint],
) -> Result<Vec<Vec<Option<KernelRoute>>>, SearchError> {
    let target_finishes: Vec<Vec<(VertexId, f64)>> = targets
        .iter()
        .map(|point| -> Result<_, SearchError> {
            let edge = ctx.graph.get_edge(&point.edge_id)?;
            Ok(kernel::target_vertex_roots(edge, point, ctx.cache))
        })
        .collect::<Result<_, _>>()?;
    let target_vertices: Vec<VertexId> = target_finishes
        .iter()
        .flat_map(|finishes| finishes.iter().map(|&(v, _)| v))
        .collect();

    sources
        .par_iter()
        .map(|source| -> Result<Vec<Option<KernelRoute>>, SearchError> {
            let source_edge = ctx.graph.get_edge(&source.edge_id)?;
            let roots = kernel::source_vertex_roots(source_edge, source, ctx.cache);
            let tree = plain_dijkstra::run_until_all_settled(
                ctx.graph,
                ctx.cache,
                Direction::Forward,
                &roots,
                &target_vertices,
                ctx.options,
            )?;

            let mut row = Vec::with_capacity(targets.len());
            for (j, target) in targets.iter().enumerate() {
                let mut best = target_finishes[j]
                    .iter()
                    .filter_map(|&(v, finish_cost)| {
                        tree.weight_of(v).map(|w| (w + finish_cost, tree.path_to(v)))
                    })
                    .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(weight, vertices)| KernelRoute { vertices, weight });

                if source.edge_id == target.edge_id {
                    if let Some(direct) = kernel::same_edge_route(ctx, *source, *target) {
                        best = match best {
                            Some(searched) if searched.weight < direct.weight => Some(searched),
                            _ => Some(direct),
                        };
                    }
                }
                row.push(best);
            }
            Ok(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::{Edge, EdgeId, Graph, Vertex};
    use crate::model::profile::profile::test::MockProfile;
    use crate::model::profile::ProfileFactorCache;
    use crate::model::restriction::RestrictionsIndex;
    use crate::algorithm::search::search_options::SearchOptions;

    fn line_graph() -> Graph {
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(1, 0.0, 1.0),
            Vertex::new(2, 0.0, 2.0),
            Vertex::new(3, 0.0, 3.0),
        ]
        .into_boxed_slice();
        let edges = vec![
            Edge::new(0, 0, 1, 100.0, 0, 0, None, false),
            Edge::new(1, 1, 2, 100.0, 0, 0, None, false),
            Edge::new(2, 2, 3, 100.0, 0, 0, None, false),
        ]
        .into_boxed_slice();
        Graph::new(vertices, edges).unwrap()
    }

    #[test]
    fn test_fallback_weights_chains_across_vertices() {
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
        let sources = vec![RouterPoint::new(EdgeId(0), 0, 0.0, 0.0)];
        let targets = vec![RouterPoint::new(EdgeId(2), u16::MAX, 0.0, 0.0)];
        let result = calculate_weights(&ctx, &sources, &targets).unwrap();
        assert!((result.weights[0][0] - 300.0).abs() < 1e-6);
        assert!(result.invalid_sources.is_empty());
        assert!(result.invalid_targets.is_empty());
    }

    #[test]
    fn test_calculate_weights_applies_same_edge_shortcut() {
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
        let sources = vec![RouterPoint::new(EdgeId(0), 10_000, 0.0, 0.0)];
        let targets = vec![RouterPoint::new(EdgeId(0), 20_000, 0.0, 0.0)];
        let result = calculate_weights(&ctx, &sources, &targets).unwrap();
        let expected = (20_000.0 - 10_000.0) / u16::MAX as f64 * 100.0;
        assert!((result.weights[0][0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_mark_invalid_flags_mostly_unreachable_source() {
        let weights = vec![vec![1.0, f64::INFINITY, f64::INFINITY], vec![1.0, 1.0, 1.0]];
        let sources = vec![
            RouterPoint::new(EdgeId(0), 0, 0.0, 0.0),
            RouterPoint::new(EdgeId(1), 0, 0.0, 0.0),
        ];
        let targets = vec![
            RouterPoint::new(EdgeId(2), 0, 0.0, 0.0),
            RouterPoint::new(EdgeId(3), 0, 0.0, 0.0),
            RouterPoint::new(EdgeId(4), 0, 0.0, 0.0),
        ];
        let (invalid_sources, invalid_targets) = mark_invalid(&weights, &sources, &targets);
        assert_eq!(invalid_sources, vec![0]);
        assert!(invalid_targets.is_empty());
    }

    #[test]
    fn test_calculate_routes_uses_uncontracted_engine() {
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
        let sources = vec![RouterPoint::new(EdgeId(0), 0, 0.0, 0.0)];
        let targets = vec![RouterPoint::new(EdgeId(2), u16::MAX, 0.0, 0.0)];
        let routes = calculate_routes(&ctx, &sources, &targets).unwrap();
        let route = routes[0][0].as_ref().unwrap();
        assert!((route.weight - 300.0).abs() < 1e-6);
        assert_eq!(route.vertices, vec![VertexId(0), VertexId(1), VertexId(2), VertexId(3)]);
    }
}
