use std::sync::Arc;

use indexmap::IndexMap;

use crate::algorithm::search::{kernel, many_to_many, plain_dijkstra, Direction, KernelContext, SearchOptions};
use crate::model::contracted::{ContractedGraph, EdgeBasedContractedGraph};
use crate::model::network::{Edge, Graph};
use crate::model::profile::{Profile, ProfileFactorCache, TableProfile};
use crate::model::resolver::{Resolver, RouterPoint, SpatialIndexResolver, DEFAULT_RADIUS_METERS};
use crate::model::restriction::RestrictionsIndex;
use crate::model::route::{DefaultRouteBuilder, Route, RouteBuilder};

use super::engine_config::EngineConfig;
use super::engine_error::EngineError;

/// everything the engine holds for one named profile: its small integer id,
/// the `Profile` implementation itself (kept so `can_stop_on`/`factor` remain
/// available outside the hot search path, e.g. for diagnostics), its
/// precomputed factor cache, and whichever contracted hierarchies were
/// configured for it.
struct ProfileHandle {
    profile_id: u16,
    #[allow(dead_code)]
    profile: Arc<dyn Profile>,
    cache: ProfileFactorCache,
    contracted: Option<Arc<ContractedGraph>>,
    edge_based_contracted: Option<Arc<EdgeBasedContractedGraph>>,
}

/// aggregates every piece of immutable, shared state a query needs: the
/// road network, one [`ProfileHandle`] per configured profile name, a shared
/// restrictions index, a resolver, and a route builder. all fields are
/// `Arc`-wrapped or owned directly so the engine can be cloned cheaply and
/// shared across threads with no locking.
pub struct RoutingEngine {
    graph: Arc<Graph>,
    profiles: IndexMap<String, ProfileHandle>,
    restrictions: Arc<RestrictionsIndex>,
    resolver: Arc<dyn Resolver>,
    route_builder: Arc<dyn RouteBuilder>,
    verify_all_stoppable: bool,
}

impl RoutingEngine {
    /// builds an engine from file-backed configuration: loads the
    /// graph, every configured profile's factor table and optional contracted
    /// hierarchies, and the shared restrictions index, then builds the
    /// default spatial-index resolver over the loaded graph.
    pub fn new(config: &EngineConfig) -> Result<RoutingEngine, EngineError> {
        let graph = Arc::new(Graph::try_from(&config.graph)?);
        let restrictions = Arc::new(match &config.restrictions {
            Some(cfg) => RestrictionsIndex::try_from(cfg)?,
            None => RestrictionsIndex::empty(),
        });
        let n_edge_profiles = graph
            .edges()
            .map(|e| e.profile_id as usize + 1)
            .max()
            .unwrap_or(0);

        let mut profiles = IndexMap::new();
        for entry in &config.profiles {
            let table_profile = TableProfile::try_from(&entry.table)?;
            let cache = ProfileFactorCache::build(&table_profile, n_edge_profiles)?;
            let contracted = entry
                .contracted
                .as_ref()
                .map(ContractedGraph::try_from)
                .transpose()?
                .map(Arc::new);
            let edge_based_contracted = entry
                .edge_based_contracted
                .as_ref()
                .map(EdgeBasedContractedGraph::try_from)
                .transpose()?
                .map(Arc::new);
            profiles.insert(
                table_profile.name().to_string(),
                ProfileHandle {
                    profile_id: entry.profile_id,
                    profile: Arc::new(table_profile),
                    cache,
                    contracted,
                    edge_based_contracted,
                },
            );
        }

        let resolver: Arc<dyn Resolver> = Arc::new(SpatialIndexResolver::build(graph.clone())?);

        Ok(RoutingEngine {
            graph,
            profiles,
            restrictions,
            resolver,
            route_builder: Arc::new(DefaultRouteBuilder),
            verify_all_stoppable: config.verify_all_stoppable,
        })
    }

    /// replaces the default resolver with a custom one.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// replaces the default route builder with a custom one.
    pub fn with_route_builder(mut self, route_builder: Arc<dyn RouteBuilder>) -> Self {
        self.route_builder = route_builder;
        self
    }

    fn handle(&self, profile: &str) -> Result<&ProfileHandle, EngineError> {
        self.profiles
            .get(profile)
            .ok_or_else(|| EngineError::ProfileUnsupported(profile.to_string()))
    }

    fn kernel_context<'a>(&'a self, handle: &'a ProfileHandle, options: &'a SearchOptions) -> KernelContext<'a> {
        KernelContext {
            graph: &self.graph,
            cache: &handle.cache,
            restrictions: &self.restrictions,
            profile_id: handle.profile_id,
            contracted: handle.contracted.as_deref(),
            edge_based_contracted: handle.edge_based_contracted.as_deref(),
            options,
        }
    }

    /// `supports_all(profiles) -> bool`.
    pub fn supports_all(&self, profiles: &[String]) -> bool {
        profiles.iter().all(|p| self.profiles.contains_key(p))
    }

    /// resolves a coordinate to a [`RouterPoint`] acceptable to
    /// every named profile, optionally breaking ties with `is_better`. fails
    /// with [`EngineError::ResolverFailure`] if no edge lies within
    /// `max_search_distance` (default 50m).
    pub fn try_resolve(
        &self,
        profiles: &[String],
        latitude: f32,
        longitude: f32,
        is_better: Option<&dyn Fn(&Edge, &Edge) -> bool>,
        max_search_distance: Option<f64>,
    ) -> Result<RouterPoint, EngineError> {
        if !self.supports_all(profiles) {
            return Err(EngineError::ProfileUnsupportedMulti);
        }
        let handles: Vec<&ProfileHandle> = profiles.iter().map(|p| self.handle(p)).collect::<Result<_, _>>()?;
        let verify_stoppable = self.verify_all_stoppable;
        let is_acceptable = move |edge: &Edge| {
            handles.iter().all(|h| {
                let factor = h.cache.factor(edge.profile_id);
                factor.is_traversable() && (!verify_stoppable || h.cache.can_stop_on(edge.profile_id))
            })
        };
        let radius = max_search_distance.unwrap_or(DEFAULT_RADIUS_METERS);
        let point = self
            .resolver
            .resolve(latitude, longitude, radius, &is_acceptable, is_better)?;
        Ok(point)
    }

    /// `try_check_connectivity(profile, point, radius_m) -> bool`.
    /// runs a plain Dijkstra bounded by `radius_m` from `point` and reports
    /// whether the network extends out to that radius, rather than
    /// terminating in a small isolated pocket.
    pub fn try_check_connectivity(&self, profile: &str, point: RouterPoint, radius_m: f64) -> Result<bool, EngineError> {
        let handle = self.handle(profile)?;
        let edge = self.graph.get_edge(&point.edge_id)?;
        let roots = kernel::source_vertex_roots(edge, &point, &handle.cache);
        let options = SearchOptions::new(Some(radius_m), None);
        let tree = plain_dijkstra::run(&self.graph, &handle.cache, Direction::Forward, &roots, None, &options)?;
        let reached = tree
            .entries()
            .map(|(_, weight)| weight)
            .fold(0.0_f64, f64::max);
        Ok(reached >= radius_m - 1e-6)
    }

    /// `try_calculate(profile, source, target) -> Route`.
    pub fn try_calculate(&self, profile: &str, source: RouterPoint, target: RouterPoint) -> Result<Route, EngineError> {
        let handle = self.handle(profile)?;
        let options = SearchOptions::default();
        let ctx = self.kernel_context(handle, &options);
        let kernel_route = kernel::run(&ctx, source, target)?;
        let route = self
            .route_builder
            .build(&self.graph, &handle.cache, source, target, &kernel_route.vertices)?;
        Ok(route)
    }

    /// `try_calculate_weight(profile, source, target) -> f64`.
    pub fn try_calculate_weight(&self, profile: &str, source: RouterPoint, target: RouterPoint) -> Result<f64, EngineError> {
        let handle = self.handle(profile)?;
        let options = SearchOptions::default();
        let ctx = self.kernel_context(handle, &options);
        let kernel_route = kernel::run(&ctx, source, target)?;
        Ok(kernel_route.weight)
    }

    /// many-to-many routes. always runs over the uncontracted engine: a
    /// contracted route still has to be unpacked edge by edge to reconstruct
    /// geometry, so the uncontracted augmented search costs no more in
    /// practice.
    pub fn try_calculate_many(
        &self,
        profile: &str,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<(Vec<Vec<Option<Route>>>, Vec<usize>, Vec<usize>), EngineError> {
        let handle = self.handle(profile)?;
        let options = SearchOptions::default();
        let ctx = self.kernel_context(handle, &options);
        let kernel_routes = many_to_many::calculate_routes(&ctx, sources, targets)?;

        let mut routes = Vec::with_capacity(kernel_routes.len());
        for (i, row) in kernel_routes.into_iter().enumerate() {
            let mut out_row = Vec::with_capacity(row.len());
            for (j, kernel_route) in row.into_iter().enumerate() {
                let route = match kernel_route {
                    Some(kr) => Some(self.route_builder.build(
                        &self.graph,
                        &handle.cache,
                        sources[i],
                        targets[j],
                        &kr.vertices,
                    )?),
                    None => None,
                };
                out_row.push(route);
            }
            routes.push(out_row);
        }

        let weights: Vec<Vec<f64>> = routes
            .iter()
            .map(|row| {
                row.iter()
                    .map(|r| r.as_ref().map(|r| r.distance).unwrap_or(f64::INFINITY))
                    .collect()
            })
            .collect();
        let (invalid_sources, invalid_targets) = mark_invalid(&weights, sources, targets);
        Ok((routes, invalid_sources, invalid_targets))
    }

    /// many-to-many weights, sharing forward/backward searches
    /// across the "middle set" when a contracted graph is available.
    pub fn try_calculate_weight_many(
        &self,
        profile: &str,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<(Vec<Vec<f64>>, Vec<usize>, Vec<usize>), EngineError> {
        let handle = self.handle(profile)?;
        let options = SearchOptions::default();
        let ctx = self.kernel_context(handle, &options);
        let result = many_to_many::calculate_weights(&ctx, sources, targets)?;
        Ok((result.weights, result.invalid_sources, result.invalid_targets))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

/// a source/target is invalid once strictly more than half of its non-self
/// entries are unreachable. shared between the route and weight
/// many-to-many paths so both apply the identical threshold to the same
/// underlying weights.
fn mark_invalid(weights: &[Vec<f64>], sources: &[RouterPoint], targets: &[RouterPoint]) -> (Vec<usize>, Vec<usize>) {
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
        if comparable > 0 && unreachable as f64 > (comparable as f64 - 1.0) / 2.0 {
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
        if comparable > 0 && unreachable as f64 > (comparable as f64 - 1.0) / 2.0 {
            invalid_targets.push(j);
        }
    }

    (invalid_sources, invalid_targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::engine_config::ProfileEntryConfig;
    use crate::engine::engine_error::EngineErrorKind;
    use crate::model::network::{EdgeId, GraphConfig};
    use crate::model::profile::TableProfileConfig;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, rows: &[String]) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        for row in rows {
            writeln!(f, "{row}").unwrap();
        }
        path.to_str().unwrap().to_string()
    }

    /// builds a 3-vertex, 2-edge line network and a single "car" profile via
    /// real CSV configuration, exercising `RoutingEngine::new`'s full load
    /// path rather than constructing internals directly.
    fn build_test_engine() -> (tempfile::TempDir, RoutingEngine) {
        let dir = tempfile::tempdir().unwrap();
        let vertex_file = write_csv(
            &dir,
            "vertices.csv",
            &[
                "vertex_id,latitude,longitude".to_string(),
                "0,0.0,0.0".to_string(),
                "1,0.0,1.0".to_string(),
                "2,0.0,2.0".to_string(),
            ],
        );
        let edge_file = write_csv(
            &dir,
            "edges.csv",
            &[
                "edge_id,from,to,distance,profile_id,meta_id,shape_wkt,data_inverted".to_string(),
                "0,0,1,100.0,0,0,,false".to_string(),
                "1,1,2,100.0,0,0,,false".to_string(),
            ],
        );
        let factor_file = write_csv(
            &dir,
            "car_factors.csv",
            &["edge_profile_id,value,direction,can_stop".to_string(), "0,1.0,both,true".to_string()],
        );

        let config = EngineConfig {
            graph: GraphConfig {
                vertex_list_input_file: vertex_file,
                edge_list_input_file: edge_file,
            },
            restrictions: None,
            profiles: vec![ProfileEntryConfig {
                profile_id: 0,
                table: TableProfileConfig {
                    name: "car".to_string(),
                    factor_table_input_file: factor_file,
                },
                contracted: None,
                edge_based_contracted: None,
            }],
            verify_all_stoppable: false,
        };
        let engine = RoutingEngine::new(&config).unwrap();
        (dir, engine)
    }

    #[test]
    fn test_supports_all() {
        let (_dir, engine) = build_test_engine();
        assert!(engine.supports_all(&["car".to_string()]));
        assert!(!engine.supports_all(&["bike".to_string()]));
    }

    #[test]
    fn test_try_calculate_weight_straight_line() {
        let (_dir, engine) = build_test_engine();
        let source = RouterPoint::new(EdgeId(0), 0, 0.0, 0.0);
        let target = RouterPoint::new(EdgeId(1), u16::MAX, 0.0, 2.0);
        let weight = engine.try_calculate_weight("car", source, target).unwrap();
        assert!((weight - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_try_calculate_unsupported_profile() {
        let (_dir, engine) = build_test_engine();
        let source = RouterPoint::new(EdgeId(0), 0, 0.0, 0.0);
        let target = RouterPoint::new(EdgeId(1), u16::MAX, 0.0, 2.0);
        let err = engine.try_calculate_weight("bike", source, target).unwrap_err();
        assert_eq!(err.error_kind(), EngineErrorKind::ProfileUnsupported);
    }

    #[test]
    fn test_try_resolve_and_calculate_route() {
        let (_dir, engine) = build_test_engine();
        let profiles = vec!["car".to_string()];
        let source = engine.try_resolve(&profiles, 0.0, 0.2, None, None).unwrap();
        let target = engine.try_resolve(&profiles, 0.0, 1.8, None, None).unwrap();
        let route = engine.try_calculate("car", source, target).unwrap();
        assert!(route.distance > 0.0);
    }

    #[test]
    fn test_try_calculate_weight_many_matches_pairwise() {
        let (_dir, engine) = build_test_engine();
        let sources = vec![RouterPoint::new(EdgeId(0), 0, 0.0, 0.0)];
        let targets = vec![RouterPoint::new(EdgeId(1), u16::MAX, 0.0, 2.0)];
        let (matrix, invalid_sources, invalid_targets) =
            engine.try_calculate_weight_many("car", &sources, &targets).unwrap();
        let single = engine.try_calculate_weight("car", sources[0], targets[0]).unwrap();
        assert!((matrix[0][0] - single).abs() < 1e-6);
        assert!(invalid_sources.is_empty());
        assert!(invalid_targets.is_empty());
    }
}
