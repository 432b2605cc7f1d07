use std::sync::Arc;

use geo::{Coord, Point};
use rstar::RTree;

use crate::model::network::{Edge, Graph};
use crate::util::geo::haversine;

use super::edge_rtree_object::EdgeRTreeObject;
use super::resolver_error::ResolverError;
use super::router_point::RouterPoint;

pub const DEFAULT_RADIUS_METERS: f64 = 50.0;

/// crude degrees-to-meters conversion used only to decide when the rtree's
/// envelope-distance iterator can stop expanding; the real acceptance
/// distance is always computed with [`haversine::coord_distance_meters`].
const METERS_PER_DEGREE: f64 = 111_320.0;

/// a small distance tolerance, in meters, within which `is_better` breaks ties
/// between two candidate edges.
const TIE_TOLERANCE_METERS: f64 = 0.5;

/// resolves geographic coordinates to a location on the network.
/// modeled as a capability interface so callers can supply a custom resolver
/// in place of the spatial-index default.
pub trait Resolver: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn resolve(
        &self,
        latitude: f32,
        longitude: f32,
        radius_m: f64,
        is_acceptable: &dyn Fn(&Edge) -> bool,
        is_better: Option<&dyn Fn(&Edge, &Edge) -> bool>,
    ) -> Result<RouterPoint, ResolverError>;
}

/// default [`Resolver`]: an `rstar::RTree` over edge bounding boxes. bounding-box
/// expansion via `nearest_neighbor_iter_with_distance_2` drives the candidate
/// search outward from the query point until envelopes can no longer improve
/// on the best accepted distance.
pub struct SpatialIndexResolver {
    graph: Arc<Graph>,
    rtree: RTree<EdgeRTreeObject>,
}

impl SpatialIndexResolver {
    pub fn build(graph: Arc<Graph>) -> Result<SpatialIndexResolver, ResolverError> {
        let entries: Vec<EdgeRTreeObject> = graph
            .edges()
            .map(|e| EdgeRTreeObject::new(e, &graph))
            .collect::<Result<_, _>>()?;
        let rtree = RTree::bulk_load(entries);
        Ok(SpatialIndexResolver { graph, rtree })
    }
}

impl Resolver for SpatialIndexResolver {
    fn resolve(
        &self,
        latitude: f32,
        longitude: f32,
        radius_m: f64,
        is_acceptable: &dyn Fn(&Edge) -> bool,
        is_better: Option<&dyn Fn(&Edge, &Edge) -> bool>,
    ) -> Result<RouterPoint, ResolverError> {
        if self.rtree.size() == 0 {
            return Err(ResolverError::EmptyIndex);
        }

        let query = Point::new(longitude, latitude);
        let query_coord = Coord {
            x: longitude,
            y: latitude,
        };

        let mut best: Option<(Edge, f64, f64)> = None; // (edge, distance_m, fraction along polyline)

        for (candidate, envelope_dist_2) in self.rtree.nearest_neighbor_iter_with_distance_2(&query) {
            let envelope_lower_bound_m = (envelope_dist_2 as f64).sqrt() * METERS_PER_DEGREE;
            if let Some((_, best_dist, _)) = &best {
                if envelope_lower_bound_m > *best_dist {
                    break;
                }
            } else if envelope_lower_bound_m > radius_m {
                break;
            }

            let edge = self.graph.get_edge(&candidate.edge_id)?;
            if !is_acceptable(edge) {
                continue;
            }

            let (distance_m, fraction) = project_onto_polyline(query_coord, &candidate.polyline)
                .map_err(ResolverError::GeoError)?;
            if distance_m > radius_m {
                continue;
            }

            best = Some(match best.take() {
                None => (edge.clone(), distance_m, fraction),
                Some((best_edge, best_dist, best_fraction)) => {
                    if distance_m < best_dist - TIE_TOLERANCE_METERS {
                        (edge.clone(), distance_m, fraction)
                    } else if (distance_m - best_dist).abs() <= TIE_TOLERANCE_METERS {
                        match is_better {
                            Some(better) if better(edge, &best_edge) => {
                                (edge.clone(), distance_m, fraction)
                            }
                            _ => (best_edge, best_dist, best_fraction),
                        }
                    } else {
                        (best_edge, best_dist, best_fraction)
                    }
                }
            });
        }

        let (edge, _, fraction) = best.ok_or(ResolverError::ResolveFailed {
            lat: latitude,
            lon: longitude,
            radius_m,
        })?;

        let offset = (fraction.clamp(0.0, 1.0) * u16::MAX as f64).round() as u16;
        Ok(RouterPoint::new(edge.edge_id, offset, latitude, longitude))
    }
}

/// projects `query` onto the polyline, returning the minimum perpendicular
/// distance in meters and the normalized position (`[0, 1]`) of the
/// projection along the polyline's cumulative length.
fn project_onto_polyline(query: Coord<f32>, polyline: &[(f32, f32)]) -> Result<(f64, f64), String> {
    if polyline.len() < 2 {
        return Err("polyline must have at least 2 points".to_string());
    }
    let coords: Vec<Coord<f32>> = polyline.iter().map(|&(x, y)| Coord { x, y }).collect();

    let mut seg_lengths_m = Vec::with_capacity(coords.len() - 1);
    for w in coords.windows(2) {
        seg_lengths_m.push(haversine::coord_distance_meters(w[0], w[1])?);
    }
    let total_m: f64 = seg_lengths_m.iter().sum();

    let mut best_dist_m = f64::MAX;
    let mut best_cumulative_m = 0.0;
    let mut cumulative_m = 0.0;
    for (i, w) in coords.windows(2).enumerate() {
        let (proj, t) = project_point_on_segment(query, w[0], w[1]);
        let dist_m = haversine::coord_distance_meters(query, proj)?;
        if dist_m < best_dist_m {
            best_dist_m = dist_m;
            best_cumulative_m = cumulative_m + t * seg_lengths_m[i];
        }
        cumulative_m += seg_lengths_m[i];
    }

    let fraction = if total_m > 0.0 {
        (best_cumulative_m / total_m).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Ok((best_dist_m, fraction))
}

/// projects `p` onto segment `a`-`b` in planar lon/lat space, adequate at the
/// scale of a single edge. returns the projected coordinate and `t`, its
/// fractional position between `a` (0) and `b` (1).
fn project_point_on_segment(p: Coord<f32>, a: Coord<f32>, b: Coord<f32>) -> (Coord<f32>, f64) {
    let (ax, ay, bx, by, px, py) = (
        a.x as f64, a.y as f64, b.x as f64, b.y as f64, p.x as f64, p.y as f64,
    );
    let (dx, dy) = (bx - ax, by - ay);
    let len_2 = dx * dx + dy * dy;
    let t = if len_2 > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / len_2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let proj = Coord {
        x: (ax + t * dx) as f32,
        y: (ay + t * dy) as f32,
    };
    (proj, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::{EdgeId, Vertex, VertexId};

    fn two_edge_graph() -> Graph {
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(1, 0.0, 1.0),
            Vertex::new(2, 1.0, 1.0),
        ]
        .into_boxed_slice();
        let edges = vec![
            Edge::new(0, 0, 1, 111_320.0, 0, 0, None, false),
            Edge::new(1, 1, 2, 111_320.0, 0, 0, None, false),
        ]
        .into_boxed_slice();
        Graph::new(vertices, edges).unwrap()
    }

    #[test]
    fn test_resolve_near_first_edge() {
        let graph = Arc::new(two_edge_graph());
        let resolver = SpatialIndexResolver::build(graph).unwrap();
        let accept_all = |_: &Edge| true;
        let result = resolver
            .resolve(0.0, 0.5, DEFAULT_RADIUS_METERS * 20_000.0, &accept_all, None)
            .unwrap();
        assert_eq!(result.edge_id, EdgeId(0));
        assert!(result.offset > 20_000 && result.offset < 45_000, "offset={}", result.offset);
    }

    #[test]
    fn test_resolve_out_of_radius_fails() {
        let graph = Arc::new(two_edge_graph());
        let resolver = SpatialIndexResolver::build(graph).unwrap();
        let accept_all = |_: &Edge| true;
        let result = resolver.resolve(10.0, 10.0, 1.0, &accept_all, None);
        assert!(matches!(result, Err(ResolverError::ResolveFailed { .. })));
    }

    #[test]
    fn test_resolve_respects_is_acceptable() {
        let graph = Arc::new(two_edge_graph());
        let resolver = SpatialIndexResolver::build(graph).unwrap();
        let reject_first = |e: &Edge| e.edge_id != EdgeId(0);
        let result = resolver
            .resolve(0.0, 0.5, DEFAULT_RADIUS_METERS * 20_000.0, &reject_first, None)
            .unwrap();
        assert_eq!(result.edge_id, EdgeId(1));
        let _ = VertexId(0);
    }
}
