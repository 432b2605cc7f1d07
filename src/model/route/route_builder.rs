use crate::model::network::{Edge, Graph, VertexId};
use crate::model::profile::ProfileFactorCache;
use crate::model::resolver::RouterPoint;

use super::route::{Route, RouteSegment};
use super::route_error::RouteError;

/// builds a [`Route`] from a resolved source/target and the vertex path a
/// search kernel produced between them. modeled as a capability interface
/// so callers can supply a custom implementation in place of the default
/// walk-and-trim one.
pub trait RouteBuilder: Send + Sync {
    fn build(
        &self,
        graph: &Graph,
        cache: &ProfileFactorCache,
        source: RouterPoint,
        target: RouterPoint,
        path: &[VertexId],
    ) -> Result<Route, RouteError>;
}

/// the default [`RouteBuilder`]: walks consecutive vertex pairs in `path`,
/// looks up the edge joining each pair, emits its shape in the traversed
/// direction (respecting `data_inverted`), and trims the first and last
/// edges to the resolved offsets. durations are `distance / factor`.
pub struct DefaultRouteBuilder;

impl RouteBuilder for DefaultRouteBuilder {
    fn build(
        &self,
        graph: &Graph,
        cache: &ProfileFactorCache,
        source: RouterPoint,
        target: RouterPoint,
        path: &[VertexId],
    ) -> Result<Route, RouteError> {
        if path.is_empty() {
            // the same-edge direct path has no intermediate
            // vertex, so it can only be the forward-trimmed fragment of one
            // edge (a U-turn shortcut carries exactly one vertex, handled by
            // the general walk below).
            let edge = graph.get_edge(&source.edge_id)?;
            let segment = trim_segment(edge, cache, source.offset, target.offset, true)?;
            let coordinates = single_edge_coordinates(edge, source, target, true);
            return Ok(Route::from_segments(coordinates, vec![segment]));
        }

        let source_edge = graph.get_edge(&source.edge_id)?;
        let target_edge = graph.get_edge(&target.edge_id)?;

        let mut segments = Vec::with_capacity(path.len() + 1);
        let mut coordinates: Vec<(f32, f32)> = vec![(source.longitude, source.latitude)];

        // first (partial) segment: from the resolved source point to path[0].
        let source_forward = path[0] == source_edge.to;
        let first_distance = if source_forward {
            source.distance_to_destination(source_edge)
        } else {
            source.distance_from_origin(source_edge)
        };
        segments.push(weighted_segment(source_edge, cache, first_distance)?);
        push_shape(&mut coordinates, source_edge, source_forward);
        push_vertex(&mut coordinates, graph, path[0])?;

        // interior, fully-traversed edges between consecutive path vertices.
        for pair in path.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            let (edge, forward) = find_connecting_edge(graph, cache, u, v)?;
            segments.push(weighted_segment(edge, cache, edge.distance)?);
            push_shape(&mut coordinates, edge, forward);
            push_vertex(&mut coordinates, graph, v)?;
        }

        // last (partial) segment: from path's last vertex to the target point.
        let last_vertex = *path.last().expect("path is non-empty in this branch");
        let target_forward = last_vertex == target_edge.from;
        let last_distance = if target_forward {
            target.distance_from_origin(target_edge)
        } else {
            target.distance_to_destination(target_edge)
        };
        segments.push(weighted_segment(target_edge, cache, last_distance)?);
        push_shape(&mut coordinates, target_edge, target_forward);
        // replace the trailing vertex coordinate pushed by the loop above (or
        // the source partial, if path has length 1) with the exact target
        // point, since the edge is trimmed before reaching its endpoint.
        if coordinates.len() > 1 {
            coordinates.pop();
        }
        coordinates.push((target.longitude, target.latitude));

        Ok(Route::from_segments(coordinates, segments))
    }
}

/// finds the edge joining `u` to `v` in either stored orientation, preferring
/// a forward match (`edge.from == u`). returns the edge and whether it was
/// traversed in its stored `(from, to)` order.
fn find_connecting_edge(graph: &Graph, cache: &ProfileFactorCache, u: VertexId, v: VertexId) -> Result<(&Edge, bool), RouteError> {
    for edge_id in graph.out_edges_iter(&u) {
        let edge = graph.get_edge(edge_id)?;
        if edge.to == v && cache.factor(edge.profile_id).direction.allows_forward() {
            return Ok((edge, true));
        }
    }
    for edge_id in graph.in_edges_iter(&u) {
        let edge = graph.get_edge(edge_id)?;
        if edge.from == v && cache.factor(edge.profile_id).direction.allows_backward() {
            return Ok((edge, false));
        }
    }
    Err(RouteError::NoConnectingEdge(u, v))
}

fn weighted_segment(edge: &Edge, cache: &ProfileFactorCache, distance: f64) -> Result<RouteSegment, RouteError> {
    let factor = cache.factor(edge.profile_id);
    if !factor.is_traversable() {
        return Err(RouteError::Impassable(edge.edge_id));
    }
    Ok(RouteSegment {
        edge_id: edge.edge_id,
        meta_id: edge.meta_id,
        distance,
        duration: distance / factor.value,
    })
}

/// the single-edge segment used when source and target resolve to the same
/// edge and the kernel picked the plain forward fragment.
fn trim_segment(edge: &Edge, cache: &ProfileFactorCache, source_offset: u16, target_offset: u16, forward: bool) -> Result<RouteSegment, RouteError> {
    let factor = cache.factor(edge.profile_id);
    if !factor.is_traversable() {
        return Err(RouteError::Impassable(edge.edge_id));
    }
    let fraction = |o: u16| o as f64 / u16::MAX as f64;
    let distance = if forward {
        (fraction(target_offset) - fraction(source_offset)) * edge.distance
    } else {
        (fraction(source_offset) - fraction(target_offset)) * edge.distance
    };
    Ok(RouteSegment {
        edge_id: edge.edge_id,
        meta_id: edge.meta_id,
        distance,
        duration: distance / factor.value,
    })
}

fn single_edge_coordinates(edge: &Edge, source: RouterPoint, target: RouterPoint, forward: bool) -> Vec<(f32, f32)> {
    let mut coordinates = vec![(source.longitude, source.latitude)];
    push_shape(&mut coordinates, edge, forward);
    coordinates.push((target.longitude, target.latitude));
    coordinates
}

fn push_shape(coordinates: &mut Vec<(f32, f32)>, edge: &Edge, forward: bool) {
    coordinates.extend(edge.shape_in_direction(forward));
}

fn push_vertex(coordinates: &mut Vec<(f32, f32)>, graph: &Graph, vertex_id: VertexId) -> Result<(), RouteError> {
    let vertex = graph.get_vertex(&vertex_id)?;
    coordinates.push((vertex.longitude, vertex.latitude));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::{EdgeId, Vertex};
    use crate::model::profile::profile::test::MockProfile;

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
    fn test_build_straight_line_route() {
        let graph = line_graph();
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        let source = RouterPoint::new(EdgeId(0), 0, 0.0, 0.0);
        // offset at the edge's midpoint, so the route's last segment is a
        // genuine trimmed fragment rather than a zero-length one.
        let target = RouterPoint::new(EdgeId(1), u16::MAX / 2, 0.0, 1.5);
        let path = vec![VertexId(1)];

        let route = DefaultRouteBuilder.build(&graph, &cache, source, target, &path).unwrap();
        assert!((route.distance - 150.0).abs() < 0.1, "distance={}", route.distance);
        assert!((route.duration - 150.0).abs() < 0.1);
        assert_eq!(route.segments.len(), 2);
        assert_eq!(route.coordinates.first(), Some(&(0.0, 0.0)));
        assert_eq!(route.coordinates.last(), Some(&(1.5, 0.0)));
    }

    #[test]
    fn test_build_same_edge_shortcut_route() {
        let graph = line_graph();
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        let source = RouterPoint::new(EdgeId(0), 10_000, 0.0, 0.0);
        let target = RouterPoint::new(EdgeId(0), 20_000, 0.0, 0.0);

        let route = DefaultRouteBuilder.build(&graph, &cache, source, target, &[]).unwrap();
        let expected = (20_000.0 - 10_000.0) / u16::MAX as f64 * 100.0;
        assert!((route.distance - expected).abs() < 1e-6);
        assert_eq!(route.segments.len(), 1);
    }
}
