use geo::Point;
use rstar::{PointDistance, RTreeObject, AABB};

use crate::model::network::{Edge, EdgeId, Graph, NetworkError};

/// an edge's full polyline plus its bounding envelope, indexed in the
/// resolver's `rstar::RTree`.
#[derive(Clone, Debug)]
pub struct EdgeRTreeObject {
    pub edge_id: EdgeId,
    /// ordered coordinates from `edge.from` to `edge.to`, including both endpoints.
    pub polyline: Vec<(f32, f32)>,
    envelope: AABB<Point<f32>>,
}

impl EdgeRTreeObject {
    pub fn new(edge: &Edge, graph: &Graph) -> Result<EdgeRTreeObject, NetworkError> {
        let from = graph.get_vertex(&edge.from)?;
        let to = graph.get_vertex(&edge.to)?;

        let mut polyline = Vec::with_capacity(edge.shape.as_ref().map_or(2, |s| s.len() + 2));
        polyline.push((from.longitude, from.latitude));
        if let Some(shape) = &edge.shape {
            polyline.extend(shape.iter().copied());
        }
        polyline.push((to.longitude, to.latitude));

        let (min_x, max_x, min_y, max_y) = polyline.iter().fold(
            (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
            |(min_x, max_x, min_y, max_y), &(x, y)| {
                (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
            },
        );
        let envelope = AABB::from_corners(
            Point::new(min_x, min_y),
            Point::new(max_x, max_y),
        );

        Ok(EdgeRTreeObject {
            edge_id: edge.edge_id,
            polyline,
            envelope,
        })
    }
}

impl RTreeObject for EdgeRTreeObject {
    type Envelope = AABB<Point<f32>>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for EdgeRTreeObject {
    fn distance_2(&self, point: &Point<f32>) -> f32 {
        self.envelope.distance_2(point)
    }
}
