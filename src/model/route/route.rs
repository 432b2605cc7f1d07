use serde::{Deserialize, Serialize};

use crate::model::network::EdgeId;

/// one traversed edge (or edge fragment, for the first/last segment) in a
/// built [`Route`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub edge_id: EdgeId,
    pub meta_id: u32,
    /// meters actually traversed along this edge; less than the edge's full
    /// `distance` for the first and last segment of a route, which are
    /// trimmed to the resolved `RouterPoint` offsets.
    pub distance: f64,
    /// seconds, computed as `distance / profile_factor`.
    pub duration: f64,
}

/// a fully reconstructed route between two [`crate::model::resolver::RouterPoint`]s
///: an ordered coordinate polyline, per-segment distance/duration/
/// attribute references, and the aggregate distance/duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// `(longitude, latitude)` pairs, in traversal order, first = source point,
    /// last = target point.
    pub coordinates: Vec<(f32, f32)>,
    pub segments: Vec<RouteSegment>,
    pub distance: f64,
    pub duration: f64,
}

impl Route {
    pub fn from_segments(coordinates: Vec<(f32, f32)>, segments: Vec<RouteSegment>) -> Route {
        let distance = segments.iter().map(|s| s.distance).sum();
        let duration = segments.iter().map(|s| s.duration).sum();
        Route {
            coordinates,
            segments,
            distance,
            duration,
        }
    }
}
