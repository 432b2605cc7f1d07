use crate::model::network::{Edge, EdgeId};

/// a resolved location on the network: a point along `edge_id` at
/// `offset` normalized `[0, 65535]` from `from` (0) to `to` (65535).
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RouterPoint {
    pub edge_id: EdgeId,
    pub offset: u16,
    pub latitude: f32,
    pub longitude: f32,
}

impl RouterPoint {
    pub fn new(edge_id: EdgeId, offset: u16, latitude: f32, longitude: f32) -> RouterPoint {
        RouterPoint {
            edge_id,
            offset,
            latitude,
            longitude,
        }
    }

    fn fraction(&self) -> f64 {
        self.offset as f64 / u16::MAX as f64
    }

    /// partial distance from `edge.from` up to this point, along the edge.
    pub fn distance_from_origin(&self, edge: &Edge) -> f64 {
        edge.distance * self.fraction()
    }

    /// partial distance from this point to `edge.to`, along the edge.
    pub fn distance_to_destination(&self, edge: &Edge) -> f64 {
        edge.distance * (1.0 - self.fraction())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let edge = Edge::new(0, 0, 1, 100.0, 0, 0, None, false);
        let start = RouterPoint::new(EdgeId(0), 0, 0.0, 0.0);
        assert_eq!(start.distance_from_origin(&edge), 0.0);
        assert_eq!(start.distance_to_destination(&edge), 100.0);

        let end = RouterPoint::new(EdgeId(0), u16::MAX, 0.0, 0.0);
        assert_eq!(end.distance_from_origin(&edge), 100.0);
        assert!(end.distance_to_destination(&edge) < 1e-6);
    }

    #[test]
    fn test_midpoint() {
        let edge = Edge::new(0, 0, 1, 100.0, 0, 0, None, false);
        let mid = RouterPoint::new(EdgeId(0), u16::MAX / 2, 0.0, 0.0);
        assert!((mid.distance_from_origin(&edge) - 50.0).abs() < 0.1);
    }
}
