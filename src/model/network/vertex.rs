use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::vertex_id::VertexId;

/// a vertex in a [`super::Graph`]. coordinates are stored as 32-bit floats, matching
/// the precision of the source geometry. implements Serialize/Deserialize
/// directly so the `vertex_id,latitude,longitude` CSV schema round-trips without a
/// custom visitor.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub vertex_id: VertexId,
    pub latitude: f32,
    pub longitude: f32,
}

impl Vertex {
    pub fn new(vertex_id: usize, latitude: f32, longitude: f32) -> Self {
        Self {
            vertex_id: VertexId(vertex_id),
            latitude,
            longitude,
        }
    }

    /// coordinate in (x=longitude, y=latitude) order, as expected by `geo`/`rstar`.
    pub fn coord(&self) -> geo::Coord<f32> {
        geo::coord! { x: self.longitude, y: self.latitude }
    }
}

impl Display for Vertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Vertex {} ({}, {})",
            self.vertex_id, self.latitude, self.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_uses_lon_lat_order() {
        let v = Vertex::new(0, 39.7, -105.2);
        let c = v.coord();
        assert_eq!(c.x, -105.2);
        assert_eq!(c.y, 39.7);
    }
}
