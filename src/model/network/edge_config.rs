use geo::LineString;
use serde::{Deserialize, Serialize};
use wkt::TryFromWkt;

use super::{edge_id::EdgeId, vertex_id::VertexId, Edge, NetworkError};

/// a single row of an edge list CSV file. the `shape_wkt` column holds an optional
/// WKT `LINESTRING` of the intermediate shape points (empty string if the edge has
/// no interior shape), decoded via `wkt::TryFromWkt`.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct EdgeConfig {
    pub edge_id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub distance: f64,
    pub profile_id: u16,
    pub meta_id: u32,
    pub shape_wkt: String,
    pub data_inverted: bool,
}

impl EdgeConfig {
    pub fn into_edge(self) -> Result<Edge, NetworkError> {
        let shape = if self.shape_wkt.trim().is_empty() {
            None
        } else {
            let linestring: LineString<f32> =
                LineString::try_from_wkt_str(self.shape_wkt.as_str()).map_err(|e| {
                    NetworkError::DatasetError(format!(
                        "edge {} has invalid shape_wkt: {}",
                        self.edge_id, e
                    ))
                })?;
            Some(linestring.points().map(|p| (p.x(), p.y())).collect())
        };
        Ok(Edge {
            edge_id: self.edge_id,
            from: self.from,
            to: self.to,
            distance: self.distance,
            profile_id: self.profile_id,
            meta_id: self.meta_id,
            shape,
            data_inverted: self.data_inverted,
        })
    }
}
