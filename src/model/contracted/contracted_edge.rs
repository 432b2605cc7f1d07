use serde::Deserialize;

use crate::model::network::VertexId;

/// one edge of a node-based contracted hierarchy: either an
/// original graph edge (`contracted_vertex = None`) or a synthetic shortcut
/// summarizing the path through `contracted_vertex`. always stored with
/// `from` the lower-level endpoint and `to` the higher-level one; `backward_weight`
/// is the cost of traversing it in the `to -> from` direction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ContractedEdge {
    pub from: VertexId,
    pub to: VertexId,
    pub forward_weight: f64,
    pub backward_weight: f64,
    pub contracted_vertex: Option<VertexId>,
}

impl ContractedEdge {
    pub fn is_shortcut(&self) -> bool {
        self.contracted_vertex.is_some()
    }
}
