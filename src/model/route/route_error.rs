use crate::model::network::{EdgeId, NetworkError, VertexId};

#[derive(thiserror::Error, Debug)]
pub enum RouteError {
    #[error("road network error while building route: {source}")]
    NetworkFailure {
        #[from]
        source: NetworkError,
    },
    #[error("no edge connects vertex {0} to vertex {1}")]
    NoConnectingEdge(VertexId, VertexId),
    #[error("edge {0} is not traversable under the active profile")]
    Impassable(EdgeId),
}
