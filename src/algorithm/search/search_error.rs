use crate::model::contracted::ContractedGraphError;
use crate::model::network::{EdgeId, NetworkError, VertexId};
use crate::model::profile::ProfileError;
use crate::model::restriction::RestrictionError;

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("the search failed due to a road network error: {source}")]
    NetworkFailure {
        #[from]
        source: NetworkError,
    },
    #[error("the search failed due to a profile error: {source}")]
    ProfileFailure {
        #[from]
        source: ProfileError,
    },
    #[error("the search failed due to a restriction index error: {source}")]
    RestrictionFailure {
        #[from]
        source: RestrictionError,
    },
    #[error("the search failed due to a contracted hierarchy error: {source}")]
    ContractedGraphFailure {
        #[from]
        source: ContractedGraphError,
    },
    #[error("no path exists between vertices {0} and {1} after settling {2} vertices")]
    NoPathExistsBetweenVertices(VertexId, VertexId, usize),
    #[error("no path exists between edges {0} and {1} after settling {2} edges")]
    NoPathExistsBetweenEdges(EdgeId, EdgeId, usize),
    #[error("query cancelled")]
    Cancelled,
    #[error("internal error due to search logic: {0}")]
    InternalError(String),
}
