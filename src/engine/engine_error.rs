use crate::algorithm::search::SearchError;
use crate::model::contracted::ContractedGraphError;
use crate::model::network::NetworkError;
use crate::model::profile::ProfileError;
use crate::model::resolver::ResolverError;
use crate::model::restriction::RestrictionError;
use crate::model::route::RouteError;

/// stable wire-level error tags: a caller serializing an [`EngineError`] to
/// a client response needs a tag independent of the human-readable message.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EngineErrorKind {
    ProfileUnsupported,
    ResolveFailed,
    RouteNotFound,
}

impl EngineErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineErrorKind::ProfileUnsupported => "ProfileUnsupported",
            EngineErrorKind::ResolveFailed => "ResolveFailed",
            EngineErrorKind::RouteNotFound => "RouteNotFound",
        }
    }
}

/// top-level error for every [`crate::engine::RoutingEngine`] operation
///: every public operation returns a tagged result carrying a
/// human-readable message (via `Display`) and a structured error kind
/// (`error_kind`). subsystem errors are wrapped with `#[from]` rather than
/// flattened, so the original cause is never swallowed.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("not all routing profiles are supported")]
    ProfileUnsupportedMulti,
    #[error("routing profile '{0}' is not supported")]
    ProfileUnsupported(String),
    #[error(transparent)]
    NetworkFailure(#[from] NetworkError),
    #[error(transparent)]
    ProfileFailure(#[from] ProfileError),
    #[error(transparent)]
    RestrictionFailure(#[from] RestrictionError),
    #[error(transparent)]
    ContractedGraphFailure(#[from] ContractedGraphError),
    #[error(transparent)]
    ResolverFailure(#[from] ResolverError),
    #[error(transparent)]
    SearchFailure(#[from] SearchError),
    #[error(transparent)]
    RouteFailure(#[from] RouteError),
}

impl EngineError {
    /// the wire-level tag for this error: local recovery already
    /// happened inside the search kernel, so by the time an error
    /// reaches the engine boundary it is one of exactly these three kinds.
    pub fn error_kind(&self) -> EngineErrorKind {
        match self {
            EngineError::ProfileUnsupportedMulti | EngineError::ProfileUnsupported(_) => {
                EngineErrorKind::ProfileUnsupported
            }
            EngineError::ResolverFailure(_) => EngineErrorKind::ResolveFailed,
            _ => EngineErrorKind::RouteNotFound,
        }
    }
}
