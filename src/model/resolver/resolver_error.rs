use crate::model::network::NetworkError;

#[derive(thiserror::Error, Debug)]
pub enum ResolverError {
    #[error("no acceptable edge found within {radius_m}m of ({lat}, {lon})")]
    ResolveFailed { lat: f32, lon: f32, radius_m: f64 },
    #[error("no edges exist to resolve against")]
    EmptyIndex,
    #[error(transparent)]
    NetworkError(#[from] NetworkError),
    #[error("failure projecting a point onto the network: {0}")]
    GeoError(String),
}
