pub mod route;
pub mod route_builder;
pub mod route_error;

pub use route::{Route, RouteSegment};
pub use route_builder::{DefaultRouteBuilder, RouteBuilder};
pub use route_error::RouteError;
