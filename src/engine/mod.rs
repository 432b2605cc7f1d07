//! the public entry point for a complete routing deployment:
//! [`RoutingEngine`] aggregates the road network, profiles, restrictions,
//! contracted hierarchies, resolver, and route builder behind one struct, so
//! a caller builds it once from an [`EngineConfig`] and issues point-to-point
//! or many-to-many queries without touching the model/algorithm layers
//! directly.

pub mod engine_config;
pub mod engine_error;
pub mod routing_engine;

pub use engine_config::{EngineConfig, ProfileEntryConfig};
pub use engine_error::{EngineError, EngineErrorKind};
pub use routing_engine::RoutingEngine;
