use crate::model::contracted::{ContractedGraphConfig, EdgeBasedContractedGraphConfig};
use crate::model::network::GraphConfig;
use crate::model::profile::TableProfileConfig;
use crate::model::restriction::RestrictionsConfig;

/// one profile's file-backed configuration: its small integer id (used
/// internally to key the restrictions index and kernel context), the factor
/// table it loads via [`crate::model::profile::TableProfile`], and the
/// contracted hierarchies available for it, if any.
#[derive(Debug, Clone)]
pub struct ProfileEntryConfig {
    pub profile_id: u16,
    pub table: TableProfileConfig,
    pub contracted: Option<ContractedGraphConfig>,
    pub edge_based_contracted: Option<EdgeBasedContractedGraphConfig>,
}

/// bundles the file paths [`crate::engine::RoutingEngine::new`] reads to
/// build a complete engine. loading shapefiles/OSM themselves remains out
/// of scope; only the already-produced CSV/JSON tables are read here.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub graph: GraphConfig,
    pub restrictions: Option<RestrictionsConfig>,
    pub profiles: Vec<ProfileEntryConfig>,
    /// when true, resolution rejects edges where any requested
    /// profile forbids stopping.
    pub verify_all_stoppable: bool,
}
