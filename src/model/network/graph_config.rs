use serde::{Deserialize, Serialize};

/// configuration describing where a [`super::Graph`] is loaded from. loading
/// itself (shapefile/OSM import) is out of scope; this reads the
/// already-produced CSV tables.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphConfig {
    pub vertex_list_input_file: String,
    pub edge_list_input_file: String,
}