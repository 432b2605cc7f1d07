pub mod contracted_edge;
pub mod contracted_graph;
pub mod contracted_graph_error;
pub mod edge_based_contracted_graph;

pub use contracted_edge::ContractedEdge;
pub use contracted_graph::{ContractedGraph, ContractedGraphConfig};
pub use contracted_graph_error::ContractedGraphError;
pub use edge_based_contracted_graph::{
    EdgeBasedContractedEdge, EdgeBasedContractedGraph, EdgeBasedContractedGraphConfig,
};
