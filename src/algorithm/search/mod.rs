pub mod bidirectional;
pub mod contracted;
pub mod direction;
pub mod edge_based;
pub mod edge_based_contracted;
pub mod edge_weight;
pub mod kernel;
pub mod many_to_many;
pub mod plain_dijkstra;
pub mod search_error;
pub mod search_options;
pub mod search_tree;

pub use direction::Direction;
pub use kernel::{KernelContext, KernelKind, KernelRoute};
pub use many_to_many::ManyToManyWeights;
pub use search_error::SearchError;
pub use search_options::SearchOptions;
