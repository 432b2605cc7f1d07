use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// dense, zero-based identifier for a [`super::Vertex`] in a [`super::Graph`].
///
/// invariant: after the graph is sorted (see [`super::graph::Graph::sort_by_hilbert_order`]),
/// ids remain contiguous over `0..n_vertices`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct VertexId(pub usize);

impl VertexId {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<usize> for VertexId {
    fn from(value: usize) -> Self {
        VertexId(value)
    }
}
