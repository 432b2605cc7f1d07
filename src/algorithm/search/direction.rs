use serde::{Deserialize, Serialize};

/// the direction a search frontier scans edges in: `Forward` follows
/// outgoing edges (`graph.adj`), `Reverse` follows incoming edges
/// (`graph.rev`), reconstructing a path as though traveling the edge
/// backward.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reverse,
}
