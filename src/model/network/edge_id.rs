use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// dense, zero-based identifier for an [`super::Edge`] in a [`super::Graph`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn as_usize(&self) -> usize {
        self.0
    }

    /// encodes this edge id plus a traversal direction as a signed, externally-persisted
    /// id. zero is reserved so it can never be a valid encoding; forward traversal is
    /// `+(id+1)`, backward (reverse of the stored `from`/`to` order) is `-(id+1)`.
    pub fn directed(&self, forward: bool) -> DirectedEdgeId {
        let signed = (self.0 as i64) + 1;
        DirectedEdgeId(if forward { signed } else { -signed })
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl From<usize> for EdgeId {
    fn from(value: usize) -> Self {
        EdgeId(value)
    }
}

/// signed directed-edge-id encoding exposed on the external interface.
/// zero is invalid; `+(id+1)` is forward, `-(id+1)` is backward.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DirectedEdgeId(pub i64);

impl DirectedEdgeId {
    /// decodes back into the underlying [`EdgeId`] and whether it is traversed forward.
    /// returns `None` for the reserved zero value.
    pub fn decode(&self) -> Option<(EdgeId, bool)> {
        if self.0 == 0 {
            return None;
        }
        let forward = self.0 > 0;
        let magnitude = self.0.unsigned_abs() as usize - 1;
        Some((EdgeId(magnitude), forward))
    }

    pub fn is_forward(&self) -> bool {
        self.0 > 0
    }
}

impl Display for DirectedEdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for id in [0usize, 1, 2, 4096] {
            let edge_id = EdgeId(id);
            let (fwd_id, fwd_dir) = edge_id.directed(true).decode().unwrap();
            assert_eq!(fwd_id, edge_id);
            assert!(fwd_dir);

            let (rev_id, rev_dir) = edge_id.directed(false).decode().unwrap();
            assert_eq!(rev_id, edge_id);
            assert!(!rev_dir);
        }
        assert_eq!(DirectedEdgeId(0).decode(), None);
    }
}
