use serde::{Deserialize, Serialize};

use super::{edge_id::EdgeId, vertex_id::VertexId};

/// a single directed edge record in a [`super::Graph`].
///
/// `profile_id` indexes into a profile's traversal factor table; `meta_id` is an
/// opaque key into an external attribute dictionary (out of scope here.).
/// `shape` holds the ordered intermediate coordinates between `from` and `to`,
/// not including the endpoints. `data_inverted` records whether the stored
/// `(from, to)` pair is reversed relative to the edge's logical direction, so that
/// reconstructing a traversal can reverse the shape order when needed.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Edge {
    pub edge_id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub distance: f64,
    pub profile_id: u16,
    pub meta_id: u32,
    pub shape: Option<Vec<(f32, f32)>>,
    pub data_inverted: bool,
}

impl Edge {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        edge_id: usize,
        from: usize,
        to: usize,
        distance: f64,
        profile_id: u16,
        meta_id: u32,
        shape: Option<Vec<(f32, f32)>>,
        data_inverted: bool,
    ) -> Self {
        Self {
            edge_id: EdgeId(edge_id),
            from: VertexId(from),
            to: VertexId(to),
            distance,
            profile_id,
            meta_id,
            shape,
            data_inverted,
        }
    }

    /// the shape coordinates in traversal order for the given direction, including
    /// neither the `from` nor `to` vertex coordinate. reversing the traversal
    /// direction reverses the shape order.
    pub fn shape_in_direction(&self, forward: bool) -> Vec<(f32, f32)> {
        let points = self.shape.clone().unwrap_or_default();
        if forward {
            points
        } else {
            points.into_iter().rev().collect()
        }
    }
}
