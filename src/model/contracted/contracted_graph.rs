use indexmap::IndexMap;

use crate::model::network::{NetworkError, VertexId};
use crate::util::fs::read_utils;

use super::contracted_edge::ContractedEdge;
use super::contracted_graph_error::ContractedGraphError;

/// paths to the two tables a contracted hierarchy is serialized as: per-vertex
/// contraction levels and the upward edge list (original edges plus
/// shortcuts). construction of a hierarchy is out of scope; this only loads
/// and validates an already-contracted graph.
#[derive(Debug, Clone)]
pub struct ContractedGraphConfig {
    pub level_input_file: String,
    pub edge_input_file: String,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
struct LevelRow {
    vertex_id: usize,
    level: u32,
}

/// a node-based contraction hierarchy: vertices
/// carry a contraction `level`; edges (original + shortcut) are stored once,
/// oriented from their lower-level endpoint to their higher-level one, so the
/// forward search's "only relax `level(v) > level(u)`" rule holds by
/// construction and needs no per-edge check at query time.
#[derive(Debug)]
pub struct ContractedGraph {
    levels: Box<[u32]>,
    edges: Box<[ContractedEdge]>,
    /// indices into `edges` of upward edges leaving each vertex, for the forward search.
    up_out: Box<[Vec<usize>]>,
    /// indices into `edges` of upward edges arriving at each vertex, for the backward search.
    up_in: Box<[Vec<usize>]>,
}

impl ContractedGraph {
    pub fn from_parts(
        n_vertices: usize,
        levels: IndexMap<VertexId, u32>,
        edges: Vec<ContractedEdge>,
    ) -> Result<ContractedGraph, ContractedGraphError> {
        let mut level_arr = vec![0u32; n_vertices];
        for (v, level) in &levels {
            level_arr[v.as_usize()] = *level;
        }

        for edge in &edges {
            let from_level = level_arr[edge.from.as_usize()];
            let to_level = level_arr[edge.to.as_usize()];
            if to_level <= from_level {
                return Err(ContractedGraphError::LevelViolation {
                    from: edge.from,
                    to: edge.to,
                    from_level,
                    to_level,
                });
            }
        }

        let mut up_out = vec![Vec::new(); n_vertices];
        let mut up_in = vec![Vec::new(); n_vertices];
        for (idx, edge) in edges.iter().enumerate() {
            up_out[edge.from.as_usize()].push(idx);
            up_in[edge.to.as_usize()].push(idx);
        }

        Ok(ContractedGraph {
            levels: level_arr.into_boxed_slice(),
            edges: edges.into_boxed_slice(),
            up_out: up_out.into_boxed_slice(),
            up_in: up_in.into_boxed_slice(),
        })
    }

    pub fn level(&self, vertex_id: VertexId) -> u32 {
        self.levels.get(vertex_id.as_usize()).copied().unwrap_or(0)
    }

    pub fn edge(&self, idx: usize) -> &ContractedEdge {
        &self.edges[idx]
    }

    /// upward edges leaving `vertex_id`, for the forward search: relax using `forward_weight`.
    pub fn up_out(&self, vertex_id: VertexId) -> impl Iterator<Item = (usize, &ContractedEdge)> {
        self.up_out
            .get(vertex_id.as_usize())
            .into_iter()
            .flatten()
            .map(move |&idx| (idx, &self.edges[idx]))
    }

    /// upward edges arriving at `vertex_id`, for the backward search: relax using `backward_weight`,
    /// traversing logically from `edge.to` toward `edge.from`.
    pub fn up_in(&self, vertex_id: VertexId) -> impl Iterator<Item = (usize, &ContractedEdge)> {
        self.up_in
            .get(vertex_id.as_usize())
            .into_iter()
            .flatten()
            .map(move |&idx| (idx, &self.edges[idx]))
    }

    /// recursively expands a shortcut edge into the sequence of original
    /// edges it summarizes. edges already without a `contracted_vertex` are
    /// returned unchanged. uses an explicit stack rather than recursion, since
    /// hierarchies on large networks can nest shortcuts deeply.
    pub fn expand(&self, edge: &ContractedEdge) -> Vec<ContractedEdge> {
        let mut out = Vec::new();
        let mut stack = vec![*edge];
        while let Some(e) = stack.pop() {
            match e.contracted_vertex {
                None => out.push(e),
                Some(mid) => {
                    let lower = *self
                        .find_edge(e.from, mid)
                        .expect("shortcut's lower half must exist in a validated hierarchy");
                    let upper = *self
                        .find_edge(mid, e.to)
                        .expect("shortcut's upper half must exist in a validated hierarchy");
                    stack.push(upper);
                    stack.push(lower);
                }
            }
        }
        out.reverse();
        out
    }

    fn find_edge(&self, from: VertexId, to: VertexId) -> Option<&ContractedEdge> {
        self.up_out(from).map(|(_, e)| e).find(|e| e.to == to)
    }
}

impl TryFrom<&ContractedGraphConfig> for ContractedGraph {
    type Error = ContractedGraphError;

    fn try_from(config: &ContractedGraphConfig) -> Result<Self, Self::Error> {
        let level_rows: Vec<LevelRow> =
            read_utils::vec_from_csv(&config.level_input_file, true, None, None)?;
        let mut levels = IndexMap::new();
        let mut n_vertices = 0usize;
        for row in &level_rows {
            let vertex_id = VertexId(row.vertex_id);
            n_vertices = n_vertices.max(row.vertex_id + 1);
            levels.insert(vertex_id, row.level);
        }

        let edge_rows: Vec<ContractedEdge> =
            read_utils::vec_from_csv(&config.edge_input_file, true, None, None)?;
        for edge in &edge_rows {
            n_vertices = n_vertices.max(edge.from.as_usize() + 1);
            n_vertices = n_vertices.max(edge.to.as_usize() + 1);
        }

        ContractedGraph::from_parts(n_vertices, levels, edge_rows)
    }
}

impl From<ContractedGraphError> for NetworkError {
    fn from(value: ContractedGraphError) -> Self {
        NetworkError::DatasetError(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_hierarchy() -> ContractedGraph {
        // 0 -> 1 -> 2, level(0)=0 < level(1)=1 < level(2)=2, plus a
        // shortcut 0 -> 2 contracting vertex 1.
        let mut levels = IndexMap::new();
        levels.insert(VertexId(0), 0);
        levels.insert(VertexId(1), 1);
        levels.insert(VertexId(2), 2);
        let edges = vec![
            ContractedEdge {
                from: VertexId(0),
                to: VertexId(1),
                forward_weight: 10.0,
                backward_weight: 10.0,
                contracted_vertex: None,
            },
            ContractedEdge {
                from: VertexId(1),
                to: VertexId(2),
                forward_weight: 5.0,
                backward_weight: 5.0,
                contracted_vertex: None,
            },
            ContractedEdge {
                from: VertexId(0),
                to: VertexId(2),
                forward_weight: 15.0,
                backward_weight: 15.0,
                contracted_vertex: Some(VertexId(1)),
            },
        ];
        ContractedGraph::from_parts(3, levels, edges).unwrap()
    }

    #[test]
    fn test_up_out_and_up_in() {
        let g = triangle_hierarchy();
        assert_eq!(g.up_out(VertexId(0)).count(), 2);
        assert_eq!(g.up_in(VertexId(2)).count(), 2);
        assert_eq!(g.up_out(VertexId(2)).count(), 0);
    }

    #[test]
    fn test_level_violation_rejected() {
        let mut levels = IndexMap::new();
        levels.insert(VertexId(0), 5);
        levels.insert(VertexId(1), 5);
        let edges = vec![ContractedEdge {
            from: VertexId(0),
            to: VertexId(1),
            forward_weight: 1.0,
            backward_weight: 1.0,
            contracted_vertex: None,
        }];
        let result = ContractedGraph::from_parts(2, levels, edges);
        assert!(matches!(
            result,
            Err(ContractedGraphError::LevelViolation { .. })
        ));
    }

    #[test]
    fn test_expand_shortcut_to_originals() {
        let g = triangle_hierarchy();
        let shortcut = g.edge(2);
        let expanded = g.expand(shortcut);
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].from, VertexId(0));
        assert_eq!(expanded[0].to, VertexId(1));
        assert_eq!(expanded[1].from, VertexId(1));
        assert_eq!(expanded[1].to, VertexId(2));
    }
}
