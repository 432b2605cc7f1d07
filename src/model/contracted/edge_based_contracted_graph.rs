use indexmap::IndexMap;
use serde::Deserialize;

use crate::model::network::{DirectedEdgeId, EdgeId};
use crate::util::fs::read_utils;

use super::contracted_graph_error::ContractedGraphError;

/// a hierarchy edge whose endpoints are directed original edges rather than
/// vertices: used when turn restrictions must be respected exactly,
/// since forbidden edge-to-edge transitions are simply absent from the
/// hierarchy by construction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EdgeBasedContractedEdge {
    pub from: DirectedEdgeId,
    pub to: DirectedEdgeId,
    pub forward_weight: f64,
    pub backward_weight: f64,
    pub contracted_edge: Option<DirectedEdgeId>,
}

impl EdgeBasedContractedEdge {
    pub fn is_shortcut(&self) -> bool {
        self.contracted_edge.is_some()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct EdgeLevelRow {
    directed_edge_id: i64,
    level: u32,
}

/// paths to the two tables an edge-based hierarchy is serialized as.
#[derive(Debug, Clone)]
pub struct EdgeBasedContractedGraphConfig {
    pub level_input_file: String,
    pub edge_input_file: String,
}

/// an edge-expanded contraction hierarchy: hierarchy
/// "nodes" are directed original edges, addressed by [`DirectedEdgeId`].
#[derive(Debug)]
pub struct EdgeBasedContractedGraph {
    levels: IndexMap<DirectedEdgeId, u32>,
    edges: Box<[EdgeBasedContractedEdge]>,
    up_out: IndexMap<DirectedEdgeId, Vec<usize>>,
    up_in: IndexMap<DirectedEdgeId, Vec<usize>>,
}

impl EdgeBasedContractedGraph {
    pub fn from_parts(
        levels: IndexMap<DirectedEdgeId, u32>,
        edges: Vec<EdgeBasedContractedEdge>,
    ) -> Result<EdgeBasedContractedGraph, ContractedGraphError> {
        for edge in &edges {
            let from_level = *levels.get(&edge.from).unwrap_or(&0);
            let to_level = *levels.get(&edge.to).unwrap_or(&0);
            if to_level <= from_level {
                let (from_v, _) = edge.from.decode().unwrap_or((EdgeId(0), true));
                let (to_v, _) = edge.to.decode().unwrap_or((EdgeId(0), true));
                return Err(ContractedGraphError::LevelViolation {
                    from: crate::model::network::VertexId(from_v.0),
                    to: crate::model::network::VertexId(to_v.0),
                    from_level,
                    to_level,
                });
            }
        }

        let mut up_out: IndexMap<DirectedEdgeId, Vec<usize>> = IndexMap::new();
        let mut up_in: IndexMap<DirectedEdgeId, Vec<usize>> = IndexMap::new();
        for (idx, edge) in edges.iter().enumerate() {
            up_out.entry(edge.from).or_default().push(idx);
            up_in.entry(edge.to).or_default().push(idx);
        }

        Ok(EdgeBasedContractedGraph {
            levels,
            edges: edges.into_boxed_slice(),
            up_out,
            up_in,
        })
    }

    pub fn level(&self, directed_edge_id: DirectedEdgeId) -> u32 {
        self.levels.get(&directed_edge_id).copied().unwrap_or(0)
    }

    pub fn edge(&self, idx: usize) -> &EdgeBasedContractedEdge {
        &self.edges[idx]
    }

    pub fn up_out(
        &self,
        directed_edge_id: DirectedEdgeId,
    ) -> impl Iterator<Item = (usize, &EdgeBasedContractedEdge)> {
        self.up_out
            .get(&directed_edge_id)
            .into_iter()
            .flatten()
            .map(move |&idx| (idx, &self.edges[idx]))
    }

    pub fn up_in(
        &self,
        directed_edge_id: DirectedEdgeId,
    ) -> impl Iterator<Item = (usize, &EdgeBasedContractedEdge)> {
        self.up_in
            .get(&directed_edge_id)
            .into_iter()
            .flatten()
            .map(move |&idx| (idx, &self.edges[idx]))
    }

    fn find_edge(&self, from: DirectedEdgeId, to: DirectedEdgeId) -> Option<&EdgeBasedContractedEdge> {
        self.up_out(from).map(|(_, e)| e).find(|e| e.to == to)
    }

    /// expands a shortcut into the sequence of original directed edges it
    /// summarizes, using an explicit stack.
    pub fn expand(&self, edge: &EdgeBasedContractedEdge) -> Vec<EdgeBasedContractedEdge> {
        let mut out = Vec::new();
        let mut stack = vec![*edge];
        while let Some(e) = stack.pop() {
            match e.contracted_edge {
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
}

impl TryFrom<&EdgeBasedContractedGraphConfig> for EdgeBasedContractedGraph {
    type Error = ContractedGraphError;

    fn try_from(config: &EdgeBasedContractedGraphConfig) -> Result<Self, Self::Error> {
        let level_rows: Vec<EdgeLevelRow> =
            read_utils::vec_from_csv(&config.level_input_file, true, None, None)?;
        let mut levels = IndexMap::new();
        for row in &level_rows {
            levels.insert(DirectedEdgeId(row.directed_edge_id), row.level);
        }

        let edge_rows: Vec<EdgeBasedContractedEdge> =
            read_utils::vec_from_csv(&config.edge_input_file, true, None, None)?;

        EdgeBasedContractedGraph::from_parts(levels, edge_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn de(id: i64) -> DirectedEdgeId {
        DirectedEdgeId(id)
    }

    #[test]
    fn test_up_out_and_level_check() {
        let mut levels = IndexMap::new();
        levels.insert(de(1), 0);
        levels.insert(de(2), 1);
        let edges = vec![EdgeBasedContractedEdge {
            from: de(1),
            to: de(2),
            forward_weight: 3.0,
            backward_weight: 3.0,
            contracted_edge: None,
        }];
        let g = EdgeBasedContractedGraph::from_parts(levels, edges).unwrap();
        assert_eq!(g.up_out(de(1)).count(), 1);
        assert_eq!(g.up_in(de(2)).count(), 1);
    }

    #[test]
    fn test_level_violation_rejected() {
        let mut levels = IndexMap::new();
        levels.insert(de(1), 4);
        levels.insert(de(2), 4);
        let edges = vec![EdgeBasedContractedEdge {
            from: de(1),
            to: de(2),
            forward_weight: 3.0,
            backward_weight: 3.0,
            contracted_edge: None,
        }];
        let result = EdgeBasedContractedGraph::from_parts(levels, edges);
        assert!(matches!(
            result,
            Err(ContractedGraphError::LevelViolation { .. })
        ));
    }
}
