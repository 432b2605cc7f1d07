use indexmap::IndexMap;
use itertools::Itertools;

use crate::algorithm::search::Direction;
use crate::util::fs::read_utils;
use crate::util::geo::hilbert::hilbert_index;

use super::{edge_config::EdgeConfig, Edge, EdgeId, GraphConfig, NetworkError, Vertex, VertexId};

/// road network topology represented as an adjacency list.
/// `EdgeId` and `VertexId` values correspond to indices into `edges` and `vertices`.
///
/// # Performance
///
/// Methods on `Graph` prefer avoiding copies; single-entity lookups are O(1).
/// Collections are returned as iterators where the borrow checker allows it.
#[derive(Debug)]
pub struct Graph {
    pub vertices: Box<[Vertex]>,
    pub edges: Box<[Edge]>,
    pub adj: DenseAdjacencyList,
    pub rev: DenseAdjacencyList,
}

/// adjacency list with one (possibly empty) entry per `VertexId` in the `Graph`.
pub type DenseAdjacencyList = Box<[IndexMap<EdgeId, VertexId>]>;

impl TryFrom<&GraphConfig> for Graph {
    type Error = NetworkError;

    fn try_from(config: &GraphConfig) -> Result<Self, Self::Error> {
        let vertices: Box<[Vertex]> = read_utils::vec_from_csv(
            &config.vertex_list_input_file,
            true,
            None,
            None,
        )?
        .into_boxed_slice();

        let edge_rows: Vec<EdgeConfig> = read_utils::vec_from_csv_pb(
            &config.edge_list_input_file,
            true,
            "edge list".to_string(),
            "fillup".to_string(),
        )
        .map_err(|source| NetworkError::CsvError { source })?;
        let edges: Box<[Edge]> = edge_rows
            .into_iter()
            .map(|row| row.into_edge())
            .collect::<Result<Vec<_>, _>>()?
            .into_boxed_slice();

        Graph::new(vertices, edges)
    }
}

impl Graph {
    pub fn new(vertices: Box<[Vertex]>, edges: Box<[Edge]>) -> Result<Self, NetworkError> {
        let mut adj: Vec<IndexMap<EdgeId, VertexId>> = vec![IndexMap::new(); vertices.len()];
        let mut rev: Vec<IndexMap<EdgeId, VertexId>> = vec![IndexMap::new(); vertices.len()];

        for edge in edges.iter() {
            let out_links = adj
                .get_mut(edge.from.0)
                .ok_or(NetworkError::VertexNotFound(edge.from))?;
            out_links.insert(edge.edge_id, edge.to);

            let in_links = rev
                .get_mut(edge.to.0)
                .ok_or(NetworkError::VertexNotFound(edge.to))?;
            in_links.insert(edge.edge_id, edge.from);
        }

        Ok(Graph {
            vertices,
            edges,
            adj: adj.into_boxed_slice(),
            rev: rev.into_boxed_slice(),
        })
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.n_vertices()).map(VertexId)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn get_edge(&self, edge_id: &EdgeId) -> Result<&Edge, NetworkError> {
        self.edges.get(edge_id.0).ok_or(NetworkError::EdgeNotFound(*edge_id))
    }

    pub fn get_vertex(&self, vertex_id: &VertexId) -> Result<&Vertex, NetworkError> {
        self.vertices
            .get(vertex_id.0)
            .ok_or(NetworkError::VertexNotFound(*vertex_id))
    }

    pub fn out_edges(&self, src: &VertexId) -> Vec<EdgeId> {
        self.out_edges_iter(src).copied().collect_vec()
    }

    pub fn out_edges_iter<'a>(&'a self, src: &VertexId) -> Box<dyn Iterator<Item = &'a EdgeId> + 'a> {
        match self.adj.get(src.0) {
            Some(out_map) => Box::new(out_map.keys()),
            None => Box::new(std::iter::empty()),
        }
    }

    pub fn in_edges(&self, dst: &VertexId) -> Vec<EdgeId> {
        self.in_edges_iter(dst).copied().collect_vec()
    }

    pub fn in_edges_iter<'a>(&'a self, dst: &VertexId) -> Box<dyn Iterator<Item = &'a EdgeId> + 'a> {
        match self.rev.get(dst.0) {
            Some(in_map) => Box::new(in_map.keys()),
            None => Box::new(std::iter::empty()),
        }
    }

    /// incident edges leaving (`Forward`) or arriving at (`Reverse`) a vertex.
    pub fn incident_edges(&self, vertex_id: &VertexId, direction: &Direction) -> Vec<EdgeId> {
        match direction {
            Direction::Forward => self.out_edges(vertex_id),
            Direction::Reverse => self.in_edges(vertex_id),
        }
    }

    pub fn incident_edges_iter<'a>(
        &'a self,
        vertex_id: &VertexId,
        direction: &Direction,
    ) -> Box<dyn Iterator<Item = &'a EdgeId> + 'a> {
        match direction {
            Direction::Forward => self.out_edges_iter(vertex_id),
            Direction::Reverse => self.in_edges_iter(vertex_id),
        }
    }

    /// the vertex reached by traversing `edge_id` in the given direction: the
    /// destination for a `Forward` traversal, the source for a `Reverse` one.
    pub fn terminal_vertex(&self, edge_id: &EdgeId, direction: &Direction) -> Result<VertexId, NetworkError> {
        let edge = self.get_edge(edge_id)?;
        Ok(match direction {
            Direction::Forward => edge.to,
            Direction::Reverse => edge.from,
        })
    }

    /// reorders vertex ids along a Hilbert space-filling curve to improve the
    /// spatial locality of neighborhood queries. returns the
    /// new graph along with the `old id -> new id` permutation, so callers holding
    /// externally-persisted vertex ids (e.g. a contracted-graph loader) can
    /// translate them.
    pub fn sort_by_hilbert_order(&self) -> Result<(Graph, Vec<VertexId>), NetworkError> {
        let (min_lon, max_lon, min_lat, max_lat) = self.vertices.iter().fold(
            (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
            |(min_lon, max_lon, min_lat, max_lat), v| {
                (
                    min_lon.min(v.longitude),
                    max_lon.max(v.longitude),
                    min_lat.min(v.latitude),
                    max_lat.max(v.latitude),
                )
            },
        );
        let lon_span = (max_lon - min_lon).max(f32::EPSILON) as f64;
        let lat_span = (max_lat - min_lat).max(f32::EPSILON) as f64;

        let mut order: Vec<usize> = (0..self.vertices.len()).collect();
        order.sort_by_key(|&i| {
            let v = &self.vertices[i];
            let x_norm = (v.longitude - min_lon) as f64 / lon_span;
            let y_norm = (v.latitude - min_lat) as f64 / lat_span;
            hilbert_index(16, x_norm, y_norm)
        });

        // old_to_new[old_vertex_id] = new_vertex_id
        let mut old_to_new = vec![VertexId(0); self.vertices.len()];
        for (new_id, &old_id) in order.iter().enumerate() {
            old_to_new[old_id] = VertexId(new_id);
        }

        let vertices: Box<[Vertex]> = order
            .iter()
            .map(|&old_id| {
                let v = self.vertices[old_id];
                let new_id = old_to_new[old_id].0;
                Vertex::new(new_id, v.latitude, v.longitude)
            })
            .collect();

        let edges: Box<[Edge]> = self
            .edges
            .iter()
            .map(|e| Edge {
                edge_id: e.edge_id,
                from: old_to_new[e.from.0],
                to: old_to_new[e.to.0],
                distance: e.distance,
                profile_id: e.profile_id,
                meta_id: e.meta_id,
                shape: e.shape.clone(),
                data_inverted: e.data_inverted,
            })
            .collect();

        let graph = Graph::new(vertices, edges)?;
        Ok((graph, old_to_new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(1, 0.0, 1.0),
            Vertex::new(2, 1.0, 1.0),
        ]
        .into_boxed_slice();
        let edges = vec![
            Edge::new(0, 0, 1, 100.0, 0, 0, None, false),
            Edge::new(1, 1, 2, 100.0, 0, 0, None, false),
            Edge::new(2, 2, 0, 141.0, 0, 0, None, false),
        ]
        .into_boxed_slice();
        Graph::new(vertices, edges).unwrap()
    }

    #[test]
    fn test_adjacency() {
        let g = triangle();
        assert_eq!(g.out_edges(&VertexId(0)), vec![EdgeId(0)]);
        assert_eq!(g.in_edges(&VertexId(1)), vec![EdgeId(0)]);
        assert_eq!(g.n_vertices(), 3);
        assert_eq!(g.n_edges(), 3);
    }

    #[test]
    fn test_hilbert_sort_preserves_topology() {
        let g = triangle();
        let (sorted, permutation) = g.sort_by_hilbert_order().unwrap();
        assert_eq!(sorted.n_vertices(), g.n_vertices());
        assert_eq!(sorted.n_edges(), g.n_edges());
        // edge 0 still connects the same two (relabeled) vertices
        let e0 = sorted.get_edge(&EdgeId(0)).unwrap();
        assert_eq!(e0.from, permutation[0]);
        assert_eq!(e0.to, permutation[1]);
    }
}
