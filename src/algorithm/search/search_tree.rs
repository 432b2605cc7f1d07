use std::collections::HashMap;
use std::hash::Hash;

use crate::model::network::EdgeId;

/// one branch of a predecessor tree: the node reached, the edge used to reach
/// it, and the weight accumulated to this point. `predecessor` is an index
/// into the owning [`SearchTree`]'s arena rather than a node key, avoiding a
/// per-node heap allocation. generalized over any node key: `VertexId` for
/// the plain kernel,
/// a restriction-trail state for the edge-based kernel, and `VertexId`/
/// `DirectedEdgeId` for the contracted kernels (with an edge marker of
/// `usize` indexing a contracted-graph edge list instead of an `EdgeId`).
#[derive(Clone, Debug)]
pub struct SearchTreeBranch<K, E = EdgeId> {
    pub node: K,
    pub incoming_edge: Option<E>,
    pub predecessor: Option<usize>,
    pub weight: f64,
}

/// an arena of [`SearchTreeBranch`] values plus a node-to-index map, so a
/// settled node's best-known weight and predecessor can be looked up and
/// improved in O(1) during a Dijkstra relaxation loop.
#[derive(Debug)]
pub struct SearchTree<K, E = EdgeId> {
    arena: Vec<SearchTreeBranch<K, E>>,
    index: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash, E> Default for SearchTree<K, E> {
    fn default() -> Self {
        SearchTree {
            arena: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash, E> SearchTree<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn weight_of(&self, node: K) -> Option<f64> {
        self.index.get(&node).map(|&idx| self.arena[idx].weight)
    }

    pub fn branch_of(&self, node: K) -> Option<&SearchTreeBranch<K, E>> {
        self.index.get(&node).map(|&idx| &self.arena[idx])
    }

    pub fn contains(&self, node: K) -> bool {
        self.index.contains_key(&node)
    }

    /// the arena index of `node`'s branch, if it has settled.
    pub fn index_of(&self, node: K) -> Option<usize> {
        self.index.get(&node).copied()
    }

    /// records `node` as reachable at `weight` via `incoming_edge` from the
    /// branch at `predecessor`. no-ops (returns `None`) if `node` already has
    /// an equal-or-better weight; otherwise inserts or overwrites the branch
    /// and returns its arena index.
    pub fn relax(
        &mut self,
        node: K,
        weight: f64,
        incoming_edge: Option<E>,
        predecessor: Option<usize>,
    ) -> Option<usize> {
        if let Some(&idx) = self.index.get(&node) {
            if self.arena[idx].weight <= weight {
                return None;
            }
            self.arena[idx] = SearchTreeBranch {
                node,
                incoming_edge,
                predecessor,
                weight,
            };
            Some(idx)
        } else {
            let idx = self.arena.len();
            self.arena.push(SearchTreeBranch {
                node: node.clone(),
                incoming_edge,
                predecessor,
                weight,
            });
            self.index.insert(node, idx);
            Some(idx)
        }
    }

    /// every settled node and its final weight, in arena (settlement) order.
    /// used by the many-to-many engine to scan a one-sided search's full
    /// middle set rather than look up one node at a time.
    pub fn entries(&self) -> impl Iterator<Item = (K, f64)> + '_ {
        self.arena.iter().map(|b| (b.node.clone(), b.weight))
    }

    /// walks the predecessor chain from `node` back to its root, returning
    /// nodes in root-to-`node` order.
    pub fn path_to(&self, node: K) -> Vec<K> {
        let mut out = Vec::new();
        let Some(&start_idx) = self.index.get(&node) else {
            return out;
        };
        let mut cursor = Some(start_idx);
        while let Some(idx) = cursor {
            let branch = &self.arena[idx];
            out.push(branch.node.clone());
            cursor = branch.predecessor;
        }
        out.reverse();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::VertexId;

    #[test]
    fn test_relax_only_improves() {
        let mut tree: SearchTree<VertexId> = SearchTree::new();
        let root = tree.relax(VertexId(0), 0.0, None, None).unwrap();
        let child = tree.relax(VertexId(1), 10.0, None, Some(root)).unwrap();
        assert!(tree.relax(VertexId(1), 20.0, None, Some(root)).is_none());
        assert_eq!(tree.weight_of(VertexId(1)), Some(10.0));
        let better = tree.relax(VertexId(1), 5.0, None, Some(root));
        assert_eq!(better, Some(child));
        assert_eq!(tree.weight_of(VertexId(1)), Some(5.0));
    }

    #[test]
    fn test_path_to_walks_root_to_node() {
        let mut tree: SearchTree<VertexId> = SearchTree::new();
        let root = tree.relax(VertexId(0), 0.0, None, None).unwrap();
        let mid = tree.relax(VertexId(1), 1.0, None, Some(root)).unwrap();
        tree.relax(VertexId(2), 2.0, None, Some(mid)).unwrap();
        assert_eq!(
            tree.path_to(VertexId(2)),
            vec![VertexId(0), VertexId(1), VertexId(2)]
        );
    }
}
