//! In-memory adjacency over the memory graph.
//!
//! The engine owns no item content — only ids and edge weights — so it can
//! be rebuilt cheaply from `State` whenever edges change in bulk (load,
//! save-induced rebuild, consolidation) without caring about the rest of
//! the item payload.

use std::collections::BTreeMap;

use crate::model::State;

/// One directed hop out of a node, retained for algorithms (PageRank) that
/// care about direction; spreading activation and degree queries treat the
/// graph as undirected by consulting both `out` and `in`.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub id_index: usize,
    pub weight: f64,
}

/// Adjacency structure derived from a state's edge list.
///
/// Node ids are interned into a stable, sorted index so that iteration
/// order is deterministic, which keeps spreading activation testable
/// bit-for-bit.
#[derive(Debug, Clone, Default)]
pub struct GraphEngine {
    ids: Vec<String>,
    index_of: BTreeMap<String, usize>,
    out_edges: Vec<Vec<Neighbor>>,
    in_edges: Vec<Vec<Neighbor>>,
}

impl GraphEngine {
    /// Rebuild adjacency from scratch. Always correct; incremental updates
    /// must reproduce the same result.
    pub fn build(state: &State) -> Self {
        let ids: Vec<String> = state.items.keys().cloned().collect();
        let index_of: BTreeMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let mut out_edges = vec![Vec::new(); ids.len()];
        let mut in_edges = vec![Vec::new(); ids.len()];

        for edge in &state.edges {
            let (Some(&from), Some(&to)) = (index_of.get(&edge.from), index_of.get(&edge.to)) else {
                continue;
            };
            out_edges[from].push(Neighbor {
                id_index: to,
                weight: edge.weight,
            });
            in_edges[to].push(Neighbor {
                id_index: from,
                weight: edge.weight,
            });
        }

        Self {
            ids,
            index_of,
            out_edges,
            in_edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.out_edges.iter().map(Vec::len).sum()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    pub fn id_at(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn out_degree(&self, index: usize) -> usize {
        self.out_edges[index].len()
    }

    pub fn in_degree(&self, index: usize) -> usize {
        self.in_edges[index].len()
    }

    /// Out-edges only, for directed algorithms like PageRank.
    pub fn out_neighbors(&self, index: usize) -> &[Neighbor] {
        &self.out_edges[index]
    }

    pub fn in_neighbors(&self, index: usize) -> &[Neighbor] {
        &self.in_edges[index]
    }

    /// Union of `out` and `in` neighbours, for algorithms that treat edges
    /// as undirected (spreading activation, clustering coefficient).
    pub fn undirected_neighbors(&self, index: usize) -> Vec<Neighbor> {
        let mut merged = self.out_edges[index].clone();
        merged.extend(self.in_edges[index].iter().copied());
        merged
    }
}
