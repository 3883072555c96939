//! Topology summary metrics: density, clustering coefficient, average
//! degree, and community count.

use serde::{Deserialize, Serialize};

use crate::graph::GraphEngine;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub clustering_coefficient: f64,
    pub modularity: f64,
    pub avg_degree: f64,
    pub community_count: usize,
    pub bridge_count: usize,
}

/// Mean local clustering coefficient over nodes with at least two
/// neighbours: `2 * triangles / (deg * (deg - 1))`, averaged.
pub fn clustering_coefficient(graph: &GraphEngine) -> f64 {
    let n = graph.node_count();
    if n == 0 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut counted = 0usize;

    for i in 0..n {
        let neighbors: Vec<usize> = graph.undirected_neighbors(i).iter().map(|nb| nb.id_index).collect();
        let deg = neighbors.len();
        if deg < 2 {
            continue;
        }
        let neighbor_set: std::collections::BTreeSet<usize> = neighbors.iter().copied().collect();
        let mut triangles = 0usize;
        for &u in &neighbors {
            for nb in graph.undirected_neighbors(u) {
                if nb.id_index != i && neighbor_set.contains(&nb.id_index) {
                    triangles += 1;
                }
            }
        }
        // Each triangle counted twice (once from each shared-neighbour side).
        let triangles = triangles / 2;
        let local = 2.0 * triangles as f64 / (deg * (deg - 1)) as f64;
        total += local;
        counted += 1;
    }

    if counted == 0 {
        0.0
    } else {
        total / counted as f64
    }
}

pub fn density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        0.0
    } else {
        let max_edges = node_count * (node_count - 1) / 2;
        edge_count as f64 / max_edges as f64
    }
}

pub fn avg_degree(graph: &GraphEngine) -> f64 {
    let n = graph.node_count();
    if n == 0 {
        return 0.0;
    }
    let total: usize = (0..n).map(|i| graph.out_degree(i) + graph.in_degree(i)).sum();
    total as f64 / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemoryEdge, MemoryItem, MemoryType, State};
    use chrono::Utc;

    fn item(id: &str) -> MemoryItem {
        let now = Utc::now();
        MemoryItem {
            id: id.into(),
            item_type: MemoryType::Fact,
            text: String::new(),
            tags: Default::default(),
            importance: 0.5,
            energy: 0.5,
            ttl: "30d".into(),
            scope: None,
            created_at: now,
            updated_at: now,
            last_accessed_at: now,
            access_count: 0,
            success: 0,
            fail: 0,
        }
    }

    #[test]
    fn triangle_has_clustering_coefficient_one() {
        let mut state = State::default();
        for id in ["a", "b", "c"] {
            state.items.insert(id.into(), item(id));
        }
        state.edges.push(MemoryEdge::new("a", "b", "relates-to", 1.0));
        state.edges.push(MemoryEdge::new("b", "c", "relates-to", 1.0));
        state.edges.push(MemoryEdge::new("a", "c", "relates-to", 1.0));
        let graph = GraphEngine::build(&state);
        assert!((clustering_coefficient(&graph) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn density_of_empty_graph_is_zero() {
        assert_eq!(density(0, 0), 0.0);
        assert_eq!(density(1, 0), 0.0);
    }
}
