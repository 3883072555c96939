//! PageRank centrality, with a uniform-distribution fallback on
//! non-convergence, and betweenness centrality over a bounded subset.

use crate::graph::GraphEngine;

const DEFAULT_ITERATION_BUDGET: usize = 100;
const CONVERGENCE_EPSILON: f64 = 1e-6;

/// Result of a PageRank run.
pub struct PageRankResult {
    pub scores: Vec<f64>,
    /// Set when the power iteration did not converge within the budget and
    /// the result fell back to the uniform distribution.
    pub fell_back_to_uniform: bool,
}

/// Weighted PageRank with damping `damping`, using undirected adjacency
/// (the memory graph's edges carry no inherent "citation" direction, so
/// treating each edge symmetrically is the faithful choice here).
pub fn pagerank(graph: &GraphEngine, damping: f64) -> PageRankResult {
    let n = graph.node_count();
    if n == 0 {
        return PageRankResult {
            scores: Vec::new(),
            fell_back_to_uniform: false,
        };
    }

    let out_weight: Vec<f64> = (0..n)
        .map(|i| graph.undirected_neighbors(i).iter().map(|nb| nb.weight).sum())
        .collect();

    let mut scores = vec![1.0 / n as f64; n];
    let mut converged = false;

    for _ in 0..DEFAULT_ITERATION_BUDGET {
        let dangling_mass: f64 = (0..n).filter(|&i| out_weight[i] == 0.0).map(|i| scores[i]).sum();
        let mut next = vec![(1.0 - damping) / n as f64 + damping * dangling_mass / n as f64; n];

        for i in 0..n {
            if out_weight[i] == 0.0 {
                continue;
            }
            let share = scores[i] / out_weight[i];
            for nb in graph.undirected_neighbors(i) {
                next[nb.id_index] += damping * share * nb.weight;
            }
        }

        let delta: f64 = next.iter().zip(scores.iter()).map(|(a, b)| (a - b).abs()).sum();
        scores = next;
        if delta < CONVERGENCE_EPSILON {
            converged = true;
            break;
        }
    }

    if converged {
        PageRankResult {
            scores,
            fell_back_to_uniform: false,
        }
    } else {
        PageRankResult {
            scores: vec![1.0 / n as f64; n],
            fell_back_to_uniform: true,
        }
    }
}

/// Betweenness centrality (Brandes' algorithm, unweighted hop count) over
/// `subset`, a set of node indices the caller has already narrowed down —
/// this is the expensive O(VE) algorithm, so callers restrict it to a
/// top-ranked subset rather than the whole graph.
pub fn betweenness_subset(graph: &GraphEngine, subset: &[usize]) -> std::collections::BTreeMap<usize, f64> {
    let n = graph.node_count();
    let mut centrality: std::collections::BTreeMap<usize, f64> = subset.iter().map(|&i| (i, 0.0)).collect();
    let subset_set: std::collections::BTreeSet<usize> = subset.iter().copied().collect();

    for s in 0..n {
        let mut stack = Vec::new();
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1_i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for nb in graph.undirected_neighbors(v) {
                let w = nb.id_index;
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s && subset_set.contains(&w) {
                *centrality.get_mut(&w).unwrap() += delta[w];
            }
        }
    }

    centrality
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
    fn pagerank_sums_to_roughly_one() {
        let mut state = State::default();
        for id in ["a", "b", "c"] {
            state.items.insert(id.into(), item(id));
        }
        state.edges.push(MemoryEdge::new("a", "b", "relates-to", 1.0));
        state.edges.push(MemoryEdge::new("b", "c", "relates-to", 1.0));
        let graph = GraphEngine::build(&state);
        let result = pagerank(&graph, 0.85);
        let total: f64 = result.scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(!result.fell_back_to_uniform);
    }

    #[test]
    fn hub_node_outranks_leaves() {
        let mut state = State::default();
        for id in ["hub", "l1", "l2", "l3"] {
            state.items.insert(id.into(), item(id));
        }
        for leaf in ["l1", "l2", "l3"] {
            state.edges.push(MemoryEdge::new("hub", leaf, "relates-to", 1.0));
        }
        let graph = GraphEngine::build(&state);
        let result = pagerank(&graph, 0.85);
        let hub_idx = graph.index_of("hub").unwrap();
        let leaf_idx = graph.index_of("l1").unwrap();
        assert!(result.scores[hub_idx] > result.scores[leaf_idx]);
    }

    #[test]
    fn empty_graph_pagerank_is_empty() {
        let state = State::default();
        let graph = GraphEngine::build(&state);
        let result = pagerank(&graph, 0.85);
        assert!(result.scores.is_empty());
    }
}
