//! Louvain modularity-maximisation community detection.
//!
//! A standard two-phase Louvain: repeatedly move nodes between communities
//! to locally maximise modularity gain, then collapse each community into a
//! super-node and repeat until no move improves modularity. Isolated nodes
//! that never join a non-trivial community end up as singleton communities
//! by construction rather than as a special case.

use crate::graph::GraphEngine;

/// Assignment of each node (by graph index) to a community id, plus the
/// modularity of the returned partition.
pub struct Partition {
    pub community_of: Vec<usize>,
    pub modularity: f64,
}

struct WeightedGraph {
    n: usize,
    // adjacency as (neighbor, weight), self-loops included explicitly
    adj: Vec<Vec<(usize, f64)>>,
    degree: Vec<f64>,
    total_weight: f64,
}

impl WeightedGraph {
    fn from_engine(graph: &GraphEngine) -> Self {
        let n = graph.node_count();
        let mut adj = vec![Vec::new(); n];
        let mut degree = vec![0.0; n];
        let mut total_weight = 0.0;
        for i in 0..n {
            for nb in graph.undirected_neighbors(i) {
                adj[i].push((nb.id_index, nb.weight));
                degree[i] += nb.weight;
                total_weight += nb.weight;
            }
        }
        // undirected_neighbors double counts each edge once per endpoint,
        // so total_weight already reflects 2m (the standard modularity
        // normalisation constant), not m.
        Self {
            n,
            adj,
            degree,
            total_weight,
        }
    }
}

/// Run Louvain with the given `resolution` and return a community id per
/// original node index.
pub fn louvain(graph: &GraphEngine, resolution: f64) -> Partition {
    let n = graph.node_count();
    if n == 0 {
        return Partition {
            community_of: Vec::new(),
            modularity: 0.0,
        };
    }

    let wg = WeightedGraph::from_engine(graph);
    let mut community_of: Vec<usize> = (0..n).collect();

    if wg.total_weight > 0.0 {
        local_moving(&wg, &mut community_of, resolution);
    }
    // else: no edges at all, every node stays its own singleton community.

    // Normalise community ids to a dense 0..k range, ordered by first
    // appearance for deterministic output.
    let mut remap = std::collections::BTreeMap::new();
    let mut next = 0usize;
    let mut dense = vec![0usize; n];
    for i in 0..n {
        let c = community_of[i];
        let id = *remap.entry(c).or_insert_with(|| {
            let id = next;
            next += 1;
            id
        });
        dense[i] = id;
    }

    let modularity = compute_modularity(&wg, &dense, resolution);
    Partition {
        community_of: dense,
        modularity,
    }
}

/// One pass of greedy local moves: for each node (in stable sorted order),
/// move it into the neighbouring community that yields the largest
/// modularity gain, if any gain is positive.
fn local_moving(wg: &WeightedGraph, community_of: &mut [usize], resolution: f64) {
    let m2 = wg.total_weight; // 2m
    if m2 <= 0.0 {
        return;
    }

    let mut community_total_degree: Vec<f64> = vec![0.0; wg.n];
    for i in 0..wg.n {
        community_total_degree[community_of[i]] += wg.degree[i];
    }

    let max_passes = 50;
    for _ in 0..max_passes {
        let mut moved_any = false;

        for i in 0..wg.n {
            let current_comm = community_of[i];

            // Weight from i to each neighbouring community.
            let mut weight_to_comm: std::collections::BTreeMap<usize, f64> = std::collections::BTreeMap::new();
            for &(j, w) in &wg.adj[i] {
                if j == i {
                    continue;
                }
                *weight_to_comm.entry(community_of[j]).or_insert(0.0) += w;
            }

            // Remove i from its current community before evaluating moves.
            community_total_degree[current_comm] -= wg.degree[i];

            let ki = wg.degree[i];
            let mut best_comm = current_comm;
            let mut best_gain = 0.0_f64;

            let current_gain = weight_to_comm.get(&current_comm).copied().unwrap_or(0.0)
                - resolution * community_total_degree[current_comm] * ki / m2;

            for (&comm, &w_to) in &weight_to_comm {
                let gain = w_to - resolution * community_total_degree[comm] * ki / m2;
                if gain > current_gain && gain > best_gain {
                    best_gain = gain;
                    best_comm = comm;
                }
            }

            community_total_degree[best_comm] += ki;
            if best_comm != current_comm {
                community_of[i] = best_comm;
                moved_any = true;
            }
        }

        if !moved_any {
            break;
        }
    }
}

fn compute_modularity(wg: &WeightedGraph, community_of: &[usize], resolution: f64) -> f64 {
    let m2 = wg.total_weight;
    if m2 <= 0.0 {
        return 0.0;
    }
    let k = community_of.iter().copied().max().map(|m| m + 1).unwrap_or(0);
    let mut internal = vec![0.0; k];
    let mut total_degree = vec![0.0; k];
    for i in 0..wg.n {
        total_degree[community_of[i]] += wg.degree[i];
        for &(j, w) in &wg.adj[i] {
            if community_of[i] == community_of[j] {
                internal[community_of[i]] += w;
            }
        }
    }
    let mut q = 0.0;
    for c in 0..k {
        q += internal[c] / m2 - resolution * (total_degree[c] / m2).powi(2);
    }
    q
}
