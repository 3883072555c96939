//! Bounded iterative spreading activation over the memory graph.
//!
//! Parameters are passed as a single named struct rather than positional
//! arguments — the source material uses both conventions inconsistently;
//! this crate picks the named-struct convention used elsewhere for
//! configuration (`Policy`) and sticks to it.

use std::collections::BTreeMap;

use crate::graph::GraphEngine;

/// Parameters governing a single activation run.
#[derive(Debug, Clone, Copy)]
pub struct ActivationParams {
    pub steps: u32,
    pub decay: f64,
    pub threshold: f64,
}

impl Default for ActivationParams {
    fn default() -> Self {
        Self {
            steps: 3,
            decay: 0.85,
            threshold: 0.1,
        }
    }
}

impl ActivationParams {
    pub fn from_policy(policy: &crate::model::Policy) -> Self {
        Self {
            steps: policy.activation_steps,
            decay: policy.activation_decay,
            threshold: policy.activation_threshold,
        }
    }
}

/// Run spreading activation from `seeds` (item id -> activation in
/// `[0, 1]`) and return the final activation of every node known to
/// `graph`, keyed by item id.
///
/// Edges are treated as undirected for propagation: activation flows both
/// `from -> to` and `to -> from`, weighted by the edge's declared weight.
/// Nodes below `params.threshold` still *receive* activation but do not
/// propagate it further. Iteration is over a stable, sorted node order so
/// the result is deterministic for a fixed input.
pub fn spread(graph: &GraphEngine, seeds: &BTreeMap<String, f64>, params: ActivationParams) -> BTreeMap<String, f64> {
    let n = graph.node_count();
    let mut activation = vec![0.0_f64; n];

    for (id, value) in seeds {
        if let Some(idx) = graph.index_of(id) {
            activation[idx] = (activation[idx] + value.clamp(0.0, 1.0)).clamp(0.0, 1.0);
        }
    }

    for _ in 0..params.steps {
        let mut delta = vec![0.0_f64; n];
        for idx in 0..n {
            let current = activation[idx];
            if current <= params.threshold {
                continue;
            }
            for neighbor in graph.undirected_neighbors(idx) {
                delta[neighbor.id_index] += current * neighbor.weight * params.decay;
            }
        }
        for idx in 0..n {
            activation[idx] = (activation[idx] + delta[idx]).clamp(0.0, 1.0);
        }
    }

    graph
        .ids()
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.clone(), activation[idx]))
        .collect()
}
