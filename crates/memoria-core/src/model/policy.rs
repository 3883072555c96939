//! Tunable thresholds governing activation, decay, pruning, and the manifest.

use serde::{Deserialize, Serialize};

/// Policy thresholds, with conservative, well-tested defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Spreading activation iteration count.
    pub activation_steps: u32,
    /// Per-step decay factor applied to propagated activation.
    pub activation_decay: f64,
    /// Minimum activation a node must hold to propagate further.
    pub activation_threshold: f64,
    /// Half-life, in days, used by `decay` when the caller omits one.
    pub energy_decay_half_life_days: f64,
    /// Items at or below this energy are pruning candidates.
    pub pruning_energy_floor: f64,
    /// Access-count ceiling below which a low-energy item is pruned.
    pub pruning_access_floor: u64,
    /// Manifest cache staleness window, in milliseconds.
    pub manifest_ttl_ms: u64,
    /// Maximum an edge weight may be reinforced to.
    pub max_edge_weight: f64,
    /// Importance claims at/above this require a specific, validated signal.
    pub importance_validation_floor: f64,
    /// Bounded history ring size kept on `State`.
    pub history_capacity: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            activation_steps: 3,
            activation_decay: 0.85,
            activation_threshold: 0.1,
            energy_decay_half_life_days: 30.0,
            pruning_energy_floor: 0.05,
            pruning_access_floor: 2,
            manifest_ttl_ms: 60_000,
            max_edge_weight: 1.0,
            importance_validation_floor: 0.9,
            history_capacity: 200,
        }
    }
}
