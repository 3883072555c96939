//! Directed, typed, weighted associations between memory items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A directed association from one item to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEdge {
    pub from: String,
    pub to: String,
    pub relation: String,
    /// Real in `(0, inf)`, typically `<= 1`. Reinforced over time.
    pub weight: f64,
    pub last_reinforced_at: DateTime<Utc>,
}

impl MemoryEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, relation: impl Into<String>, weight: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation: relation.into(),
            weight,
            last_reinforced_at: Utc::now(),
        }
    }

    /// Whether this edge logically matches `(from, to, relation)`, the key
    /// `associate` uses to decide reinforce-vs-insert.
    pub fn matches(&self, from: &str, to: &str, relation: &str) -> bool {
        self.from == from && self.to == to && self.relation == relation
    }
}
