//! The full logical contents of the memory: items, edges, policy, and a
//! bounded operation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::edge::MemoryEdge;
use super::item::MemoryItem;
use super::policy::Policy;

/// One entry in the rolling history of recent operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub operation: String,
    pub summary: String,
    pub at: DateTime<Utc>,
}

/// The orchestrator's durable, logical state.
///
/// Ownership: the orchestrator exclusively owns this value while processing
/// a request (behind a `tokio::sync::RwLock`); the store owns a durable
/// copy; nothing else holds a long-lived reference into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub items: BTreeMap<String, MemoryItem>,
    pub edges: Vec<MemoryEdge>,
    pub history: VecDeque<HistoryEntry>,
    pub policy: Policy,
}

impl Default for State {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            edges: Vec::new(),
            history: VecDeque::new(),
            policy: Policy::default(),
        }
    }
}

impl State {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Append to the history ring, dropping the oldest entry once the
    /// policy's `history_capacity` is exceeded.
    pub fn record_history(&mut self, operation: impl Into<String>, summary: impl Into<String>) {
        self.history.push_back(HistoryEntry {
            operation: operation.into(),
            summary: summary.into(),
            at: Utc::now(),
        });
        while self.history.len() > self.policy.history_capacity {
            self.history.pop_front();
        }
    }

    /// Remove `id` and every edge touching it, returning whether it existed.
    pub fn remove_item_cascade(&mut self, id: &str) -> bool {
        let removed = self.items.remove(id).is_some();
        if removed {
            self.edges.retain(|e| e.from != id && e.to != id);
        }
        removed
    }

    /// Check every structural and scalar-range invariant. Used by tests
    /// and debug assertions, not on the hot path.
    pub fn check_invariants(&self) -> Result<(), String> {
        for edge in &self.edges {
            if !self.items.contains_key(&edge.from) {
                return Err(format!("edge references missing item '{}'", edge.from));
            }
            if !self.items.contains_key(&edge.to) {
                return Err(format!("edge references missing item '{}'", edge.to));
            }
        }
        for item in self.items.values() {
            if !(0.0..=1.0).contains(&item.importance) {
                return Err(format!("item '{}' importance out of range", item.id));
            }
            if !(0.0..=1.0).contains(&item.energy) {
                return Err(format!("item '{}' energy out of range", item.id));
            }
            if item.updated_at < item.created_at {
                return Err(format!("item '{}' updated before created", item.id));
            }
            if item.last_accessed_at < item.created_at {
                return Err(format!("item '{}' accessed before created", item.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::MemoryType;

    fn item(id: &str) -> MemoryItem {
        let now = Utc::now();
        MemoryItem {
            id: id.into(),
            item_type: MemoryType::Fact,
            text: "x".into(),
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
    fn history_ring_is_bounded() {
        let mut state = State::new(Policy {
            history_capacity: 2,
            ..Policy::default()
        });
        state.record_history("remember", "a");
        state.record_history("remember", "b");
        state.record_history("remember", "c");
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history.front().unwrap().summary, "b");
    }

    #[test]
    fn cascade_removes_incident_edges() {
        let mut state = State::default();
        state.items.insert("a".into(), item("a"));
        state.items.insert("b".into(), item("b"));
        state.edges.push(MemoryEdge::new("a", "b", "relates-to", 0.5));
        assert!(state.remove_item_cascade("a"));
        assert!(state.edges.is_empty());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn invariants_catch_dangling_edge() {
        let mut state = State::default();
        state.items.insert("a".into(), item("a"));
        state.edges.push(MemoryEdge::new("a", "ghost", "relates-to", 0.5));
        assert!(state.check_invariants().is_err());
    }
}
