//! Temporal stratification: classify every item into exactly one layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::MemoryItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalLayer {
    Emerging,
    Active,
    Stable,
    Decaying,
}

impl TemporalLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalLayer::Emerging => "emerging",
            TemporalLayer::Active => "active",
            TemporalLayer::Stable => "stable",
            TemporalLayer::Decaying => "decaying",
        }
    }
}

/// Classify a single item as of `now`.
pub fn classify(item: &MemoryItem, now: DateTime<Utc>) -> TemporalLayer {
    if now - item.created_at <= Duration::hours(24) {
        return TemporalLayer::Emerging;
    }
    if now - item.last_accessed_at <= Duration::days(7) {
        return TemporalLayer::Active;
    }
    if now - item.updated_at > Duration::days(30) && item.energy > 0.1 {
        return TemporalLayer::Stable;
    }
    if item.energy <= 0.1 && item.access_count < 3 {
        return TemporalLayer::Decaying;
    }
    TemporalLayer::Active
}

/// Per-layer counts across the whole state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemporalCounts {
    pub emerging: usize,
    pub active: usize,
    pub stable: usize,
    pub decaying: usize,
}

pub fn stratify<'a>(items: impl Iterator<Item = &'a MemoryItem>, now: DateTime<Utc>) -> TemporalCounts {
    let mut counts = TemporalCounts::default();
    for item in items {
        match classify(item, now) {
            TemporalLayer::Emerging => counts.emerging += 1,
            TemporalLayer::Active => counts.active += 1,
            TemporalLayer::Stable => counts.stable += 1,
            TemporalLayer::Decaying => counts.decaying += 1,
        }
    }
    counts
}
