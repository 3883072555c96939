//! The knowledge unit of the memory graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Closed enumeration of memory item kinds.
///
/// Extensible only by design change — callers must not expect an
/// `Other`/`Custom` catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Event,
    Fact,
    Plan,
    Reflection,
    Entity,
    Principle,
    Technique,
    Warning,
    Workflow,
    Bridge,
    Pattern,
    Insight,
}

impl MemoryType {
    /// Stable lowercase name, used by the store and the manifest renderer.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Event => "event",
            MemoryType::Fact => "fact",
            MemoryType::Plan => "plan",
            MemoryType::Reflection => "reflection",
            MemoryType::Entity => "entity",
            MemoryType::Principle => "principle",
            MemoryType::Technique => "technique",
            MemoryType::Warning => "warning",
            MemoryType::Workflow => "workflow",
            MemoryType::Bridge => "bridge",
            MemoryType::Pattern => "pattern",
            MemoryType::Insight => "insight",
        }
    }

    /// Parse from the stable lowercase name, rejecting anything else.
    pub fn parse_name(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().as_str() {
            "event" => MemoryType::Event,
            "fact" => MemoryType::Fact,
            "plan" => MemoryType::Plan,
            "reflection" => MemoryType::Reflection,
            "entity" => MemoryType::Entity,
            "principle" => MemoryType::Principle,
            "technique" => MemoryType::Technique,
            "warning" => MemoryType::Warning,
            "workflow" => MemoryType::Workflow,
            "bridge" => MemoryType::Bridge,
            "pattern" => MemoryType::Pattern,
            "insight" => MemoryType::Insight,
            _ => return None,
        })
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single unit of knowledge in the memory graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryItem {
    /// Opaque stable identifier, unique within a state.
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: MemoryType,
    pub text: String,
    /// Short labels, order-insignificant and deduplicated.
    pub tags: BTreeSet<String>,
    /// How much the item "burned in" at creation; adjusted by feedback.
    pub importance: f64,
    /// Current activation/freshness; decays over time, boosted by recall.
    pub energy: f64,
    /// Informational lifetime hint (e.g. "30d"); not a hard expiry.
    pub ttl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub success: u64,
    pub fail: u64,
}

impl MemoryItem {
    /// Clamp `importance` and `energy` back into `[0, 1]`.
    ///
    /// Called after every mutation so the range invariant holds
    /// unconditionally rather than being re-derived at each call site.
    pub fn clamp_scalars(&mut self) {
        self.importance = self.importance.clamp(0.0, 1.0);
        self.energy = self.energy.clamp(0.0, 1.0);
    }

    /// Whether `text` or any tag contains `token` (case-insensitive).
    pub fn matches_token(&self, token: &str) -> bool {
        let token = token.to_ascii_lowercase();
        if self.text.to_ascii_lowercase().contains(&token) {
            return true;
        }
        self.tags
            .iter()
            .any(|t| t.to_ascii_lowercase().contains(&token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_roundtrip() {
        for t in [
            MemoryType::Event,
            MemoryType::Fact,
            MemoryType::Plan,
            MemoryType::Bridge,
            MemoryType::Insight,
        ] {
            assert_eq!(MemoryType::parse_name(t.as_str()), Some(t));
        }
        assert_eq!(MemoryType::parse_name("not-a-type"), None);
    }

    #[test]
    fn clamp_scalars_bounds() {
        let mut item = make_item();
        item.importance = 1.5;
        item.energy = -0.3;
        item.clamp_scalars();
        assert_eq!(item.importance, 1.0);
        assert_eq!(item.energy, 0.0);
    }

    fn make_item() -> MemoryItem {
        let now = Utc::now();
        MemoryItem {
            id: "m1".into(),
            item_type: MemoryType::Fact,
            text: "the mitochondria".into(),
            tags: BTreeSet::new(),
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
}
