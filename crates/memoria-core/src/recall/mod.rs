//! Query-to-seed mapping, activation-backed ranking, and access bookkeeping.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::activation::{self, ActivationParams};
use crate::graph::GraphEngine;
use crate::model::{MemoryItem, State};

/// Weights used to combine activation, recency, and importance into a
/// single recall score. Spec-recommended defaults.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub activation: f64,
    pub recency: f64,
    pub importance: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            activation: 0.60,
            recency: 0.25,
            importance: 0.15,
        }
    }
}

/// A single ranked recall result.
#[derive(Debug, Clone)]
pub struct RecallHit {
    pub id: String,
    pub score: f64,
}

/// Tokenise a query into lowercase, non-empty whitespace-delimited terms.
fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Build seed activations by matching query tokens against item text/tags.
///
/// A seed's strength is the fraction of query tokens the item matches,
/// clamped to 1.0. Items matching no token are not seeded at all.
fn seed_from_query(state: &State, tokens: &[String]) -> BTreeMap<String, f64> {
    let mut seeds = BTreeMap::new();
    if tokens.is_empty() {
        return seeds;
    }
    for item in state.items.values() {
        let matched = tokens.iter().filter(|t| item.matches_token(t)).count();
        if matched > 0 {
            let strength = (matched as f64 / tokens.len() as f64).clamp(0.0, 1.0);
            seeds.insert(item.id.clone(), strength);
        }
    }
    seeds
}

/// Exponential recency decay over `last_accessed_at`, half-life one week.
fn recency_score(item: &MemoryItem) -> f64 {
    const HALF_LIFE_DAYS: f64 = 7.0;
    let age_days = (Utc::now() - item.last_accessed_at).num_seconds() as f64 / 86_400.0;
    let age_days = age_days.max(0.0);
    (std::f64::consts::LN_2 * -age_days / HALF_LIFE_DAYS).exp().clamp(0.0, 1.0)
}

/// Run the full recall pipeline: tokenise, seed, activate, score, filter,
/// rank. Does not mutate `state` — the orchestrator applies the access
/// bookkeeping to the returned ids after ranking.
pub fn recall(
    state: &State,
    graph: &GraphEngine,
    query: &str,
    limit: usize,
    scope: Option<&str>,
) -> Vec<RecallHit> {
    let tokens = tokenize(query);
    let seeds = seed_from_query(state, &tokens);
    if seeds.is_empty() {
        return Vec::new();
    }

    let activation = activation::spread(graph, &seeds, ActivationParams::from_policy(&state.policy));
    let weights = ScoreWeights::default();

    let mut scored: Vec<(String, f64, f64)> = state
        .items
        .values()
        .filter(|item| scope.is_none_or(|s| item.scope.as_deref() == Some(s)))
        .filter_map(|item| {
            // Only items spreading activation actually reached are
            // candidates; recency/importance alone must not surface an
            // otherwise-unrelated item.
            let act = activation.get(&item.id).copied().filter(|a| *a > 0.0)?;
            let score = weights.activation * act + weights.recency * recency_score(item) + weights.importance * item.importance;
            Some((item.id.clone(), score, item.importance))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap()
            .then_with(|| b.2.partial_cmp(&a.2).unwrap())
            .then_with(|| a.0.cmp(&b.0))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(id, score, _)| RecallHit { id, score })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemoryEdge, MemoryItem, MemoryType};
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn item(id: &str, text: &str, tags: &[&str]) -> MemoryItem {
        let now = Utc::now();
        MemoryItem {
            id: id.into(),
            item_type: MemoryType::Fact,
            text: text.into(),
            tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
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
    fn empty_query_yields_no_hits() {
        let state = State::default();
        let graph = GraphEngine::build(&state);
        assert!(recall(&state, &graph, "", 10, None).is_empty());
    }

    #[test]
    fn no_match_yields_no_hits() {
        let mut state = State::default();
        state.items.insert("a".into(), item("a", "hello world", &[]));
        let graph = GraphEngine::build(&state);
        assert!(recall(&state, &graph, "zzz-nonexistent", 10, None).is_empty());
    }

    #[test]
    fn two_community_recall_ranks_own_cluster_higher() {
        let mut state = State::default();
        for id in ["m1", "m2", "m3"] {
            state.items.insert(id.into(), item(id, "memory note", &["mem", "a", "b", "c"]));
        }
        for id in ["n1", "n2", "n3"] {
            state.items.insert(id.into(), item(id, "network note", &["net", "x", "y", "z"]));
        }
        state.edges.push(MemoryEdge::new("m1", "m2", "relates-to", 0.7));
        state.edges.push(MemoryEdge::new("m2", "m3", "relates-to", 0.7));
        state.edges.push(MemoryEdge::new("m1", "m3", "relates-to", 0.7));
        state.edges.push(MemoryEdge::new("n1", "n2", "relates-to", 0.7));
        state.edges.push(MemoryEdge::new("n2", "n3", "relates-to", 0.7));
        state.edges.push(MemoryEdge::new("n1", "n3", "relates-to", 0.7));
        state.edges.push(MemoryEdge::new("m1", "n1", "bridges-to", 0.3));

        let graph = GraphEngine::build(&state);
        let hits = recall(&state, &graph, "mem", 10, None);
        let rank_of = |id: &str| hits.iter().position(|h| h.id == id).unwrap();

        for mem_id in ["m2", "m3"] {
            for net_id in ["n1", "n2", "n3"] {
                assert!(
                    rank_of(mem_id) < rank_of(net_id),
                    "{mem_id} should rank above {net_id}"
                );
            }
        }
    }

    #[test]
    fn scope_filter_excludes_other_scopes() {
        let mut state = State::default();
        let mut a = item("a", "shared topic", &[]);
        a.scope = Some("proj-a".into());
        let mut b = item("b", "shared topic", &[]);
        b.scope = Some("proj-b".into());
        state.items.insert("a".into(), a);
        state.items.insert("b".into(), b);
        let graph = GraphEngine::build(&state);
        let hits = recall(&state, &graph, "shared", 10, Some("proj-a"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }
}
