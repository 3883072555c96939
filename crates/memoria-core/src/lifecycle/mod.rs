//! Creation, reinforcement, feedback, decay, and consolidation.

mod validation;

pub use validation::{ValidationOutcome, ValidationSignal};

use chrono::Utc;
use uuid::Uuid;

use crate::model::{FeedbackOutcome, MemoryEdge, MemoryItem, MemoryType, Policy, State};

/// `remember` — admit a new item into the state.
///
/// Returns the new id, or the validator's outcome if the write was
/// rejected. The orchestrator is responsible for translating a rejected
/// outcome into `CoreError::ValidationRejected`.
pub fn remember(
    state: &mut State,
    text: String,
    item_type: MemoryType,
    tags: Vec<String>,
    importance: f64,
    ttl: String,
    scope: Option<String>,
) -> Result<String, ValidationOutcome> {
    let outcome = validation::validate(&text, importance, state.policy.importance_validation_floor);
    if !outcome.valid {
        return Err(outcome);
    }

    let now = Utc::now();
    let id = Uuid::new_v4().to_string();
    let item = MemoryItem {
        id: id.clone(),
        item_type,
        text,
        tags: tags.into_iter().collect(),
        importance: outcome.adjusted_importance,
        energy: outcome.adjusted_importance,
        ttl,
        scope,
        created_at: now,
        updated_at: now,
        last_accessed_at: now,
        access_count: 0,
        success: 0,
        fail: 0,
    };
    state.items.insert(id.clone(), item);
    state.record_history("remember", &id);
    Ok(id)
}

/// `associate` — insert or reinforce a directed edge between two items.
///
/// Returns `Err` with a description of the missing endpoint if either side
/// does not exist.
pub fn associate(state: &mut State, from: &str, to: &str, relation: &str, weight: f64) -> Result<(), String> {
    if !state.items.contains_key(from) {
        return Err(from.to_string());
    }
    if !state.items.contains_key(to) {
        return Err(to.to_string());
    }

    let max_weight = state.policy.max_edge_weight;
    if let Some(edge) = state.edges.iter_mut().find(|e| e.matches(from, to, relation)) {
        edge.weight = (edge.weight + weight).min(max_weight);
        edge.last_reinforced_at = Utc::now();
    } else {
        state.edges.push(MemoryEdge::new(from, to, relation, weight.min(max_weight)));
    }
    state.record_history("associate", format!("{from}->{to} ({relation})"));
    Ok(())
}

/// `feedback` — apply a success/fail signal to an existing item.
pub fn feedback(state: &mut State, id: &str, outcome: FeedbackOutcome) -> Result<(), String> {
    let item = state.items.get_mut(id).ok_or_else(|| id.to_string())?;
    match outcome {
        FeedbackOutcome::Success => {
            item.success += 1;
            item.energy *= 1.1;
            item.importance += 0.02;
        }
        FeedbackOutcome::Fail => {
            item.fail += 1;
            item.energy *= 0.9;
        }
    }
    item.clamp_scalars();
    item.updated_at = Utc::now();
    state.record_history("feedback", format!("{id} {outcome:?}"));
    Ok(())
}

/// `decay` — apply exponential energy decay since each item's last access.
///
/// Returns the number of items whose energy changed.
pub fn decay(state: &mut State, half_life_days: f64) -> Result<usize, String> {
    if half_life_days <= 0.0 {
        return Err(format!("half-life must be positive, got {half_life_days}"));
    }
    let now = Utc::now();
    let mut updated = 0;
    for item in state.items.values_mut() {
        let age_days = (now - item.last_accessed_at).num_seconds() as f64 / 86_400.0;
        if age_days <= 0.0 {
            continue;
        }
        let factor = (std::f64::consts::LN_2 * -1.0 * age_days / half_life_days).exp();
        let next = item.energy * factor;
        item.energy = if next < 1e-2 { 0.0 } else { next };
        updated += 1;
    }
    state.record_history("decay", format!("half_life_days={half_life_days}"));
    Ok(updated)
}

/// `consolidate` — prune low-energy, rarely-accessed items and their
/// incident edges. Idempotent: a second call on the already-pruned state
/// removes nothing further.
pub fn consolidate(state: &mut State) -> usize {
    let floor = state.policy.pruning_energy_floor;
    let access_floor = state.policy.pruning_access_floor;
    let victims: Vec<String> = state
        .items
        .values()
        .filter(|item| item.energy < floor && item.access_count < access_floor)
        .map(|item| item.id.clone())
        .collect();
    for id in &victims {
        state.remove_item_cascade(id);
    }
    state.record_history("consolidate", format!("pruned={}", victims.len()));
    victims.len()
}

/// Build the default [`Policy`] — exposed here so lifecycle tests and the
/// orchestrator share one source of truth for defaults.
pub fn default_policy() -> Policy {
    Policy::default()
}
