//! Orchestrator-boundary request types.
//!
//! `deny_unknown_fields` on every one of these: a stray field is a bug (or
//! an injection attempt) in the caller, not something to silently ignore.

use serde::{Deserialize, Serialize};

use super::item::MemoryType;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RememberInput {
    pub text: String,
    pub item_type: MemoryType,
    #[serde(default)]
    pub tags: Vec<String>,
    pub importance: f64,
    #[serde(default = "default_ttl")]
    pub ttl: String,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_ttl() -> String {
    "30d".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssociateInput {
    pub from: String,
    pub to: String,
    pub relation: String,
    pub weight: f64,
}

/// Outcome reported by `feedback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackOutcome {
    Success,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeedbackInput {
    pub id: String,
    pub outcome: FeedbackOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecallInput {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_limit() -> usize {
    10
}
