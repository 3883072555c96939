//! Write-time validation: best-effort pattern rules applied to new memory
//! candidates before they are admitted into the state.
//!
//! These are heuristics, not a semantic classifier — a small, explicit set
//! of textual smells, leaving anything more sophisticated to a collaborator
//! outside this crate's scope.

use serde::{Deserialize, Serialize};

/// A single detected positive or negative signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSignal {
    pub name: String,
    pub positive: bool,
    pub detail: String,
}

/// Full result of validating a write candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub adjusted_importance: f64,
    pub signals: Vec<ValidationSignal>,
    pub confidence: f64,
}

const NUMERIC_MARKER_CHARS: &[char] = &['%', '$', '#'];

fn has_numeric_or_path_or_verification_marker(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        || text.contains('/')
        || text.contains("verified")
        || text.contains("confirmed")
        || NUMERIC_MARKER_CHARS.iter().any(|c| text.contains(*c))
}

fn has_concrete_verb(text: &str) -> bool {
    const CONCRETE_VERBS: &[&str] = &[
        "ran", "found", "fixed", "measured", "tested", "wrote", "deployed", "built", "reproduced", "profiled",
    ];
    let lower = text.to_ascii_lowercase();
    CONCRETE_VERBS.iter().any(|v| lower.contains(v))
}

fn imperative_ratio(text: &str) -> f64 {
    const IMPERATIVES: &[&str] = &["should", "must", "need to", "always", "never"];
    let lower = text.to_ascii_lowercase();
    let words = lower.split_whitespace().count().max(1);
    let hits: usize = IMPERATIVES.iter().map(|w| lower.matches(w).count()).sum();
    hits as f64 / words as f64
}

fn is_circular_meta_reference(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.matches("this memory").count() + lower.matches("this note").count() >= 2
}

/// Performance claims phrased without any number to back them ("much
/// faster", "significantly improved") rather than a concrete measurement.
fn has_vague_performance_claim(text: &str) -> bool {
    const VAGUE_PERF_PHRASES: &[&str] = &[
        "much faster",
        "a lot faster",
        "significantly improved",
        "significantly faster",
        "way faster",
        "huge improvement",
        "massively improved",
        "noticeably faster",
        "much better performance",
    ];
    let lower = text.to_ascii_lowercase();
    VAGUE_PERF_PHRASES.iter().any(|p| lower.contains(p)) && !has_numeric_or_path_or_verification_marker(text)
}

/// Hedging language asserting a conclusion without anything grounding it —
/// no measurement, no file, no verification word.
fn has_unsupported_rationalization(text: &str) -> bool {
    const HEDGES: &[&str] = &[
        "probably",
        "i think",
        "i believe",
        "should be fine",
        "should work",
        "seems like",
        "most likely",
        "presumably",
    ];
    let lower = text.to_ascii_lowercase();
    HEDGES.iter().any(|h| lower.contains(h)) && !has_numeric_or_path_or_verification_marker(text)
}

/// Validate a candidate write, returning an adjusted importance the
/// orchestrator should store instead of the caller's raw value.
///
/// Claimed importance at or above `floor` without a concrete supporting
/// marker (numeric, path, or verification language) is down-weighted
/// rather than rejected outright — the caller may retry with specifics.
pub fn validate(text: &str, claimed_importance: f64, floor: f64) -> ValidationOutcome {
    let mut signals = Vec::new();
    let mut adjusted = claimed_importance.clamp(0.0, 1.0);
    let mut confidence: f64 = 1.0;

    if claimed_importance >= floor && !has_numeric_or_path_or_verification_marker(text) {
        signals.push(ValidationSignal {
            name: "unsupported-high-importance".into(),
            positive: false,
            detail: format!("importance {claimed_importance:.2} claimed without a numeric, path, or verification marker"),
        });
        adjusted = (floor - 0.1).max(0.0).min(adjusted);
        confidence -= 0.3;
    }

    if !has_concrete_verb(text) && imperative_ratio(text) > 0.08 {
        signals.push(ValidationSignal {
            name: "imperative-without-action".into(),
            positive: false,
            detail: "high imperative-to-action ratio with no concrete verbs".into(),
        });
        adjusted *= 0.85;
        confidence -= 0.2;
    }

    if is_circular_meta_reference(text) {
        signals.push(ValidationSignal {
            name: "circular-meta-reference".into(),
            positive: false,
            detail: "text refers to itself rather than to external content".into(),
        });
        adjusted *= 0.7;
        confidence -= 0.2;
    }

    if has_vague_performance_claim(text) {
        signals.push(ValidationSignal {
            name: "vague-performance-claim".into(),
            positive: false,
            detail: "performance language without a supporting number".into(),
        });
        adjusted *= 0.8;
        confidence -= 0.2;
    }

    if has_unsupported_rationalization(text) {
        signals.push(ValidationSignal {
            name: "unsupported-rationalization".into(),
            positive: false,
            detail: "hedged conclusion with no grounding signal".into(),
        });
        adjusted *= 0.85;
        confidence -= 0.15;
    }

    if has_concrete_verb(text) && has_numeric_or_path_or_verification_marker(text) {
        signals.push(ValidationSignal {
            name: "grounded-claim".into(),
            positive: true,
            detail: "concrete verb plus a numeric, path, or verification marker".into(),
        });
        confidence += 0.1;
    }

    ValidationOutcome {
        valid: confidence > 0.0,
        adjusted_importance: adjusted.clamp(0.0, 1.0),
        signals,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_high_importance_is_downweighted() {
        let outcome = validate("this seems really important somehow", 0.95, 0.9);
        assert!(outcome.adjusted_importance < 0.9);
        assert!(outcome.signals.iter().any(|s| s.name == "unsupported-high-importance"));
    }

    #[test]
    fn grounded_claim_keeps_importance_and_raises_confidence() {
        let outcome = validate("ran the benchmark at src/bench.rs, confirmed 2.1x speedup", 0.95, 0.9);
        assert!(outcome.signals.iter().any(|s| s.positive));
    }

    #[test]
    fn modest_claim_is_unaffected() {
        let outcome = validate("the build takes about 3 minutes", 0.4, 0.9);
        assert_eq!(outcome.adjusted_importance, 0.4);
        assert!(outcome.valid);
    }

    #[test]
    fn vague_performance_claim_is_flagged() {
        let outcome = validate("the new query path is much faster now", 0.4, 0.9);
        assert!(outcome.signals.iter().any(|s| s.name == "vague-performance-claim"));
    }

    #[test]
    fn performance_claim_with_a_number_is_not_flagged() {
        let outcome = validate("ran the benchmark, much faster at 120ms vs 900ms before", 0.4, 0.9);
        assert!(!outcome.signals.iter().any(|s| s.name == "vague-performance-claim"));
    }

    #[test]
    fn unsupported_rationalization_is_flagged() {
        let outcome = validate("probably should be fine without the extra check", 0.4, 0.9);
        assert!(outcome.signals.iter().any(|s| s.name == "unsupported-rationalization"));
    }
}
