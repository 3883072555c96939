//! Theme naming: a deterministic keyword-based default, plus an optional
//! external summariser capability behind a timeout.

use std::time::Duration;

use async_trait::async_trait;

/// What the generator hands to a theme-naming collaborator: enough context
/// to name a community without leaking the full state.
#[derive(Debug, Clone)]
pub struct ThemeContext {
    pub item_types: Vec<String>,
    pub top_tags: Vec<String>,
    pub top_item_previews: Vec<String>,
}

/// An optional external capability that names a community theme in 2-4
/// words. Implementations must treat timeout/failure as normal — the
/// generator always has the keyword fallback.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn name_theme(&self, ctx: &ThemeContext) -> Result<String, SummarizerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    #[error("summariser timed out")]
    Timeout,
    #[error("summariser transport error: {0}")]
    Transport(String),
}

/// Default, dependency-free theme: top keywords joined with the titles of
/// the top 3 items by importance (already selected by the caller into
/// `ctx.top_item_previews`).
pub fn keyword_summary(ctx: &ThemeContext) -> String {
    let keywords = if ctx.top_tags.is_empty() {
        "general".to_string()
    } else {
        ctx.top_tags.join(", ")
    };
    let previews = ctx.top_item_previews.join("; ");
    if previews.is_empty() {
        keywords
    } else {
        format!("{keywords} — {previews}")
    }
}

/// Run `summarizer.name_theme(ctx)` with `timeout`, falling back to the
/// keyword summary on timeout, error, or absence of a summariser.
pub async fn summarize_theme(summarizer: Option<&dyn Summarizer>, ctx: &ThemeContext, timeout: Duration) -> String {
    let Some(summarizer) = summarizer else {
        return keyword_summary(ctx);
    };

    match tokio::time::timeout(timeout, summarizer.name_theme(ctx)).await {
        Ok(Ok(name)) => name,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "summariser failed, falling back to keyword summary");
            keyword_summary(ctx)
        }
        Err(_) => {
            tracing::warn!("summariser timed out, falling back to keyword summary");
            keyword_summary(ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFails;

    #[async_trait]
    impl Summarizer for AlwaysFails {
        async fn name_theme(&self, _ctx: &ThemeContext) -> Result<String, SummarizerError> {
            Err(SummarizerError::Transport("refused".into()))
        }
    }

    struct NeverResolves;

    #[async_trait]
    impl Summarizer for NeverResolves {
        async fn name_theme(&self, _ctx: &ThemeContext) -> Result<String, SummarizerError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn ctx() -> ThemeContext {
        ThemeContext {
            item_types: vec!["fact".into()],
            top_tags: vec!["memory".into(), "graph".into()],
            top_item_previews: vec!["an important fact".into()],
        }
    }

    #[test]
    fn keyword_summary_is_deterministic() {
        let c = ctx();
        assert_eq!(keyword_summary(&c), keyword_summary(&c));
        assert!(keyword_summary(&c).contains("memory"));
    }

    #[tokio::test]
    async fn absent_summarizer_falls_back() {
        let result = summarize_theme(None, &ctx(), Duration::from_millis(10)).await;
        assert_eq!(result, keyword_summary(&ctx()));
    }

    #[tokio::test]
    async fn failing_summarizer_falls_back() {
        let s = AlwaysFails;
        let result = summarize_theme(Some(&s), &ctx(), Duration::from_millis(50)).await;
        assert_eq!(result, keyword_summary(&ctx()));
    }

    #[tokio::test]
    async fn timing_out_summarizer_falls_back() {
        let s = NeverResolves;
        let result = summarize_theme(Some(&s), &ctx(), Duration::from_millis(20)).await;
        assert_eq!(result, keyword_summary(&ctx()));
    }
}
