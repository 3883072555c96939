//! Core orchestrator: the single entry point that owns the state lock,
//! wires the lifecycle/recall/manifest subsystems together, and talks to
//! the configured store.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::error::{CoreError, Result};
use crate::graph::GraphEngine;
use crate::lifecycle;
use crate::manifest::{self, summarizer::Summarizer, Manifest};
use crate::model::{AssociateInput, FeedbackInput, MemoryType, RecallInput, RememberInput, State};
use crate::recall;
use crate::store::Store;

/// Runtime configuration, assembled either from the environment (the
/// deployed default) or programmatically (tests, embedders).
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `state.json` when the file store is active.
    pub state_dir: PathBuf,
    /// Bolt URI for the graph-database store; `None` selects the file store.
    pub graph_store_uri: Option<String>,
    pub graph_store_user: String,
    pub graph_store_password: String,
    /// Manifest cache staleness window.
    pub manifest_ttl_ms: u64,
    pub activation_steps: u32,
    pub activation_decay: f64,
    pub activation_threshold: f64,
    /// Timeout applied to each external summariser call.
    pub summarizer_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            graph_store_uri: None,
            graph_store_user: String::new(),
            graph_store_password: String::new(),
            manifest_ttl_ms: 60_000,
            activation_steps: 3,
            activation_decay: 0.85,
            activation_threshold: 0.1,
            summarizer_timeout_ms: 2_000,
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to documented
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            state_dir: std::env::var("MEMORY_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_dir),
            graph_store_uri: std::env::var("GRAPH_STORE_URI").ok(),
            graph_store_user: std::env::var("GRAPH_STORE_USER").unwrap_or_default(),
            graph_store_password: std::env::var("GRAPH_STORE_PASSWORD").unwrap_or_default(),
            manifest_ttl_ms: env_parsed("MANIFEST_TTL_MS", defaults.manifest_ttl_ms),
            activation_steps: env_parsed("ACTIVATION_STEPS", defaults.activation_steps),
            activation_decay: env_parsed("ACTIVATION_DECAY", defaults.activation_decay),
            activation_threshold: env_parsed("ACTIVATION_THRESHOLD", defaults.activation_threshold),
            summarizer_timeout_ms: defaults.summarizer_timeout_ms,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn default_state_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "memoria", "memoria")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".memoria"))
}

/// Everything the manifest pipeline and status output need about the
/// active store, without leaking the trait object past this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    GraphDb,
}

struct CachedManifest {
    manifest: Manifest,
    generated_at: std::time::Instant,
    /// Set by a write once its change has invalidated this rendering.
    /// The manifest itself is kept so a concurrent read still has a last
    /// valid rendering to return while a background regeneration runs.
    stale: bool,
}

/// State shared between `MemoryCore` and its background regeneration task.
/// Split out of `MemoryCore` so `tokio::spawn` can hold an owned `Arc`
/// without requiring callers to wrap the whole orchestrator in one.
struct Inner {
    state: RwLock<State>,
    store: Arc<dyn Store>,
    config: Config,
    manifest_cache: RwLock<Option<CachedManifest>>,
    regenerating: AtomicBool,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl Inner {
    async fn persist(&self, state: &State) -> Result<()> {
        self.store.save(state).await?;
        if let Some(cached) = self.manifest_cache.write().await.as_mut() {
            cached.stale = true;
        }
        Ok(())
    }

    /// Regenerate the manifest synchronously and refresh the cache.
    async fn regenerate(&self) -> Result<Manifest> {
        let state = self.state.read().await;
        let graph = GraphEngine::build(&state);
        let summarizer = self.summarizer.as_deref();
        let timeout = Duration::from_millis(self.config.summarizer_timeout_ms);
        let manifest = manifest::generate(&state, &graph, summarizer, timeout).await?;
        *self.manifest_cache.write().await = Some(CachedManifest {
            manifest: manifest.clone(),
            generated_at: std::time::Instant::now(),
            stale: false,
        });
        tracing::debug!(themes = manifest.themes.len(), "manifest regenerated");
        Ok(manifest)
    }
}

/// The public orchestrator: owns the logical state behind one write lock,
/// delegates to the lifecycle/recall/manifest modules, and persists through
/// the configured [`Store`].
pub struct MemoryCore {
    inner: Arc<Inner>,
}

impl MemoryCore {
    /// Load state through `store` and apply the configured activation and
    /// manifest-cache parameters to its policy, so a redeployment with
    /// different environment settings takes effect without an explicit
    /// migration step.
    ///
    /// A store that cannot be reached on load does not fail construction:
    /// it falls back to an empty state with a recorded warning, so a
    /// transient backend outage at startup degrades rather than crashes.
    pub async fn new(store: Arc<dyn Store>, config: Config) -> Result<Self> {
        let mut state = match store.load().await {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(error = %err, "store unavailable on load, starting from empty state");
                State::default()
            }
        };
        state.policy.activation_steps = config.activation_steps;
        state.policy.activation_decay = config.activation_decay;
        state.policy.activation_threshold = config.activation_threshold;
        state.policy.manifest_ttl_ms = config.manifest_ttl_ms;
        tracing::info!(items = state.items.len(), edges = state.edges.len(), "state loaded");
        Ok(Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                store,
                config,
                manifest_cache: RwLock::new(None),
                regenerating: AtomicBool::new(false),
                summarizer: None,
            }),
        })
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        Arc::get_mut(&mut self.inner)
            .expect("with_summarizer called before any clone of the orchestrator escapes")
            .summarizer = Some(summarizer);
        self
    }

    pub async fn remember(&self, input: RememberInput) -> Result<String> {
        let mut state = self.inner.state.write().await;
        let item_type = input.item_type;
        let id = lifecycle::remember(
            &mut state,
            input.text,
            item_type,
            input.tags,
            input.importance,
            input.ttl,
            input.scope,
        )
        .map_err(|outcome| CoreError::ValidationRejected { outcome })?;
        self.inner.persist(&state).await?;
        tracing::info!(id = %id, item_type = %item_type, "remembered");
        Ok(id)
    }

    pub async fn associate(&self, input: AssociateInput) -> Result<()> {
        let mut state = self.inner.state.write().await;
        lifecycle::associate(&mut state, &input.from, &input.to, &input.relation, input.weight)
            .map_err(CoreError::UnknownReference)?;
        self.inner.persist(&state).await?;
        tracing::info!(from = %input.from, to = %input.to, relation = %input.relation, "associated");
        Ok(())
    }

    pub async fn feedback(&self, input: FeedbackInput) -> Result<()> {
        let mut state = self.inner.state.write().await;
        lifecycle::feedback(&mut state, &input.id, input.outcome).map_err(CoreError::UnknownReference)?;
        self.inner.persist(&state).await?;
        Ok(())
    }

    pub async fn decay(&self, half_life_days: Option<f64>) -> Result<usize> {
        let mut state = self.inner.state.write().await;
        let half_life = half_life_days.unwrap_or(state.policy.energy_decay_half_life_days);
        let updated = lifecycle::decay(&mut state, half_life).map_err(CoreError::InvalidInput)?;
        self.inner.persist(&state).await?;
        tracing::info!(updated, "decay applied");
        Ok(updated)
    }

    pub async fn consolidate(&self) -> Result<usize> {
        let mut state = self.inner.state.write().await;
        let pruned = lifecycle::consolidate(&mut state);
        self.inner.persist(&state).await?;
        tracing::info!(pruned, "consolidation complete");
        Ok(pruned)
    }

    /// Rank items by activation-backed relevance. Scoring runs under a read
    /// lock so concurrent `recall`/`status`/`describe` calls never block one
    /// another; only the access-count bookkeeping on a hit takes the write
    /// lock, and only briefly.
    pub async fn recall(&self, input: RecallInput) -> Result<Vec<recall::RecallHit>> {
        let hits = {
            let state = self.inner.state.read().await;
            let graph = GraphEngine::build(&state);
            recall::recall(&state, &graph, &input.query, input.limit, input.scope.as_deref())
        };

        if hits.is_empty() {
            return Ok(hits);
        }

        let mut state = self.inner.state.write().await;
        let now = chrono::Utc::now();
        for hit in &hits {
            if let Some(item) = state.items.get_mut(&hit.id) {
                item.access_count += 1;
                item.last_accessed_at = now;
                item.energy = (item.energy + 0.05).min(1.0);
            }
        }
        state.record_history("recall", format!("query={:?} hits={}", input.query, hits.len()));
        self.inner.persist(&state).await?;
        Ok(hits)
    }

    /// Return the cached manifest, regenerating as needed.
    ///
    /// A fresh cache entry is returned directly. A stale one (TTL expired,
    /// or invalidated by a write) is still returned immediately — writers
    /// must never block on manifest regeneration — while a background task
    /// recomputes it for the next read. Only the very first call, with no
    /// prior rendering to fall back on, regenerates synchronously.
    pub async fn status(&self) -> Result<Manifest> {
        let cache = self.inner.manifest_cache.read().await;
        match cache.as_ref() {
            Some(cached) => {
                let ttl = Duration::from_millis(self.inner.config.manifest_ttl_ms);
                if !cached.stale && cached.generated_at.elapsed() < ttl {
                    return Ok(cached.manifest.clone());
                }
                let last_valid = cached.manifest.clone();
                drop(cache);
                self.spawn_regeneration();
                Ok(last_valid)
            }
            None => {
                drop(cache);
                self.refresh().await
            }
        }
    }

    fn spawn_regeneration(&self) {
        if self.inner.regenerating.swap(true, Ordering::AcqRel) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Err(err) = inner.regenerate().await {
                tracing::warn!(error = %err, "background manifest regeneration failed");
            }
            inner.regenerating.store(false, Ordering::Release);
        });
    }

    /// Alias retained for the symbolic operation name in the external
    /// interface table; behaves identically to `status`.
    pub async fn describe(&self) -> Result<String> {
        Ok(self.status().await?.render())
    }

    /// Force synchronous manifest regeneration, bypassing cache staleness.
    pub async fn refresh(&self) -> Result<Manifest> {
        self.inner.regenerate().await
    }

    pub fn backend_kind(&self) -> BackendKind {
        match self.inner.store.kind() {
            crate::store::StoreKind::File => BackendKind::File,
            crate::store::StoreKind::GraphDb => BackendKind::GraphDb,
        }
    }

    pub async fn item_count(&self) -> usize {
        self.inner.state.read().await.items.len()
    }
}
