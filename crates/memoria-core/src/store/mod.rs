//! Pluggable persistence for the memory state.

pub mod file;
#[cfg(feature = "graph-store")]
pub mod graph_db;

use async_trait::async_trait;

use crate::model::State;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[cfg(feature = "graph-store")]
    #[error("graph store error: {0}")]
    GraphDb(String),

    #[error("store not configured: {0}")]
    NotConfigured(String),
}

/// A named kind, surfaced in `status` output so callers can tell which
/// backend is active without downcasting the trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    GraphDb,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::File => "file",
            StoreKind::GraphDb => "graph-db",
        }
    }
}

/// Persistence backend for the full logical [`State`].
///
/// Implementations must make `save` atomic from the caller's perspective: a
/// crash mid-save must never leave a partially-written, unreadable state
/// behind. `search` is a best-effort accelerator; callers must not depend on
/// it returning results a full in-memory scan wouldn't also find.
#[async_trait]
pub trait Store: Send + Sync {
    async fn load(&self) -> Result<State, StoreError>;
    async fn save(&self, state: &State) -> Result<(), StoreError>;

    /// Backend-native substring search over item text/tags, returning
    /// matching item ids. Default: unsupported, caller falls back to an
    /// in-memory scan.
    async fn search(&self, _token: &str) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    fn kind(&self) -> StoreKind;
}
