//! # Memoria Core
//!
//! Persistent associative memory for long-running agents: a typed item/edge
//! graph, spreading-activation recall, an energy/importance lifecycle, and a
//! bounded manifest synthesised from community detection and centrality.
//!
//! ## Modules
//!
//! - [`model`] — items, edges, policy, and the full logical [`model::State`]
//! - [`graph`] — adjacency built from state, used by activation and manifest
//! - [`activation`] — bounded spreading activation over the graph
//! - [`recall`] — query tokenisation, seeding, activation-backed ranking
//! - [`lifecycle`] — remember/associate/feedback/decay/consolidate, and
//!   write-time validation
//! - [`manifest`] — community detection, centrality, temporal stratification,
//!   and bounded rendering of the memory's current shape
//! - [`store`] — pluggable persistence (file-backed JSON, graph database)
//! - [`orchestrator`] — the single entry point gluing the above together
//!   behind one writer lock
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use memoria_core::{Config, MemoryCore, RememberInput, MemoryType};
//! use memoria_core::store::file::FileStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> memoria_core::Result<()> {
//! let store = Arc::new(FileStore::new("./memoria-data").await?);
//! let core = MemoryCore::new(store, Config::from_env()).await?;
//!
//! let id = core.remember(RememberInput {
//!     text: "ran the migration and confirmed zero downtime".into(),
//!     item_type: MemoryType::Fact,
//!     tags: vec!["migration".into()],
//!     importance: 0.7,
//!     ttl: "90d".into(),
//!     scope: None,
//! }).await?;
//!
//! let hits = core.recall(memoria_core::RecallInput {
//!     query: "migration".into(),
//!     limit: 5,
//!     scope: None,
//! }).await?;
//! # let _ = (id, hits);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod manifest;
pub mod model;
pub mod orchestrator;
pub mod recall;
pub mod store;

pub use error::{CoreError, Result};
pub use graph::GraphEngine;
pub use manifest::{Bridge, KeyNode, Manifest, Theme};
pub use model::{
    AssociateInput, FeedbackInput, FeedbackOutcome, MemoryEdge, MemoryItem, MemoryType, Policy,
    RecallInput, RememberInput, State,
};
pub use orchestrator::{BackendKind, Config, MemoryCore};
pub use recall::RecallHit;

/// Crate version, surfaced by the `status`/`describe` CLI output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient imports for embedders who only need the orchestrator surface.
pub mod prelude {
    pub use crate::{
        AssociateInput, BackendKind, Config, CoreError, FeedbackInput, FeedbackOutcome, Manifest,
        MemoryCore, MemoryEdge, MemoryItem, MemoryType, RecallHit, RecallInput, RememberInput,
        Result, State,
    };
}
