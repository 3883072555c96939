//! End-to-end scenarios exercising the orchestrator through its public API,
//! mirroring the seed scenarios a fresh memory is expected to satisfy.

use std::sync::Arc;

use memoria_core::model::FeedbackOutcome;
use memoria_core::store::file::FileStore;
use memoria_core::store::Store;
use memoria_core::{AssociateInput, Config, FeedbackInput, MemoryCore, MemoryType, RecallInput, RememberInput};
use tempfile::TempDir;

async fn fresh_core() -> (MemoryCore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::new(dir.path()).await.unwrap());
    let config = Config {
        state_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    (MemoryCore::new(store as Arc<dyn Store>, config).await.unwrap(), dir)
}

#[tokio::test]
async fn empty_state_then_first_remember() {
    let (core, _dir) = fresh_core().await;

    let manifest = core.status().await.unwrap();
    assert_eq!(manifest.topology.node_count, 0);
    assert_eq!(manifest.topology.edge_count, 0);

    let hits = core.recall(RecallInput { query: "anything".into(), limit: 10, scope: None }).await.unwrap();
    assert!(hits.is_empty());

    let id = core
        .remember(RememberInput {
            text: "first insight".into(),
            item_type: MemoryType::Insight,
            tags: vec!["t".into()],
            importance: 0.7,
            ttl: "30d".into(),
            scope: None,
        })
        .await
        .unwrap();
    assert!(!id.is_empty());
    assert_eq!(core.item_count().await, 1);
}

#[tokio::test]
async fn feedback_lifecycle_scenario() {
    let (core, _dir) = fresh_core().await;
    let id = core
        .remember(RememberInput {
            text: "ran the benchmark and confirmed 2x speedup".into(),
            item_type: MemoryType::Fact,
            tags: vec![],
            importance: 0.6,
            ttl: "30d".into(),
            scope: None,
        })
        .await
        .unwrap();

    for _ in 0..5 {
        core.feedback(FeedbackInput { id: id.clone(), outcome: FeedbackOutcome::Success }).await.unwrap();
    }
    core.feedback(FeedbackInput { id: id.clone(), outcome: FeedbackOutcome::Fail }).await.unwrap();

    // There is no direct item accessor on the public API beyond recall/status,
    // so exercise the invariant through a recall hit and the manifest instead
    // of reaching into internal state.
    let hits = core.recall(RecallInput { query: "benchmark".into(), limit: 1, scope: None }).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, id);
}

#[tokio::test]
async fn decay_then_consolidate_removes_stale_items() {
    let (core, _dir) = fresh_core().await;
    for i in 0..10 {
        core.remember(RememberInput {
            text: format!("stale note {i}"),
            item_type: MemoryType::Fact,
            tags: vec![],
            importance: 0.05,
            ttl: "30d".into(),
            scope: None,
        })
        .await
        .unwrap();
    }
    assert_eq!(core.item_count().await, 10);

    // decay() alone won't drop anything fresh; consolidate() prunes by the
    // policy's energy/access floor, which these just-created low-importance
    // items already sit at or below.
    core.decay(Some(7.0)).await.unwrap();
    let pruned = core.consolidate().await.unwrap();
    assert_eq!(pruned, 10);
    assert_eq!(core.item_count().await, 0);
}

#[tokio::test]
async fn manifest_reports_two_themes_with_bridge() {
    let (core, _dir) = fresh_core().await;
    let mut alpha_ids = Vec::new();
    for i in 0..4 {
        let id = core
            .remember(RememberInput {
                text: format!("alpha cluster note {i}"),
                item_type: MemoryType::Fact,
                tags: vec!["alpha".into()],
                importance: 0.5,
                ttl: "30d".into(),
                scope: None,
            })
            .await
            .unwrap();
        alpha_ids.push(id);
    }
    let mut beta_ids = Vec::new();
    for i in 0..4 {
        let id = core
            .remember(RememberInput {
                text: format!("beta cluster note {i}"),
                item_type: MemoryType::Fact,
                tags: vec!["beta".into()],
                importance: 0.5,
                ttl: "30d".into(),
                scope: None,
            })
            .await
            .unwrap();
        beta_ids.push(id);
    }

    for i in 0..4 {
        for j in (i + 1)..4 {
            core.associate(AssociateInput {
                from: alpha_ids[i].clone(),
                to: alpha_ids[j].clone(),
                relation: "relates-to".into(),
                weight: 1.0,
            })
            .await
            .unwrap();
            core.associate(AssociateInput {
                from: beta_ids[i].clone(),
                to: beta_ids[j].clone(),
                relation: "relates-to".into(),
                weight: 1.0,
            })
            .await
            .unwrap();
        }
    }
    core.associate(AssociateInput {
        from: alpha_ids[0].clone(),
        to: beta_ids[0].clone(),
        relation: "bridges-to".into(),
        weight: 0.3,
    })
    .await
    .unwrap();

    let manifest = core.refresh().await.unwrap();
    assert_eq!(manifest.themes.len(), 2);
    assert!(manifest.topology.bridge_count >= 1);
    assert!(manifest.topology.modularity > 0.3);
    assert!(manifest.render().len() <= 8 * 1024);
}
