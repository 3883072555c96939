//! Round-trip equivalence between a saved and reloaded state, and
//! byte-identical manifest rendering across the reload when no external
//! summariser is configured.
//!
//! The graph-database variant needs a reachable Neo4j instance; its
//! `#[ignore]`d round-trip test lives next to the store implementation in
//! `memoria-core::store::graph_db`, not here.

use std::collections::BTreeSet;

use chrono::Utc;
use memoria_core::store::file::FileStore;
use memoria_core::store::Store;
use memoria_core::{GraphEngine, Manifest, MemoryEdge, MemoryItem, MemoryType, State};
use tempfile::TempDir;

fn random_state(item_count: usize, edge_count: usize) -> State {
    let mut state = State::default();
    let now = Utc::now();
    let mut ids = Vec::with_capacity(item_count);

    for i in 0..item_count {
        let id = format!("item-{i:04}");
        let item_type = match i % 5 {
            0 => MemoryType::Fact,
            1 => MemoryType::Insight,
            2 => MemoryType::Plan,
            3 => MemoryType::Event,
            _ => MemoryType::Pattern,
        };
        let tags: BTreeSet<String> = (0..(i % 3)).map(|t| format!("tag-{t}")).collect();
        state.items.insert(
            id.clone(),
            MemoryItem {
                id: id.clone(),
                item_type,
                text: format!("synthetic memory content number {i} with some detail"),
                tags,
                importance: ((i * 37) % 100) as f64 / 100.0,
                energy: ((i * 53) % 100) as f64 / 100.0,
                ttl: "30d".into(),
                scope: if i % 10 == 0 { Some("scoped".into()) } else { None },
                created_at: now - chrono::Duration::days((i % 40) as i64),
                updated_at: now - chrono::Duration::days((i % 20) as i64),
                last_accessed_at: now - chrono::Duration::hours((i % 72) as i64),
                access_count: (i % 7) as u64,
                success: (i % 4) as u64,
                fail: (i % 3) as u64,
            },
        );
        ids.push(id);
    }

    for e in 0..edge_count {
        let from = ids[e % item_count].clone();
        let to = ids[(e * 7 + 3) % item_count].clone();
        if from == to {
            continue;
        }
        state.edges.push(MemoryEdge::new(from, to, "relates-to", ((e % 10) as f64 + 1.0) / 10.0));
    }

    state
}

fn edge_multiset(state: &State) -> BTreeSet<(String, String, String, String)> {
    state
        .edges
        .iter()
        .map(|e| (e.from.clone(), e.to.clone(), e.relation.clone(), format!("{:.6}", e.weight)))
        .collect()
}

#[tokio::test]
async fn file_store_round_trip_is_logically_equivalent() {
    let original = random_state(200, 800);

    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path()).await.unwrap();
    store.save(&original).await.unwrap();
    let reloaded = store.load().await.unwrap();

    assert_eq!(original.items.len(), reloaded.items.len());
    for (id, item) in &original.items {
        let other = reloaded.items.get(id).expect("item missing after reload");
        assert_eq!(item.item_type, other.item_type);
        assert_eq!(item.text, other.text);
        assert_eq!(item.tags, other.tags);
        assert!((item.importance - other.importance).abs() < 1e-9);
        assert!((item.energy - other.energy).abs() < 1e-9);
        assert_eq!(item.scope, other.scope);
    }
    assert_eq!(edge_multiset(&original), edge_multiset(&reloaded));
    assert!(reloaded.check_invariants().is_ok());

    let graph_a = GraphEngine::build(&original);
    let graph_b = GraphEngine::build(&reloaded);
    let manifest_a: Manifest = memoria_core::manifest::generate(&original, &graph_a, None, std::time::Duration::from_millis(50))
        .await
        .unwrap();
    let manifest_b: Manifest = memoria_core::manifest::generate(&reloaded, &graph_b, None, std::time::Duration::from_millis(50))
        .await
        .unwrap();

    assert_eq!(manifest_a.topology.node_count, manifest_b.topology.node_count);
    assert_eq!(manifest_a.topology.edge_count, manifest_b.topology.edge_count);
    assert_eq!(manifest_a.themes.len(), manifest_b.themes.len());
    assert_eq!(manifest_a.render(), manifest_b.render());
}
