//! Graph-database-backed store: maps items to `Memory` nodes and tags to
//! `Tag` nodes, joined by `TAGGED` relationships, with `ASSOCIATED`
//! relationships carrying the edge's relation/weight/last-reinforced fields.
//!
//! Every save clears and rebuilds the graph in a single transaction — this
//! crate treats the graph database as a mirror of `State`, not as a
//! source of incremental truth, which keeps the mapping simple at the cost
//! of O(n) writes per save.

use std::collections::HashMap;

use async_trait::async_trait;
use neo4rs::{Graph, Query};

use crate::model::{MemoryEdge, MemoryItem, MemoryType, State};

use super::{Store, StoreError, StoreKind};

pub struct GraphDbStore {
    graph: Graph,
}

impl GraphDbStore {
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, StoreError> {
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(|e| StoreError::GraphDb(format!("failed to connect: {e}")))?;

        let store = Self { graph };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for stmt in [
            "CREATE CONSTRAINT memory_id IF NOT EXISTS FOR (m:Memory) REQUIRE m.id IS UNIQUE",
            "CREATE INDEX memory_type_idx IF NOT EXISTS FOR (m:Memory) ON (m.type)",
            "CREATE INDEX memory_created_idx IF NOT EXISTS FOR (m:Memory) ON (m.createdAt)",
            "CREATE CONSTRAINT tag_name IF NOT EXISTS FOR (t:Tag) REQUIRE t.name IS UNIQUE",
        ] {
            self.graph
                .run(Query::new(stmt.to_string()))
                .await
                .map_err(|e| StoreError::GraphDb(format!("index setup failed: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for GraphDbStore {
    async fn load(&self) -> Result<State, StoreError> {
        let mut state = State::default();

        let mut node_rows = self
            .graph
            .execute(Query::new(
                "MATCH (m:Memory) \
                 OPTIONAL MATCH (m)-[:TAGGED]->(t:Tag) \
                 RETURN m, collect(t.name) AS tags"
                    .to_string(),
            ))
            .await
            .map_err(|e| StoreError::GraphDb(format!("load query failed: {e}")))?;

        while let Some(row) = node_rows
            .next()
            .await
            .map_err(|e| StoreError::GraphDb(format!("failed reading memory row: {e}")))?
        {
            let node: neo4rs::Node = row
                .get("m")
                .map_err(|e| StoreError::GraphDb(format!("malformed memory node: {e}")))?;
            let tags: Vec<String> = row.get("tags").unwrap_or_default();

            let id: String = node.get("id").unwrap_or_default();
            let item_type = node
                .get::<String>("type")
                .ok()
                .and_then(|t| MemoryType::parse_name(&t))
                .unwrap_or(MemoryType::Fact);

            let item = MemoryItem {
                id: id.clone(),
                item_type,
                text: node.get("text").unwrap_or_default(),
                tags: tags.into_iter().collect(),
                importance: node.get::<f64>("importance").unwrap_or(0.5),
                energy: node.get::<f64>("energy").unwrap_or(0.5),
                ttl: node.get("ttl").unwrap_or_else(|_| "30d".to_string()),
                scope: node.get("scope").ok(),
                created_at: parse_timestamp(&node, "createdAt"),
                updated_at: parse_timestamp(&node, "updatedAt"),
                last_accessed_at: parse_timestamp(&node, "lastAccessedAt"),
                access_count: node.get::<i64>("accessCount").unwrap_or(0) as u64,
                success: node.get::<i64>("success").unwrap_or(0) as u64,
                fail: node.get::<i64>("fail").unwrap_or(0) as u64,
            };
            state.items.insert(id, item);
        }

        let mut edge_rows = self
            .graph
            .execute(Query::new(
                "MATCH (a:Memory)-[r:ASSOCIATED]->(b:Memory) \
                 RETURN a.id AS from, b.id AS to, r.relation AS relation, \
                        r.weight AS weight, r.lastReinforcedAt AS lastReinforcedAt"
                    .to_string(),
            ))
            .await
            .map_err(|e| StoreError::GraphDb(format!("edge query failed: {e}")))?;

        while let Some(row) = edge_rows
            .next()
            .await
            .map_err(|e| StoreError::GraphDb(format!("failed reading edge row: {e}")))?
        {
            let from: String = row.get("from").unwrap_or_default();
            let to: String = row.get("to").unwrap_or_default();
            let relation: String = row.get("relation").unwrap_or_default();
            let weight: f64 = row.get("weight").unwrap_or(0.0);
            let last_reinforced_at = row
                .get::<String>("lastReinforcedAt")
                .ok()
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(chrono::Utc::now);

            state.edges.push(MemoryEdge {
                from,
                to,
                relation,
                weight,
                last_reinforced_at,
            });
        }

        Ok(state)
    }

    async fn save(&self, state: &State) -> Result<(), StoreError> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| StoreError::GraphDb(format!("failed to start transaction: {e}")))?;

        txn.run(Query::new("MATCH (n) DETACH DELETE n".to_string()))
            .await
            .map_err(|e| StoreError::GraphDb(format!("clear failed: {e}")))?;

        let mut known_tags: HashMap<String, ()> = HashMap::new();
        for item in state.items.values() {
            for tag in &item.tags {
                known_tags.entry(tag.clone()).or_insert(());
            }
        }
        for tag in known_tags.keys() {
            txn.run(
                Query::new("MERGE (:Tag {name: $name})".to_string()).param("name", tag.as_str()),
            )
            .await
            .map_err(|e| StoreError::GraphDb(format!("tag merge failed: {e}")))?;
        }

        for item in state.items.values() {
            txn.run(
                Query::new(
                    "CREATE (m:Memory {id: $id, type: $type, text: $text, importance: $importance, \
                     energy: $energy, ttl: $ttl, scope: $scope, createdAt: $createdAt, \
                     updatedAt: $updatedAt, lastAccessedAt: $lastAccessedAt, \
                     accessCount: $accessCount, success: $success, fail: $fail})"
                        .to_string(),
                )
                .param("id", item.id.as_str())
                .param("type", item.item_type.as_str())
                .param("text", item.text.as_str())
                .param("importance", item.importance)
                .param("energy", item.energy)
                .param("ttl", item.ttl.as_str())
                .param("scope", item.scope.clone().unwrap_or_default())
                .param("createdAt", item.created_at.to_rfc3339())
                .param("updatedAt", item.updated_at.to_rfc3339())
                .param("lastAccessedAt", item.last_accessed_at.to_rfc3339())
                .param("accessCount", item.access_count as i64)
                .param("success", item.success as i64)
                .param("fail", item.fail as i64),
            )
            .await
            .map_err(|e| StoreError::GraphDb(format!("memory create failed: {e}")))?;

            for tag in &item.tags {
                txn.run(
                    Query::new(
                        "MATCH (m:Memory {id: $id}), (t:Tag {name: $name}) \
                         MERGE (m)-[:TAGGED]->(t)"
                            .to_string(),
                    )
                    .param("id", item.id.as_str())
                    .param("name", tag.as_str()),
                )
                .await
                .map_err(|e| StoreError::GraphDb(format!("tag link failed: {e}")))?;
            }
        }

        for edge in &state.edges {
            txn.run(
                Query::new(
                    "MATCH (a:Memory {id: $from}), (b:Memory {id: $to}) \
                     CREATE (a)-[:ASSOCIATED {relation: $relation, weight: $weight, \
                     lastReinforcedAt: $lastReinforcedAt}]->(b)"
                        .to_string(),
                )
                .param("from", edge.from.as_str())
                .param("to", edge.to.as_str())
                .param("relation", edge.relation.as_str())
                .param("weight", edge.weight)
                .param("lastReinforcedAt", edge.last_reinforced_at.to_rfc3339()),
            )
            .await
            .map_err(|e| StoreError::GraphDb(format!("edge create failed: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| StoreError::GraphDb(format!("commit failed: {e}")))?;

        tracing::debug!(items = state.items.len(), edges = state.edges.len(), "state saved to graph database");
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::GraphDb
    }
}

fn parse_timestamp(node: &neo4rs::Node, field: &str) -> chrono::DateTime<chrono::Utc> {
    node.get::<String>(field)
        .ok()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(chrono::Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn store_kind_is_graph_db() {
        assert_eq!(super::StoreKind::GraphDb.as_str(), "graph-db");
    }

    fn item(id: &str) -> MemoryItem {
        let now = chrono::Utc::now();
        MemoryItem {
            id: id.into(),
            item_type: MemoryType::Fact,
            text: format!("note about {id}"),
            tags: BTreeSet::new(),
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

    /// Needs a reachable Neo4j instance: set GRAPH_STORE_URI (and
    /// GRAPH_STORE_USER/GRAPH_STORE_PASSWORD if not using defaults) and run
    /// with `--ignored`.
    #[tokio::test]
    #[ignore]
    async fn connect_and_round_trip_against_live_database() {
        let uri = std::env::var("GRAPH_STORE_URI").expect("GRAPH_STORE_URI must be set for this test");
        let user = std::env::var("GRAPH_STORE_USER").unwrap_or_else(|_| "neo4j".to_string());
        let password = std::env::var("GRAPH_STORE_PASSWORD").unwrap_or_default();

        let store = GraphDbStore::connect(&uri, &user, &password).await.unwrap();

        let mut state = State::default();
        state.items.insert("a".into(), item("a"));
        state.items.insert("b".into(), item("b"));
        state.edges.push(MemoryEdge::new("a", "b", "relates-to", 0.6));

        store.save(&state).await.unwrap();
        let reloaded = store.load().await.unwrap();

        assert_eq!(reloaded.items.len(), 2);
        assert_eq!(reloaded.edges.len(), 1);
        assert_eq!(reloaded.edges[0].relation, "relates-to");
    }
}
