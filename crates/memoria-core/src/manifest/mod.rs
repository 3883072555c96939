//! Manifest generator — community detection, centrality, temporal
//! stratification, key-node and bridge selection, and bounded rendering.

pub mod centrality;
pub mod community;
pub mod render;
pub mod summarizer;
pub mod temporal;
pub mod topology;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::GraphEngine;
use crate::model::State;
use summarizer::{Summarizer, ThemeContext};
use temporal::TemporalCounts;
use topology::TopologyMetrics;

/// Hard cap on the rendered manifest.
pub const MAX_RENDER_BYTES: usize = 8 * 1024;

const LOUVAIN_RESOLUTION: f64 = 1.0;
const PAGERANK_DAMPING: f64 = 0.85;
const TOP_PAGERANK_NODES: usize = 20;
const TOP_KEY_NODES: usize = 5;
const TOP_THEMES: usize = 5;
const TOP_BRIDGES: usize = 10;
const TOP_KEYWORDS_PER_COMMUNITY: usize = 5;
const MIN_COMMUNITY_SIZE_TO_SUMMARIZE: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest generation produced no renderable content")]
    Empty,
}

/// One detected theme (community), aggregated and optionally named by an
/// external summariser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub id: usize,
    pub summary: String,
    pub keywords: Vec<String>,
    pub top_item_previews: Vec<String>,
    pub importance: f64,
    pub volatility: f64,
    pub size: usize,
}

/// A node surfaced as particularly central or fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyNode {
    pub id: String,
    pub label: String,
    pub score: f64,
}

/// An edge whose endpoints lie in different communities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bridge {
    pub from: String,
    pub to: String,
    pub relation: String,
    pub weight: f64,
}

/// The full generated manifest, before and after rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub themes: Vec<Theme>,
    pub temporal: TemporalCounts,
    pub key_nodes: Vec<KeyNode>,
    pub topology: TopologyMetrics,
    pub bridges: Vec<Bridge>,
    pub generated_at: DateTime<Utc>,
    pub pagerank_fell_back: bool,
}

impl Manifest {
    pub fn render(&self) -> String {
        render::render(self)
    }
}

fn truncate_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect::<String>() + "..."
    }
}

/// Run the full ten-stage manifest pipeline: analysis graph, community
/// detection, centrality, per-community aggregation and summarisation,
/// topology metrics, temporal stratification, key-node selection, bridge
/// detection, and bounded rendering.
pub async fn generate(
    state: &State,
    graph: &GraphEngine,
    summarizer: Option<&dyn Summarizer>,
    summarizer_timeout: Duration,
) -> Result<Manifest, ManifestError> {
    let now = Utc::now();
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();

    // Stage 2: community detection.
    let partition = community::louvain(graph, LOUVAIN_RESOLUTION);

    // Stage 3: centrality.
    let pagerank = centrality::pagerank(graph, PAGERANK_DAMPING);

    // Stage 4 + 5: per-community aggregation and summarisation.
    let mut members_by_community: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &comm) in partition.community_of.iter().enumerate() {
        members_by_community.entry(comm).or_default().push(idx);
    }

    let week_ago = now - chrono::Duration::days(7);
    let mut themes = Vec::new();
    for (&comm_id, members) in &members_by_community {
        if members.len() < MIN_COMMUNITY_SIZE_TO_SUMMARIZE {
            continue;
        }

        let community_items: Vec<&crate::model::MemoryItem> = members
            .iter()
            .filter_map(|&idx| state.items.get(graph.id_at(idx)))
            .collect();

        let importance: f64 = members.iter().map(|&idx| pagerank.scores.get(idx).copied().unwrap_or(0.0)).sum();

        let volatility = if community_items.is_empty() {
            0.0
        } else {
            community_items.iter().filter(|i| i.updated_at >= week_ago).count() as f64 / community_items.len() as f64
        };

        let mut tag_counts: BTreeMap<String, usize> = BTreeMap::new();
        for item in &community_items {
            for tag in &item.tags {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        let mut keywords: Vec<(String, usize)> = tag_counts.into_iter().collect();
        keywords.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let top_tags: Vec<String> = keywords.into_iter().take(TOP_KEYWORDS_PER_COMMUNITY).map(|(t, _)| t).collect();

        let mut by_importance = community_items.clone();
        by_importance.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap().then_with(|| a.id.cmp(&b.id)));
        let top_previews: Vec<String> = by_importance.iter().take(3).map(|i| truncate_preview(&i.text, 100)).collect();

        let ctx = ThemeContext {
            item_types: community_items.iter().map(|i| i.item_type.as_str().to_string()).collect(),
            top_tags: top_tags.clone(),
            top_item_previews: top_previews.clone(),
        };
        let summary = if themes.len() < TOP_THEMES {
            summarizer::summarize_theme(summarizer, &ctx, summarizer_timeout).await
        } else {
            summarizer::keyword_summary(&ctx)
        };

        themes.push(Theme {
            id: comm_id,
            summary,
            keywords: top_tags,
            top_item_previews: top_previews,
            importance,
            volatility,
            size: members.len(),
        });
    }
    themes.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap().then_with(|| a.id.cmp(&b.id)));

    // Stage 6: topology metrics.
    let topology = TopologyMetrics {
        node_count,
        edge_count,
        density: topology::density(node_count, edge_count),
        clustering_coefficient: topology::clustering_coefficient(graph),
        modularity: partition.modularity,
        avg_degree: topology::avg_degree(graph),
        community_count: members_by_community.values().filter(|m| m.len() >= MIN_COMMUNITY_SIZE_TO_SUMMARIZE).count(),
        bridge_count: 0, // filled in after bridges are computed below
    };

    // Stage 7: temporal stratification.
    let temporal = temporal::stratify(state.items.values(), now);

    // Stage 8: key nodes.
    let mut ranked: Vec<usize> = (0..node_count).collect();
    ranked.sort_by(|&a, &b| pagerank.scores[b].partial_cmp(&pagerank.scores[a]).unwrap());
    let top_pr: Vec<usize> = ranked.into_iter().take(TOP_PAGERANK_NODES).collect();

    let mut key_candidates: Vec<KeyNode> = top_pr
        .iter()
        .filter_map(|&idx| {
            let id = graph.id_at(idx).to_string();
            let item = state.items.get(&id)?;
            let pr = pagerank.scores.get(idx).copied().unwrap_or(0.0);
            let score = 0.4 * pr + 0.3 * item.energy + 0.3 * item.importance;
            Some(KeyNode {
                id,
                label: truncate_preview(&item.text, 50),
                score,
            })
        })
        .collect();
    key_candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap().then_with(|| a.id.cmp(&b.id)));
    let key_nodes: Vec<KeyNode> = key_candidates.into_iter().take(TOP_KEY_NODES).collect();

    // Stage 9: bridges — edges whose endpoints land in different communities.
    let mut bridges: Vec<Bridge> = state
        .edges
        .iter()
        .filter_map(|edge| {
            let from_idx = graph.index_of(&edge.from)?;
            let to_idx = graph.index_of(&edge.to)?;
            if partition.community_of[from_idx] != partition.community_of[to_idx] {
                Some(Bridge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    relation: edge.relation.clone(),
                    weight: edge.weight,
                })
            } else {
                None
            }
        })
        .collect();
    bridges.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap());
    bridges.truncate(TOP_BRIDGES);

    let mut topology = topology;
    topology.bridge_count = bridges.len();

    Ok(Manifest {
        themes,
        temporal,
        key_nodes,
        topology,
        bridges,
        generated_at: now,
        pagerank_fell_back: pagerank.fell_back_to_uniform,
    })
}
