//! Bounded rendering of a generated manifest into the compact description
//! text that gets embedded into the memory tool's own description.

use super::{Manifest, MAX_RENDER_BYTES};

/// Render `manifest` into the final description string, truncating whole
/// sections (never mid-line) once the byte budget is exhausted.
pub fn render(manifest: &Manifest) -> String {
    let mut sections = Vec::new();

    sections.push(format!(
        "Memory graph: {} items, {} edges, density {:.3}",
        manifest.topology.node_count, manifest.topology.edge_count, manifest.topology.density
    ));

    if !manifest.themes.is_empty() {
        let mut theme_lines = vec!["Themes:".to_string()];
        for theme in manifest.themes.iter().take(5) {
            let keywords = if theme.keywords.is_empty() {
                String::new()
            } else {
                format!(" [{}]", theme.keywords.join(", "))
            };
            let preview = theme.top_item_previews.first().cloned().unwrap_or_default();
            theme_lines.push(format!(
                "  - {} ({} items, importance {:.2}){keywords}{}",
                theme.summary,
                theme.size,
                theme.importance,
                if preview.is_empty() { String::new() } else { format!(" — e.g. \"{preview}\"") }
            ));
        }
        sections.push(theme_lines.join("\n"));
    }

    sections.push(format!(
        "Temporal: {} emerging, {} active, {} stable, {} decaying",
        manifest.temporal.emerging, manifest.temporal.active, manifest.temporal.stable, manifest.temporal.decaying
    ));

    if !manifest.key_nodes.is_empty() {
        let mut lines = vec!["Key nodes:".to_string()];
        for node in manifest.key_nodes.iter().take(5) {
            lines.push(format!("  - {} (score {:.2})", truncate_label(&node.label, 50), node.score));
        }
        sections.push(lines.join("\n"));
    }

    sections.push(format!(
        "Topology: density {:.3}, modularity {:.3}, avg degree {:.2}, {} communities, {} bridges",
        manifest.topology.density,
        manifest.topology.modularity,
        manifest.topology.avg_degree,
        manifest.topology.community_count,
        manifest.topology.bridge_count,
    ));

    truncate_to_budget(&sections, MAX_RENDER_BYTES)
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let truncated: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{truncated}\u{2026}")
    }
}

/// Join sections with blank lines, dropping trailing sections once the
/// byte budget would be exceeded. Never cuts a section in half.
fn truncate_to_budget(sections: &[String], budget: usize) -> String {
    let mut out = String::new();
    for section in sections {
        let candidate_len = out.len() + if out.is_empty() { 0 } else { 2 } + section.len();
        if candidate_len > budget {
            break;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(section);
    }
    out
}
