use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::lineage::{LineageChain, LineageEntry, LineageRow};
use crate::theme::Theme;

use super::text::measure_label;
use super::{ConnectorLayout, Layout, NodeKind, NodeLayout};

/// Lays out a resolved lineage chain as a vertical ladder: one centered box
/// per row, except the spousal pair row which renders side by side.
pub fn compute_lineage_layout(
    chain: &LineageChain,
    theme: &Theme,
    config: &LayoutConfig,
) -> Layout {
    let lineage = &config.lineage;
    let rows = chain.display_rows();

    let max_row_width = rows
        .iter()
        .map(|row| match row {
            LineageRow::Single(_) => lineage.box_width,
            LineageRow::Pair(entries) => {
                let count = entries.len().max(1) as f32;
                count * lineage.box_width + (count - 1.0) * lineage.pair_gap
            }
        })
        .fold(lineage.box_width, f32::max);

    let width = max_row_width + lineage.padding * 2.0;
    let center_x = width / 2.0;

    let mut nodes: BTreeMap<String, NodeLayout> = BTreeMap::new();
    let mut connectors = Vec::new();
    let mut previous_row: Vec<String> = Vec::new();
    let mut y = lineage.padding;

    for row in &rows {
        let entries: Vec<&LineageEntry> = match row {
            LineageRow::Single(entry) => vec![entry],
            LineageRow::Pair(entries) => entries.iter().collect(),
        };
        let count = entries.len() as f32;
        let row_width = count * lineage.box_width + (count - 1.0) * lineage.pair_gap;
        let mut x = center_x - row_width / 2.0;

        let mut current_row = Vec::new();
        for entry in entries {
            let node = entry_layout(entry, x, y, theme, config);
            for above in &previous_row {
                if let Some(parent) = nodes.get(above) {
                    connectors.push(ConnectorLayout {
                        from: above.clone(),
                        to: node.id.clone(),
                        points: vec![
                            (parent.x + parent.width / 2.0, parent.y + parent.height),
                            (node.x + node.width / 2.0, node.y),
                        ],
                    });
                }
            }
            current_row.push(node.id.clone());
            nodes.insert(node.id.clone(), node);
            x += lineage.box_width + lineage.pair_gap;
        }
        previous_row = current_row;
        y += lineage.box_height + lineage.row_gap;
    }

    let height = if rows.is_empty() {
        lineage.padding * 2.0
    } else {
        y - lineage.row_gap + lineage.padding
    };

    Layout {
        nodes,
        connectors,
        width: width.max(1.0),
        height: height.max(1.0),
    }
}

fn entry_layout(
    entry: &LineageEntry,
    x: f32,
    y: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> NodeLayout {
    let lineage = &config.lineage;
    let label = measure_label(
        &entry.full_name,
        theme.font_size,
        config.label_line_height,
        lineage.box_width - config.label_padding * 2.0,
    );
    let sub_label = measure_label(
        &format!("Generation {}", entry.generation),
        theme.font_size * 0.8,
        config.label_line_height,
        lineage.box_width,
    );
    NodeLayout {
        id: entry.id.clone(),
        kind: NodeKind::Person,
        x,
        y,
        width: lineage.box_width,
        height: lineage.box_height,
        generation: entry.generation,
        label,
        sub_label: Some(sub_label),
        branch_color: None,
        collapsed: false,
        highlighted: false,
    }
}
