pub mod lineage;
pub(crate) mod text;
pub mod tidy;
pub(crate) mod types;
pub use types::*;

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::state::ViewState;
use crate::theme::Theme;
use crate::tree::{TreeNode, TreeNodeKind};

/// Positions the assembled tree and flattens it into the render-facing
/// [`Layout`]: tidy-tree placement, then a translation pass so every
/// coordinate is non-negative, then node/connector extraction.
pub fn compute_layout(
    root: &mut TreeNode,
    state: &ViewState,
    theme: &Theme,
    config: &LayoutConfig,
) -> Layout {
    tidy::layout_tree(root, &config.tree);

    // Left-leaning subtrees produce negative x; generation 0 produces
    // negative y. Shift everything into the positive quadrant.
    let (min_x, min_y, max_x, max_y) = tree_bounds(root, config);
    let dx = -min_x + config.tree.padding;
    let dy = -min_y + config.tree.padding;
    translate(root, dx, dy);

    let mut nodes: BTreeMap<String, NodeLayout> = BTreeMap::new();
    let mut connectors = Vec::new();
    flatten(root, state, theme, config, &mut nodes, &mut connectors);

    Layout {
        nodes,
        connectors,
        width: (max_x - min_x) + config.tree.padding * 2.0,
        height: (max_y - min_y) + config.tree.padding * 2.0,
    }
}

fn tree_bounds(root: &TreeNode, config: &LayoutConfig) -> (f32, f32, f32, f32) {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.x + node.width(&config.tree));
        max_y = max_y.max(node.y + node.height(&config.tree));
        stack.extend(node.children.iter());
    }
    if min_x == f32::MAX {
        (0.0, 0.0, 1.0, 1.0)
    } else {
        (min_x, min_y, max_x, max_y)
    }
}

fn translate(root: &mut TreeNode, dx: f32, dy: f32) {
    let mut stack: Vec<&mut TreeNode> = vec![root];
    while let Some(node) = stack.pop() {
        node.x += dx;
        node.y += dy;
        stack.extend(node.children.iter_mut());
    }
}

fn flatten(
    node: &TreeNode,
    state: &ViewState,
    theme: &Theme,
    config: &LayoutConfig,
    nodes: &mut BTreeMap<String, NodeLayout>,
    connectors: &mut Vec<ConnectorLayout>,
) {
    let layout = node_layout(node, state, theme, config);
    for child in &node.children {
        let child_width = child.width(&config.tree);
        let from = (layout.x + layout.width / 2.0, layout.y + layout.height);
        let to = (child.x + child_width / 2.0, child.y);
        let mid_y = (from.1 + to.1) / 2.0;
        connectors.push(ConnectorLayout {
            from: node.id.clone(),
            to: child.id.clone(),
            points: vec![from, (from.0, mid_y), (to.0, mid_y), to],
        });
        flatten(child, state, theme, config, nodes, connectors);
    }
    nodes.insert(layout.id.clone(), layout);
}

fn node_layout(
    node: &TreeNode,
    state: &ViewState,
    theme: &Theme,
    config: &LayoutConfig,
) -> NodeLayout {
    let width = node.width(&config.tree);
    let max_label_width = width - config.label_padding * 2.0;
    let (kind, label_text, sub_label_text, person_id) = match &node.kind {
        TreeNodeKind::Family(family) => {
            let spouse1 = display_name(family.spouse1_name.as_deref());
            let spouse2 = display_name(family.spouse2_name.as_deref());
            (
                NodeKind::Family,
                format!("{spouse1}\n{spouse2}"),
                family.label.clone(),
                family.spouse1_id.clone(),
            )
        }
        TreeNodeKind::Person(person) => (
            NodeKind::Person,
            display_name(Some(&person.record.full_name)),
            None,
            Some(person.record.id.clone()),
        ),
    };
    let label = text::measure_label(
        &label_text,
        theme.font_size,
        config.label_line_height,
        max_label_width,
    );
    let sub_label = sub_label_text.map(|tag| {
        text::measure_label(
            &tag,
            theme.font_size * 0.8,
            config.label_line_height,
            max_label_width,
        )
    });
    let highlighted = state.is_highlighted(&node.id)
        || person_id.as_deref().is_some_and(|id| {
            state.is_highlighted(id) || state.selected_person.as_deref() == Some(id)
        });
    NodeLayout {
        id: node.id.clone(),
        kind,
        x: node.x,
        y: node.y,
        width,
        height: node.height(&config.tree),
        generation: node.generation,
        label,
        sub_label,
        branch_color: node.branch_color.clone(),
        collapsed: state.is_collapsed(&node.id),
        highlighted,
    }
}

fn display_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => "Unknown".to_string(),
    }
}
