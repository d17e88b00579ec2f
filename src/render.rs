use std::path::Path;

use anyhow::Result;

use crate::config::LayoutConfig;
use crate::layout::{Layout, NodeKind, NodeLayout, TextBlock};
use crate::theme::Theme;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for connector in &layout.connectors {
        let stroke = layout
            .nodes
            .get(&connector.to)
            .and_then(|node| node.branch_color.as_deref())
            .unwrap_or(theme.line_color.as_str());
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\"/>",
            points_to_path(&connector.points),
            stroke
        ));
    }

    for node in layout.nodes.values() {
        render_node(&mut svg, node, theme, config);
    }

    svg.push_str("</svg>");
    svg
}

fn render_node(svg: &mut String, node: &NodeLayout, theme: &Theme, config: &LayoutConfig) {
    // The branch color goes on the border so the box fill stays readable.
    let (fill, border) = match node.kind {
        NodeKind::Family => (theme.family_fill.as_str(), theme.family_border.as_str()),
        NodeKind::Person => (theme.person_fill.as_str(), theme.person_border.as_str()),
    };
    let (stroke, stroke_width) = if node.highlighted {
        (theme.highlight_color.as_str(), 2.6)
    } else {
        (node.branch_color.as_deref().unwrap_or(border), 1.4)
    };

    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        node.x, node.y, node.width, node.height, fill, stroke, stroke_width
    ));

    if node.kind == NodeKind::Family && node.label.lines.len() > 1 {
        // divider between the two spouse name halves
        let mid_y = node.y + node.height / 2.0;
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{mid_y:.2}\" x2=\"{:.2}\" y2=\"{mid_y:.2}\" stroke=\"{}\" stroke-width=\"0.8\" stroke-dasharray=\"3 2\"/>",
            node.x + 6.0,
            node.x + node.width - 6.0,
            theme.muted_text_color
        ));
    }

    let center_x = node.x + node.width / 2.0;
    let center_y = node.y + node.height / 2.0;
    svg.push_str(&text_block_svg(
        center_x,
        center_y,
        &node.label,
        theme.font_size,
        &theme.text_color,
        theme,
        config,
    ));

    if let Some(sub_label) = &node.sub_label {
        svg.push_str(&text_block_svg(
            center_x,
            node.y - sub_label.height / 2.0 - 2.0,
            sub_label,
            theme.font_size * 0.8,
            &theme.muted_text_color,
            theme,
            config,
        ));
    }

    if node.collapsed {
        let badge_y = node.y + node.height;
        svg.push_str(&format!(
            "<circle cx=\"{center_x:.2}\" cy=\"{badge_y:.2}\" r=\"7\" fill=\"{}\"/>",
            theme.collapse_badge_color
        ));
        svg.push_str(&format!(
            "<text x=\"{center_x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"11\" fill=\"#FFFFFF\">+</text>",
            badge_y + 3.5,
            theme.font_family
        ));
    }
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn text_block_svg(
    x: f32,
    y: f32,
    label: &TextBlock,
    font_size: f32,
    fill: &str,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let line_step = font_size * config.label_line_height;
    let total_height = label.lines.len() as f32 * line_step;
    let start_y = y - total_height / 2.0 + font_size * 0.85;
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{font_size}\" fill=\"{fill}\">",
        theme.font_family,
    ));
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_step };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &crate::config::RenderConfig,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
