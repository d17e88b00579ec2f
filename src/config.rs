use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

const BRANCH_COLORS: [&str; 10] = [
    "#4C6EF5", "#12B886", "#FA5252", "#FAB005", "#7950F2", "#15AABF", "#E64980", "#82C91E",
    "#FD7E14", "#228BE6",
];

/// Geometry of the descendant tree. Node widths differ by node kind: a
/// couple box is wider than a single-person box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub family_node_width: f32,
    pub person_node_width: f32,
    pub node_height: f32,
    pub row_height: f32,
    pub sibling_gap: f32,
    /// How far above the generation-1 baseline a generation-0 row sits.
    pub generation_zero_offset: f32,
    pub padding: f32,
    pub max_generation: i64,
    /// Founder the root-selection heuristic favors, when set.
    pub root_person_id: Option<String>,
    pub branch_colors: Vec<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            family_node_width: 176.0,
            person_node_width: 96.0,
            node_height: 64.0,
            row_height: 140.0,
            sibling_gap: 28.0,
            generation_zero_offset: 120.0,
            padding: 32.0,
            max_generation: 12,
            root_person_id: None,
            branch_colors: BRANCH_COLORS.iter().map(|value| value.to_string()).collect(),
        }
    }
}

/// One of the two fixed individuals the lineage chain always terminates at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    pub id: String,
    pub name: String,
    pub generation: i64,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageConfig {
    pub box_width: f32,
    pub box_height: f32,
    pub row_gap: f32,
    pub pair_gap: f32,
    pub padding: f32,
    /// Upper bound on the fallback father-chain walk.
    pub max_walk: usize,
    pub root_anchor: AnchorRecord,
    pub first_anchor: AnchorRecord,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            box_width: 200.0,
            box_height: 64.0,
            row_gap: 48.0,
            pair_gap: 32.0,
            padding: 32.0,
            max_walk: 64,
            root_anchor: AnchorRecord {
                id: "ancestor-0".to_string(),
                name: "Founding Ancestor".to_string(),
                generation: 0,
                father_name: None,
                mother_name: None,
            },
            first_anchor: AnchorRecord {
                id: "ancestor-1".to_string(),
                name: "First Ancestor".to_string(),
                generation: 1,
                father_name: Some("Founding Ancestor".to_string()),
                mother_name: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub tree: TreeConfig,
    pub lineage: LineageConfig,
    pub label_line_height: f32,
    pub label_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tree: TreeConfig::default(),
            lineage: LineageConfig::default(),
            label_line_height: 1.25,
            label_padding: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::default_light();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    tree: Option<TreeConfigFile>,
    lineage: Option<LineageConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    family_fill: Option<String>,
    family_border: Option<String>,
    person_fill: Option<String>,
    person_border: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    line_color: Option<String>,
    highlight_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeConfigFile {
    family_node_width: Option<f32>,
    person_node_width: Option<f32>,
    node_height: Option<f32>,
    row_height: Option<f32>,
    sibling_gap: Option<f32>,
    generation_zero_offset: Option<f32>,
    padding: Option<f32>,
    max_generation: Option<i64>,
    root_person_id: Option<String>,
    branch_colors: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineageConfigFile {
    box_width: Option<f32>,
    box_height: Option<f32>,
    row_gap: Option<f32>,
    pair_gap: Option<f32>,
    root_anchor: Option<AnchorRecord>,
    first_anchor: Option<AnchorRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
}

/// Loads defaults, then overlays an optional JSON5 config file field by
/// field, so partial files stay valid.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "default" || theme_name == "light" {
            config.theme = Theme::default_light();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.family_fill {
            config.theme.family_fill = v;
        }
        if let Some(v) = vars.family_border {
            config.theme.family_border = v;
        }
        if let Some(v) = vars.person_fill {
            config.theme.person_fill = v;
        }
        if let Some(v) = vars.person_border {
            config.theme.person_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.highlight_color {
            config.theme.highlight_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v.clone();
            config.render.background = v;
        }
    }

    if let Some(tree) = parsed.tree {
        if let Some(v) = tree.family_node_width {
            config.layout.tree.family_node_width = v;
        }
        if let Some(v) = tree.person_node_width {
            config.layout.tree.person_node_width = v;
        }
        if let Some(v) = tree.node_height {
            config.layout.tree.node_height = v;
        }
        if let Some(v) = tree.row_height {
            config.layout.tree.row_height = v;
        }
        if let Some(v) = tree.sibling_gap {
            config.layout.tree.sibling_gap = v;
        }
        if let Some(v) = tree.generation_zero_offset {
            config.layout.tree.generation_zero_offset = v;
        }
        if let Some(v) = tree.padding {
            config.layout.tree.padding = v;
        }
        if let Some(v) = tree.max_generation {
            config.layout.tree.max_generation = v;
        }
        if let Some(v) = tree.root_person_id {
            config.layout.tree.root_person_id = Some(v);
        }
        if let Some(v) = tree.branch_colors {
            if !v.is_empty() {
                config.layout.tree.branch_colors = v;
            }
        }
    }

    if let Some(lineage) = parsed.lineage {
        if let Some(v) = lineage.box_width {
            config.layout.lineage.box_width = v;
        }
        if let Some(v) = lineage.box_height {
            config.layout.lineage.box_height = v;
        }
        if let Some(v) = lineage.row_gap {
            config.layout.lineage.row_gap = v;
        }
        if let Some(v) = lineage.pair_gap {
            config.layout.lineage.pair_gap = v;
        }
        if let Some(v) = lineage.root_anchor {
            config.layout.lineage.root_anchor = v;
        }
        if let Some(v) = lineage.first_anchor {
            config.layout.lineage.first_anchor = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }

    Ok(config)
}
