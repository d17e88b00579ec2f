use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Family,
    Person,
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub generation: i64,
    pub label: TextBlock,
    /// Wife-rank tag or generation tag, drawn small above the box.
    pub sub_label: Option<TextBlock>,
    pub branch_color: Option<String>,
    pub collapsed: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone)]
pub struct ConnectorLayout {
    pub from: String,
    pub to: String,
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub connectors: Vec<ConnectorLayout>,
    pub width: f32,
    pub height: f32,
}

/// Horizontal bounds of a laid-out subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub left: f32,
    pub right: f32,
}

impl Extent {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}
