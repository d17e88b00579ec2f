use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::layout::{Layout, NodeKind};

/// Serializable snapshot of a computed layout, for debugging and for
/// consumers that draw with something other than the bundled SVG renderer.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub connectors: Vec<ConnectorDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub generation: i64,
    pub label_lines: Vec<String>,
    pub branch_color: Option<String>,
    pub collapsed: bool,
    pub highlighted: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: match node.kind {
                    NodeKind::Family => "family".to_string(),
                    NodeKind::Person => "person".to_string(),
                },
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                generation: node.generation,
                label_lines: node.label.lines.clone(),
                branch_color: node.branch_color.clone(),
                collapsed: node.collapsed,
                highlighted: node.highlighted,
            })
            .collect();
        let connectors = layout
            .connectors
            .iter()
            .map(|connector| ConnectorDump {
                from: connector.from.clone(),
                to: connector.to.clone(),
                points: connector
                    .points
                    .iter()
                    .map(|(x, y)| [*x, *y])
                    .collect(),
            })
            .collect();
        Self {
            width: layout.width,
            height: layout.height,
            nodes,
            connectors,
        }
    }

    pub fn write_json(&self, output: Option<&Path>) -> anyhow::Result<()> {
        match output {
            Some(path) => {
                let file = File::create(path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, self)?;
                writer.flush()?;
            }
            None => {
                let stdout = std::io::stdout();
                serde_json::to_writer_pretty(stdout.lock(), self)?;
            }
        }
        Ok(())
    }
}
