#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod graph;
pub mod layout;
pub mod layout_dump;
pub mod lineage;
pub mod model;
pub mod render;
pub mod state;
pub mod theme;
pub mod tree;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, TreeConfig, load_config};
pub use graph::{RenderGraph, build_render_graph};
pub use layout::{Layout, compute_layout};
pub use lineage::{LineageResolution, resolve as resolve_lineage};
pub use model::{FamilyNode, PersonRecord, family_id};
pub use render::render_svg;
pub use state::ViewState;
pub use theme::Theme;
pub use tree::{TreeError, TreeNode, assemble, assign_branch_colors};
