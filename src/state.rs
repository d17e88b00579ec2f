use std::collections::HashSet;

/// View state that survives graph rebuilds: collapsed family ids,
/// highlighted node ids and the current selection. The caller owns one of
/// these and threads it through assembly and layout, so tests can work on
/// isolated instances instead of process-wide globals.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub collapsed_families: HashSet<String>,
    pub highlighted_nodes: HashSet<String>,
    pub selected_person: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles a family in or out of the collapsed set; returns whether the
    /// family is collapsed afterwards.
    pub fn toggle_collapsed(&mut self, family_id: &str) -> bool {
        if self.collapsed_families.remove(family_id) {
            false
        } else {
            self.collapsed_families.insert(family_id.to_string());
            true
        }
    }

    pub fn is_collapsed(&self, family_id: &str) -> bool {
        self.collapsed_families.contains(family_id)
    }

    pub fn highlight(&mut self, node_id: &str) {
        self.highlighted_nodes.insert(node_id.to_string());
    }

    pub fn clear_highlights(&mut self) {
        self.highlighted_nodes.clear();
    }

    pub fn is_highlighted(&self, node_id: &str) -> bool {
        self.highlighted_nodes.contains(node_id)
    }

    pub fn select(&mut self, person_id: Option<&str>) {
        self.selected_person = person_id.map(|id| id.to_string());
    }
}
