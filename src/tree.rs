use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::config::TreeConfig;
use crate::graph::RenderGraph;
use crate::model::{FamilyNode, PersonNode, single_person_family_id};
use crate::state::ViewState;

static SYNTHETIC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)unknown").unwrap());

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("no family nodes to build a tree from")]
    NoFamilies,
}

/// Layout-stage node: either a couple unit or a single-person leaf
/// placeholder, positioned by the tidy-tree pass.
#[derive(Debug, Clone)]
pub enum TreeNodeKind {
    Family(FamilyNode),
    Person(PersonNode),
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: String,
    pub kind: TreeNodeKind,
    pub x: f32,
    pub y: f32,
    pub generation: i64,
    pub children: Vec<TreeNode>,
    /// Id-based back-reference for upward traversal; never followed during
    /// downward recursion.
    pub parent_id: Option<String>,
    pub branch_key: Option<String>,
    pub branch_color: Option<String>,
}

impl TreeNode {
    pub fn is_family(&self) -> bool {
        matches!(self.kind, TreeNodeKind::Family(_))
    }

    pub fn width(&self, config: &TreeConfig) -> f32 {
        match self.kind {
            TreeNodeKind::Family(_) => config.family_node_width,
            TreeNodeKind::Person(_) => config.person_node_width,
        }
    }

    pub fn height(&self, config: &TreeConfig) -> f32 {
        config.node_height
    }

    /// Total node count of this subtree, including self.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Ids of every node in the subtree, for isomorphism checks.
    pub fn collect_ids(&self, out: &mut Vec<String>) {
        out.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

/// Builds the render tree: picks a root family, recursively attaches
/// descendant families (memoized by id, which also breaks cycles in
/// malformed input), and prepends a parent generation above the root when
/// the data allows it. Fails only when there are no families at all.
pub fn assemble(
    graph: &RenderGraph,
    state: &ViewState,
    config: &TreeConfig,
) -> Result<TreeNode, TreeError> {
    let root_family = select_root(graph, config).ok_or(TreeError::NoFamilies)?;
    let root_id = root_family.id.clone();

    let mut assembler = Assembler {
        graph,
        state,
        config,
        visited: HashSet::new(),
    };
    let root = assembler
        .build_family(&root_id, None, true)
        .unwrap_or_else(|| assembler.family_leaf(root_family, None));
    Ok(assembler.extend_root(root))
}

/// Assigns one stable palette color per top-level descendant branch and
/// propagates it down the subtree. The root keeps the neutral theme fill.
pub fn assign_branch_colors(root: &mut TreeNode, palette: &[String]) {
    if palette.is_empty() {
        return;
    }
    for (index, child) in root.children.iter_mut().enumerate() {
        let color = palette[index % palette.len()].clone();
        let key = child.id.clone();
        paint_branch(child, &key, &color);
    }
}

fn paint_branch(node: &mut TreeNode, key: &str, color: &str) {
    node.branch_key = Some(key.to_string());
    node.branch_color = Some(color.to_string());
    for child in &mut node.children {
        paint_branch(child, key, color);
    }
}

fn valid_name(name: Option<&str>) -> bool {
    name.is_some_and(|name| {
        let trimmed = name.trim();
        !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("unknown")
    })
}

fn is_synthetic_id(id: Option<&str>) -> bool {
    match id {
        Some(id) => SYNTHETIC_ID.is_match(id),
        None => true,
    }
}

/// Root-candidate score: prefers families whose spouse names are usable
/// display values over placeholder-heavy ones.
fn score_family(family: &FamilyNode) -> i32 {
    let mut score = 0;
    if valid_name(family.spouse1_name.as_deref()) {
        score += 10;
    }
    if valid_name(family.spouse2_name.as_deref()) {
        score += 20;
    }
    if family.label.is_some() {
        score += 5;
    }
    if is_synthetic_id(family.spouse2_id.as_deref()) {
        score -= 3;
    }
    score
}

fn best_scored<'a>(candidates: impl Iterator<Item = &'a FamilyNode>) -> Option<&'a FamilyNode> {
    let mut best: Option<(&FamilyNode, i32)> = None;
    for family in candidates {
        let score = score_family(family);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((family, score)),
        }
    }
    best.map(|(family, _)| family)
}

/// Ordered fallback chain: the configured founder's best family, then
/// generation-1 families with both names valid, then any generation-1
/// family, then the first family in insertion order.
fn select_root<'a>(graph: &'a RenderGraph, config: &TreeConfig) -> Option<&'a FamilyNode> {
    if graph.family_nodes.is_empty() {
        return None;
    }

    if let Some(founder) = config.root_person_id.as_deref() {
        let candidates = graph
            .spousal_families(founder)
            .into_iter()
            .filter(|family| valid_name(family.other_spouse_name(founder)));
        if let Some(found) = best_scored(candidates) {
            debug!(root = found.id.as_str(), "root selected via founder");
            return Some(found);
        }
    }

    let both_named = graph.family_nodes.iter().filter(|family| {
        family.generation == 1
            && valid_name(family.spouse1_name.as_deref())
            && valid_name(family.spouse2_name.as_deref())
    });
    if let Some(found) = best_scored(both_named) {
        return Some(found);
    }

    let generation_one = graph
        .family_nodes
        .iter()
        .filter(|family| family.generation == 1);
    if let Some(found) = best_scored(generation_one) {
        return Some(found);
    }

    graph.family_nodes.first()
}

struct Assembler<'a> {
    graph: &'a RenderGraph,
    state: &'a ViewState,
    config: &'a TreeConfig,
    visited: HashSet<String>,
}

impl<'a> Assembler<'a> {
    /// Returns `None` for collapsed or depth-pruned families and for
    /// families already attached elsewhere in this pass. The root ignores
    /// its own collapsed flag (it still renders, childless).
    fn build_family(
        &mut self,
        family_id: &str,
        parent_id: Option<&str>,
        is_root: bool,
    ) -> Option<TreeNode> {
        let collapsed = self.state.is_collapsed(family_id);
        if collapsed && !is_root {
            return None;
        }
        let family = self.graph.family(family_id)?;
        if family.generation > self.config.max_generation {
            return None;
        }
        if !self.visited.insert(family_id.to_string()) {
            return None;
        }

        let mut node = self.family_leaf(family, parent_id);
        if collapsed {
            return Some(node);
        }
        for child_id in &family.children {
            match self.choose_child_family(child_id) {
                Some(child_family_id) => {
                    if let Some(child_node) =
                        self.build_family(&child_family_id, Some(family_id), false)
                    {
                        node.children.push(child_node);
                    }
                }
                None => {
                    if let Some(leaf) = self.person_leaf(child_id, family_id) {
                        node.children.push(leaf);
                    }
                }
            }
        }
        Some(node)
    }

    fn family_leaf(&self, family: &FamilyNode, parent_id: Option<&str>) -> TreeNode {
        TreeNode {
            id: family.id.clone(),
            generation: family.generation,
            kind: TreeNodeKind::Family(family.clone()),
            x: 0.0,
            y: 0.0,
            children: Vec::new(),
            parent_id: parent_id.map(|id| id.to_string()),
            branch_key: None,
            branch_color: None,
        }
    }

    /// The primary spousal family for a child at this tree position: the
    /// lowest-generation candidate within the depth limit; ties prefer a
    /// family that itself has children.
    fn choose_child_family(&self, child_id: &str) -> Option<String> {
        let mut chosen: Option<&FamilyNode> = None;
        for family in self.graph.spousal_families(child_id) {
            if family.generation > self.config.max_generation {
                continue;
            }
            chosen = Some(match chosen {
                None => family,
                Some(current) => {
                    if family.generation < current.generation
                        || (family.generation == current.generation
                            && current.children.is_empty()
                            && !family.children.is_empty())
                    {
                        family
                    } else {
                        current
                    }
                }
            });
        }
        chosen.map(|family| family.id.clone())
    }

    /// Single-person placeholder so every child renders family-shaped even
    /// without a spousal family. Missing person records are skipped.
    fn person_leaf(&self, child_id: &str, parent_id: &str) -> Option<TreeNode> {
        let person = self.graph.person(child_id)?;
        if person.record.generation > self.config.max_generation {
            return None;
        }
        Some(TreeNode {
            id: single_person_family_id(child_id),
            generation: person.record.generation,
            kind: TreeNodeKind::Person(person.clone()),
            x: 0.0,
            y: 0.0,
            children: Vec::new(),
            parent_id: Some(parent_id.to_string()),
            branch_key: None,
            branch_color: None,
        })
    }

    /// When the root family's elder spouse has a recorded parent, re-roots
    /// the tree on that parent-generation family with the original root as
    /// its sole child.
    fn extend_root(&mut self, mut root: TreeNode) -> TreeNode {
        let TreeNodeKind::Family(family) = &root.kind else {
            return root;
        };
        let Some(elder) = family
            .spouse1_id
            .as_deref()
            .or(family.spouse2_id.as_deref())
        else {
            return root;
        };
        let Some(person) = self.graph.person(elder) else {
            return root;
        };
        if person.record.father_id.is_none() && person.record.mother_id.is_none() {
            return root;
        }
        let Some(parent_family_id) = self.graph.children_to_family.get(elder) else {
            return root;
        };
        if *parent_family_id == root.id || self.visited.contains(parent_family_id) {
            return root;
        }
        let Some(parent_family) = self.graph.family(parent_family_id) else {
            return root;
        };
        self.visited.insert(parent_family_id.clone());
        let mut new_root = self.family_leaf(parent_family, None);
        root.parent_id = Some(new_root.id.clone());
        new_root.children.push(root);
        new_root
    }
}
