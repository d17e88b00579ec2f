use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AnchorRecord, LineageConfig};
use crate::graph::RenderGraph;
use crate::model::PersonRecord;

/// One rung of the paternal ancestor chain, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct LineageEntry {
    pub id: String,
    pub full_name: String,
    pub generation: i64,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    /// True for anchor rows invented because the data had none.
    pub synthesized: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineageChain {
    pub entries: Vec<LineageEntry>,
    /// Generations missing between the lowest and highest present ones.
    /// A data-quality signal, never a blocking error.
    pub missing_generations: Vec<i64>,
    /// Generation rendered as one side-by-side spousal row.
    pub pair_generation: i64,
}

/// Display grouping: the generation immediately below the root anchor
/// renders as a spousal pair, everything else one entry per row.
#[derive(Debug, Clone)]
pub enum LineageRow {
    Single(LineageEntry),
    Pair(Vec<LineageEntry>),
}

#[derive(Debug, Clone)]
pub enum LineageResolution {
    Chain(LineageChain),
    /// The requested person id was not in the data; echoed for diagnostics.
    NotFound { id: String },
    NoData,
}

impl LineageChain {
    pub fn display_rows(&self) -> Vec<LineageRow> {
        let mut rows = Vec::new();
        let mut pair: Vec<LineageEntry> = Vec::new();
        for entry in &self.entries {
            if entry.generation == self.pair_generation {
                pair.push(entry.clone());
            } else {
                if !pair.is_empty() {
                    rows.push(LineageRow::Pair(std::mem::take(&mut pair)));
                }
                rows.push(LineageRow::Single(entry.clone()));
            }
        }
        if !pair.is_empty() {
            // target sits at the pair generation itself
            rows.push(LineageRow::Pair(pair));
        }
        rows
    }
}

/// Resolves the ordered ancestor chain from the fixed root ancestor down to
/// `target_id`. `ancestors` is a pre-walked chain from the backend; when it
/// is empty the father chain is walked locally instead.
pub fn resolve(
    target_id: &str,
    graph: &RenderGraph,
    ancestors: &[PersonRecord],
    config: &LineageConfig,
) -> LineageResolution {
    let trimmed_target = target_id.trim();
    let Some(target) = graph.person(trimmed_target) else {
        return LineageResolution::NotFound {
            id: trimmed_target.to_string(),
        };
    };

    let mut pool: Vec<PersonRecord> = ancestors.to_vec();
    if pool.is_empty() {
        pool = walk_paternal(graph, &target.record, config.max_walk);
    }
    pool.push(target.record.clone());

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut entries: Vec<LineageEntry> = Vec::new();
    for record in pool {
        let id = record.id.trim().to_string();
        if id.is_empty() {
            warn!(
                name = record.full_name.as_str(),
                "lineage entry without usable id dropped"
            );
            continue;
        }
        if seen.insert(id.clone()) {
            entries.push(to_entry(id, &record, graph));
        }
    }

    if entries.is_empty() {
        return LineageResolution::NoData;
    }

    normalize_anchors(&mut entries, config);
    entries.sort_by(|a, b| {
        a.generation
            .cmp(&b.generation)
            .then_with(|| a.id.cmp(&b.id))
    });

    let missing_generations = detect_gaps(&entries);
    LineageResolution::Chain(LineageChain {
        entries,
        missing_generations,
        pair_generation: config.root_anchor.generation + 1,
    })
}

/// Local fallback: follow father ids upward, bounded and cycle-guarded.
fn walk_paternal(graph: &RenderGraph, target: &PersonRecord, max_walk: usize) -> Vec<PersonRecord> {
    let mut chain = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    seen.insert(target.id.clone());
    let mut current = target.father_id.clone();
    while let Some(id) = current {
        if chain.len() >= max_walk || !seen.insert(id.clone()) {
            debug!(person = id.as_str(), "paternal walk stopped");
            break;
        }
        let Some(person) = graph.person(&id) else {
            break;
        };
        chain.push(person.record.clone());
        current = person.record.father_id.clone();
    }
    chain
}

fn to_entry(id: String, record: &PersonRecord, graph: &RenderGraph) -> LineageEntry {
    let parent_name = |parent_id: &Option<String>| {
        parent_id
            .as_deref()
            .and_then(|pid| graph.person(pid))
            .map(|person| person.record.full_name.clone())
            .filter(|name| !name.trim().is_empty())
    };
    LineageEntry {
        father_name: parent_name(&record.father_id),
        mother_name: parent_name(&record.mother_id),
        id,
        full_name: record.full_name.clone(),
        generation: record.generation,
        synthesized: false,
    }
}

/// The chain must always terminate at the same two anchor records. Missing
/// anchor generations are synthesized; present ones get their parent-name
/// fields forced to the canonical values.
fn normalize_anchors(entries: &mut Vec<LineageEntry>, config: &LineageConfig) {
    for anchor in [&config.root_anchor, &config.first_anchor] {
        let mut present = false;
        for entry in entries.iter_mut() {
            if entry.generation == anchor.generation {
                present = true;
                entry.father_name = anchor.father_name.clone();
                entry.mother_name = anchor.mother_name.clone();
            }
        }
        if !present {
            entries.push(synthesize_anchor(anchor));
        }
    }
}

fn synthesize_anchor(anchor: &AnchorRecord) -> LineageEntry {
    LineageEntry {
        id: anchor.id.clone(),
        full_name: anchor.name.clone(),
        generation: anchor.generation,
        father_name: anchor.father_name.clone(),
        mother_name: anchor.mother_name.clone(),
        synthesized: true,
    }
}

fn detect_gaps(entries: &[LineageEntry]) -> Vec<i64> {
    let Some(min) = entries.iter().map(|e| e.generation).min() else {
        return Vec::new();
    };
    let max = entries.iter().map(|e| e.generation).max().unwrap_or(min);
    let present: BTreeSet<i64> = entries.iter().map(|e| e.generation).collect();
    let mut missing = Vec::new();
    for generation in min..=max {
        if !present.contains(&generation) {
            warn!(generation, "lineage chain is missing a generation");
            missing.push(generation);
        }
    }
    missing
}
