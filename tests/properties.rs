use std::collections::BTreeSet;

use famtree_renderer::config::{LayoutConfig, LineageConfig};
use famtree_renderer::graph::build_render_graph;
use famtree_renderer::layout::tidy::{layout_tree, subtree_extent};
use famtree_renderer::lineage::{LineageResolution, resolve};
use famtree_renderer::model::{
    Gender, Marriage, MarriageKind, PersonRecord, RelationshipMaps, family_id,
};
use famtree_renderer::state::ViewState;
use famtree_renderer::tree::{TreeNode, TreeNodeKind, assemble};

fn person(id: &str, generation: i64) -> PersonRecord {
    PersonRecord {
        id: id.to_string(),
        full_name: format!("Person {id}"),
        gender: Gender::Male,
        generation,
        father_id: None,
        mother_id: None,
        branch: None,
        marriages: Vec::new(),
    }
}

fn with_parents(id: &str, generation: i64, father: &str, mother: &str) -> PersonRecord {
    let mut record = person(id, generation);
    record.father_id = Some(father.to_string());
    record.mother_id = Some(mother.to_string());
    record
}

fn married(mut record: PersonRecord, spouse: &str, order: u32, kind: MarriageKind) -> PersonRecord {
    record.marriages.push(Marriage {
        spouse_id: Some(spouse.to_string()),
        spouse_name: None,
        order,
        kind,
    });
    record
}

fn sample_records() -> Vec<PersonRecord> {
    let mut founder = married(person("P1", 1), "S1", 0, MarriageKind::Primary);
    founder.full_name = "Founder".to_string();
    let mut wife = person("S1", 1);
    wife.gender = Gender::Female;
    let son = married(
        with_parents("P2", 2, "P1", "S1"),
        "S2",
        0,
        MarriageKind::Primary,
    );
    let mut daughter_in_law = person("S2", 2);
    daughter_in_law.gender = Gender::Female;
    let daughter = with_parents("P3", 2, "P1", "S1");
    let grandchild = with_parents("P4", 3, "P2", "S2");
    vec![founder, wife, son, daughter_in_law, daughter, grandchild]
}

#[test]
fn rebuilds_are_deterministic() {
    let records = sample_records();
    let first = build_render_graph(&records, None);
    let second = build_render_graph(&records, None);
    let first_ids: BTreeSet<&str> = first.family_nodes.iter().map(|f| f.id.as_str()).collect();
    let second_ids: BTreeSet<&str> = second.family_nodes.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn sibling_grouping_is_complete() {
    let records = sample_records();
    let graph = build_render_graph(&records, None);
    for record in &records {
        let (Some(father), Some(mother)) = (&record.father_id, &record.mother_id) else {
            continue;
        };
        let expected = family_id(Some(father), Some(mother), 0);
        let holders: Vec<&str> = graph
            .family_nodes
            .iter()
            .filter(|family| family.children.contains(&record.id))
            .map(|family| family.id.as_str())
            .collect();
        assert_eq!(holders, vec![expected.as_str()], "person {}", record.id);
    }
}

#[test]
fn family_id_ignores_spouse_order() {
    for (a, b) in [("P1", "S1"), ("A", "B"), ("x9", "x10")] {
        assert_eq!(
            family_id(Some(a), Some(b), 0),
            family_id(Some(b), Some(a), 0)
        );
    }
}

fn assert_packed(node: &TreeNode, config: &famtree_renderer::TreeConfig) {
    let mut previous: Option<f32> = None;
    for child in &node.children {
        let extent = subtree_extent(child, config);
        if let Some(right) = previous {
            assert!(
                right <= extent.left,
                "sibling subtrees overlap under {}",
                node.id
            );
        }
        previous = Some(extent.right);
        assert_packed(child, config);
    }
}

fn assert_centered(node: &TreeNode, config: &famtree_renderer::TreeConfig) {
    if !node.children.is_empty() {
        let left = node
            .children
            .iter()
            .map(|child| subtree_extent(child, config).left)
            .fold(f32::MAX, f32::min);
        let right = node
            .children
            .iter()
            .map(|child| subtree_extent(child, config).right)
            .fold(f32::MIN, f32::max);
        let center = node.x + node.width(config) / 2.0;
        assert!(
            (center - (left + right) / 2.0).abs() < 0.01,
            "node {} not centered over its children",
            node.id
        );
    }
    for child in &node.children {
        assert_centered(child, config);
    }
}

#[test]
fn layout_packs_siblings_without_overlap() {
    let config = LayoutConfig::default();
    let graph = build_render_graph(&sample_records(), None);
    let state = ViewState::new();
    let mut root = assemble(&graph, &state, &config.tree).unwrap();
    layout_tree(&mut root, &config.tree);
    assert_packed(&root, &config.tree);
}

#[test]
fn layout_centers_parents_over_children_span() {
    let config = LayoutConfig::default();
    let graph = build_render_graph(&sample_records(), None);
    let state = ViewState::new();
    let mut root = assemble(&graph, &state, &config.tree).unwrap();
    layout_tree(&mut root, &config.tree);
    assert_centered(&root, &config.tree);
}

#[test]
fn collapse_toggle_is_idempotent() {
    let config = LayoutConfig::default();
    let graph = build_render_graph(&sample_records(), None);
    let target = family_id(Some("P2"), Some("S2"), 0);

    let mut state = ViewState::new();
    let before = assemble(&graph, &state, &config.tree).unwrap();
    let mut before_ids = Vec::new();
    before.collect_ids(&mut before_ids);

    state.toggle_collapsed(&target);
    let collapsed = assemble(&graph, &state, &config.tree).unwrap();
    let mut collapsed_ids = Vec::new();
    collapsed.collect_ids(&mut collapsed_ids);
    assert!(!collapsed_ids.contains(&target));

    state.toggle_collapsed(&target);
    let after = assemble(&graph, &state, &config.tree).unwrap();
    let mut after_ids = Vec::new();
    after.collect_ids(&mut after_ids);

    before_ids.sort();
    after_ids.sort();
    assert_eq!(before_ids, after_ids);
}

#[test]
fn lineage_output_is_deduplicated_and_ordered() {
    let records = vec![
        person("A", 2),
        {
            let mut b = person("B", 3);
            b.father_id = Some("A".to_string());
            b
        },
        {
            let mut t = person("T", 4);
            t.father_id = Some("B".to_string());
            t
        },
    ];
    let graph = build_render_graph(&records, None);
    let supplied = vec![person("A", 2), person("B", 3), person("A", 2)];
    let result = resolve("T", &graph, &supplied, &LineageConfig::default());
    let LineageResolution::Chain(chain) = result else {
        panic!("expected a chain");
    };
    let ids: Vec<&str> = chain.entries.iter().map(|e| e.id.as_str()).collect();
    let unique: BTreeSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate ids survived");
    let generations: Vec<i64> = chain.entries.iter().map(|e| e.generation).collect();
    assert!(
        generations.windows(2).all(|w| w[0] <= w[1]),
        "generations must be non-decreasing: {generations:?}"
    );
}

// A parentless founder and a father-only child: two family nodes total,
// and the child renders as a single-person placeholder leaf.
#[test]
fn scenario_orphan_root_and_placeholder() {
    let records = vec![person("P1", 1), {
        let mut p2 = person("P2", 2);
        p2.father_id = Some("P1".to_string());
        p2
    }];
    let graph = build_render_graph(&records, None);
    assert_eq!(graph.family_nodes.len(), 2);

    let root_family = graph.family(&family_id(Some("P1"), None, 0)).unwrap();
    assert_eq!(root_family.spouse1_id.as_deref(), Some("P1"));
    assert!(root_family.spouse2_id.is_none());
    assert!(root_family.children.contains("P2"));

    let state = ViewState::new();
    let config = LayoutConfig::default();
    let root = assemble(&graph, &state, &config.tree).unwrap();
    assert_eq!(root.id, root_family.id);
    assert_eq!(root.children.len(), 1);
    let leaf = &root.children[0];
    assert!(matches!(leaf.kind, TreeNodeKind::Person(_)));
    assert_eq!(leaf.id, "F-P2-unknown-single");
    assert!(leaf.children.is_empty());
    assert_eq!(root.size(), 2);
}

// Two marriages, one child each: exactly two family nodes beyond the
// sibling-group node, with distinct orders and distinguishing labels.
#[test]
fn scenario_two_marriages_two_extra_families() {
    let husband = {
        let mut p = married(person("P", 1), "S1", 0, MarriageKind::Primary);
        p = married(p, "S2", 1, MarriageKind::Secondary);
        p
    };
    let mut s1 = person("S1", 1);
    s1.gender = Gender::Female;
    let mut s2 = person("S2", 1);
    s2.gender = Gender::Female;
    let mut c1 = person("C1", 2);
    c1.father_id = Some("P".to_string());
    let mut c2 = person("C2", 2);
    c2.father_id = Some("P".to_string());

    // Backend-exported adjacency: maternity known to the maps even though
    // the child records only carry the father.
    let mut maps = RelationshipMaps::default();
    for (parent, child) in [("P", "C1"), ("P", "C2"), ("S1", "C1"), ("S2", "C2")] {
        maps.children
            .entry(parent.to_string())
            .or_default()
            .insert(child.to_string());
    }
    for child in ["C1", "C2"] {
        maps.parents
            .entry(child.to_string())
            .or_default()
            .insert("P".to_string());
    }

    let graph = build_render_graph(&[husband, s1, s2, c1, c2], Some(&maps));

    let sibling_group = graph.family(&family_id(Some("P"), None, 0)).unwrap();
    assert_eq!(sibling_group.children.len(), 2);

    let marriage_families: Vec<_> = graph
        .family_nodes
        .iter()
        .filter(|family| family.label.is_some())
        .collect();
    assert_eq!(marriage_families.len(), 2);
    let orders: BTreeSet<u32> = marriage_families
        .iter()
        .map(|family| family.marriage_order)
        .collect();
    assert_eq!(orders, BTreeSet::from([0, 1]));
    let first = marriage_families
        .iter()
        .find(|family| family.marriage_order == 0)
        .unwrap();
    assert_eq!(first.label.as_deref(), Some("Primary spouse"));
    assert_eq!(first.children.len(), 1);
    let second = marriage_families
        .iter()
        .find(|family| family.marriage_order == 1)
        .unwrap();
    assert_eq!(second.label.as_deref(), Some("Spouse 2"));
    assert!(second.children.contains("C2"));
}

// Empty ancestors chain for a generation-3 target: both anchors are
// synthesized and the gap at generation 2 is reported.
#[test]
fn scenario_empty_chain_synthesizes_anchors() {
    let graph = build_render_graph(&[person("T", 3)], None);
    let config = LineageConfig::default();
    let result = resolve("T", &graph, &[], &config);
    let LineageResolution::Chain(chain) = result else {
        panic!("expected a chain");
    };
    let generations: Vec<i64> = chain.entries.iter().map(|e| e.generation).collect();
    assert_eq!(generations, vec![0, 1, 3]);
    assert!(chain.entries.iter().take(2).all(|e| e.synthesized));
    assert_eq!(chain.missing_generations, vec![2]);
}
