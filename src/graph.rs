use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::debug;

use crate::model::{
    FamilyNode, Gender, Link, MarriageKind, PersonNode, PersonRecord, RelationshipMaps, family_id,
};

/// Builder output: the full render graph plus the id-keyed lookups the
/// assembler and renderer need. Rebuilt from scratch on every pass.
#[derive(Debug, Clone, Default)]
pub struct RenderGraph {
    pub person_nodes: Vec<PersonNode>,
    pub family_nodes: Vec<FamilyNode>,
    pub links: Vec<Link>,
    pub person_index: BTreeMap<String, usize>,
    pub family_index: BTreeMap<String, usize>,
    /// child id -> id of the family the child belongs to as a child
    pub children_to_family: BTreeMap<String, String>,
    /// spouse id -> family id. Last write wins, so a person with several
    /// marriages keeps only one entry here; use [`RenderGraph::spousal_families`]
    /// to recover all candidates.
    pub person_to_family: BTreeMap<String, String>,
}

impl RenderGraph {
    pub fn person(&self, id: &str) -> Option<&PersonNode> {
        self.person_index.get(id).map(|idx| &self.person_nodes[*idx])
    }

    pub fn family(&self, id: &str) -> Option<&FamilyNode> {
        self.family_index.get(id).map(|idx| &self.family_nodes[*idx])
    }

    /// Every family in which `person_id` appears as a spouse, in insertion
    /// order. Re-derivation is deliberate: `person_to_family` is lossy for
    /// multi-marriage persons.
    pub fn spousal_families(&self, person_id: &str) -> Vec<&FamilyNode> {
        self.family_nodes
            .iter()
            .filter(|family| family.has_spouse(person_id))
            .collect()
    }

    fn insert_family(&mut self, family: FamilyNode) -> bool {
        if self.family_index.contains_key(&family.id) {
            return false;
        }
        self.family_index
            .insert(family.id.clone(), self.family_nodes.len());
        self.family_nodes.push(family);
        true
    }
}

/// Builds the render graph from a flat record list. Pure: no side effects
/// beyond the returned structures, and deterministic for a given input.
///
/// When `maps` is `None` the parent/child adjacency is derived from the
/// records themselves; callers holding richer backend exports can pass
/// their own maps instead.
pub fn build_render_graph(
    records: &[PersonRecord],
    maps: Option<&RelationshipMaps>,
) -> RenderGraph {
    let derived;
    let maps = match maps {
        Some(maps) => maps,
        None => {
            derived = RelationshipMaps::from_records(records);
            &derived
        }
    };

    let mut graph = RenderGraph::default();

    let gender_by_id: BTreeMap<&str, Gender> = records
        .iter()
        .map(|record| (record.id.as_str(), record.gender))
        .collect();
    let generation_by_id: BTreeMap<&str, i64> = records
        .iter()
        .map(|record| (record.id.as_str(), record.generation))
        .collect();
    let name_by_id: BTreeMap<&str, &str> = records
        .iter()
        .map(|record| (record.id.as_str(), record.full_name.as_str()))
        .collect();

    for record in records {
        let mut node = PersonNode::from_record(record);
        if node.record.father_id.is_none() {
            node.record.father_id =
                resolve_parent(&node.record.id, Gender::Male, maps, &gender_by_id);
        }
        if node.record.mother_id.is_none() {
            node.record.mother_id =
                resolve_parent(&node.record.id, Gender::Female, maps, &gender_by_id);
        }
        if !graph.person_index.contains_key(&node.record.id) {
            graph
                .person_index
                .insert(node.record.id.clone(), graph.person_nodes.len());
            graph.person_nodes.push(node);
        }
    }

    build_sibling_groups(&mut graph, &generation_by_id, &name_by_id);
    build_marriage_families(&mut graph, records, maps, &name_by_id);

    for family in &graph.family_nodes {
        for child in &family.children {
            graph.links.push(Link {
                family_id: family.id.clone(),
                child_id: child.clone(),
            });
        }
    }

    graph
}

/// Fills a missing parent slot from the parent map, keeping only candidates
/// of the required gender. When several candidates share that gender the
/// first in map order wins; the original data source behaved the same way,
/// so the tie-break is kept rather than fixed.
fn resolve_parent(
    person_id: &str,
    wanted: Gender,
    maps: &RelationshipMaps,
    gender_by_id: &BTreeMap<&str, Gender>,
) -> Option<String> {
    let candidates = maps.parents_of(person_id)?;
    let mut matching = candidates
        .iter()
        .filter(|candidate| gender_by_id.get(candidate.as_str()).copied() == Some(wanted));
    let chosen = matching.next()?;
    if matching.next().is_some() {
        debug!(
            person = person_id,
            parent = chosen.as_str(),
            "multiple same-gender parent candidates, first one kept"
        );
    }
    Some(chosen.clone())
}

/// Groups every person by their (father, mother) pair; each group becomes
/// one family node. Persons with neither parent share the orphan/root
/// placeholder group.
fn build_sibling_groups(
    graph: &mut RenderGraph,
    generation_by_id: &BTreeMap<&str, i64>,
    name_by_id: &BTreeMap<&str, &str>,
) {
    struct Group {
        father: Option<String>,
        mother: Option<String>,
        children: BTreeSet<String>,
    }

    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for person in &graph.person_nodes {
        let father = person.record.father_id.clone();
        let mother = person.record.mother_id.clone();
        let id = family_id(father.as_deref(), mother.as_deref(), 0);
        groups
            .entry(id)
            .or_insert_with(|| Group {
                father,
                mother,
                children: BTreeSet::new(),
            })
            .children
            .insert(person.record.id.clone());
    }

    for (id, group) in groups {
        let generation = group
            .father
            .as_deref()
            .and_then(|parent| generation_by_id.get(parent).copied())
            .or_else(|| {
                group
                    .mother
                    .as_deref()
                    .and_then(|parent| generation_by_id.get(parent).copied())
            })
            .unwrap_or_else(|| orphan_generation(&group.children, generation_by_id));
        let family = FamilyNode {
            id: id.clone(),
            spouse1_name: lookup_name(group.father.as_deref(), name_by_id),
            spouse2_name: lookup_name(group.mother.as_deref(), name_by_id),
            spouse1_id: group.father,
            spouse2_id: group.mother,
            marriage_order: 0,
            generation,
            children: group.children,
            label: None,
        };
        for spouse in [&family.spouse1_id, &family.spouse2_id]
            .into_iter()
            .flatten()
        {
            graph.person_to_family.insert(spouse.clone(), id.clone());
        }
        for child in &family.children {
            graph
                .children_to_family
                .entry(child.clone())
                .or_insert_with(|| id.clone());
        }
        graph.insert_family(family);
    }
}

/// One family node per recorded marriage, the marriage index becoming the
/// order. Children are the intersection of both spouses' child-sets. Ids
/// already produced by sibling grouping are never overwritten.
fn build_marriage_families(
    graph: &mut RenderGraph,
    records: &[PersonRecord],
    maps: &RelationshipMaps,
    name_by_id: &BTreeMap<&str, &str>,
) {
    for record in records {
        for (index, marriage) in record.marriages.iter().enumerate() {
            let order = index as u32;
            let id = family_id(Some(&record.id), marriage.spouse_id.as_deref(), order);
            let children = marriage_children(&record.id, marriage.spouse_id.as_deref(), maps);
            let label = if order == 0 && marriage.kind == MarriageKind::Primary {
                Some("Primary spouse".to_string())
            } else {
                Some(format!("Spouse {}", order + 1))
            };
            let spouse2_name = marriage
                .spouse_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .or_else(|| lookup_name(marriage.spouse_id.as_deref(), name_by_id));
            let family = FamilyNode {
                id: id.clone(),
                spouse1_id: Some(record.id.clone()),
                spouse2_id: marriage.spouse_id.clone(),
                spouse1_name: Some(record.full_name.clone()),
                spouse2_name,
                marriage_order: order,
                generation: record.generation,
                children,
                label,
            };
            if graph.insert_family(family) {
                let inserted = &graph.family_nodes[graph.family_nodes.len() - 1];
                for child in inserted.children.clone() {
                    graph
                        .children_to_family
                        .entry(child)
                        .or_insert_with(|| id.clone());
                }
            }
            graph
                .person_to_family
                .insert(record.id.clone(), id.clone());
            if let Some(spouse) = &marriage.spouse_id {
                graph.person_to_family.insert(spouse.clone(), id.clone());
            }
        }
    }
}

fn marriage_children(
    person_id: &str,
    spouse_id: Option<&str>,
    maps: &RelationshipMaps,
) -> BTreeSet<String> {
    let Some(own) = maps.children_of(person_id) else {
        return BTreeSet::new();
    };
    let Some(spouse_id) = spouse_id else {
        return BTreeSet::new();
    };
    let Some(theirs) = maps.children_of(spouse_id) else {
        return BTreeSet::new();
    };
    own.intersection(theirs).cloned().collect()
}

fn orphan_generation(
    children: &BTreeSet<String>,
    generation_by_id: &BTreeMap<&str, i64>,
) -> i64 {
    children
        .iter()
        .filter_map(|child| generation_by_id.get(child.as_str()).copied())
        .min()
        .map(|generation| (generation - 1).max(0))
        .unwrap_or(0)
}

fn lookup_name(id: Option<&str>, name_by_id: &BTreeMap<&str, &str>) -> Option<String> {
    id.and_then(|id| name_by_id.get(id))
        .map(|name| name.to_string())
        .filter(|name| !name.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Marriage;

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

    #[test]
    fn siblings_share_one_family() {
        let mut father = person("F", 1);
        father.gender = Gender::Male;
        let mut mother = person("M", 1);
        mother.gender = Gender::Female;
        let mut a = person("A", 2);
        a.father_id = Some("F".into());
        a.mother_id = Some("M".into());
        let mut b = person("B", 2);
        b.father_id = Some("F".into());
        b.mother_id = Some("M".into());

        let graph = build_render_graph(&[father, mother, a, b], None);
        let family = graph.family(&family_id(Some("F"), Some("M"), 0)).unwrap();
        assert_eq!(family.children.len(), 2);
        assert!(family.children.contains("A"));
        assert!(family.children.contains("B"));
        assert_eq!(family.generation, 1);
        // one link per (family, child) edge
        let to_siblings: Vec<_> = graph
            .links
            .iter()
            .filter(|link| link.family_id == family.id)
            .collect();
        assert_eq!(to_siblings.len(), 2);
    }

    #[test]
    fn missing_parent_resolved_by_gender() {
        let mut father = person("F", 1);
        father.gender = Gender::Male;
        let mut mother = person("M", 1);
        mother.gender = Gender::Female;
        let mut child = person("C", 2);
        child.father_id = None;
        child.mother_id = None;

        let mut maps = RelationshipMaps::default();
        for parent in ["F", "M"] {
            maps.children
                .entry(parent.to_string())
                .or_default()
                .insert("C".to_string());
            maps.parents
                .entry("C".to_string())
                .or_default()
                .insert(parent.to_string());
        }

        let graph = build_render_graph(&[father, mother, child], Some(&maps));
        let node = graph.person("C").unwrap();
        assert_eq!(node.record.father_id.as_deref(), Some("F"));
        assert_eq!(node.record.mother_id.as_deref(), Some("M"));
    }

    #[test]
    fn marriage_families_get_order_and_label() {
        let mut p = person("P", 1);
        p.marriages = vec![
            Marriage {
                spouse_id: Some("S1".into()),
                spouse_name: None,
                order: 0,
                kind: MarriageKind::Primary,
            },
            Marriage {
                spouse_id: Some("S2".into()),
                spouse_name: None,
                order: 1,
                kind: MarriageKind::Secondary,
            },
        ];
        let mut s1 = person("S1", 1);
        s1.gender = Gender::Female;
        let mut s2 = person("S2", 1);
        s2.gender = Gender::Female;

        let graph = build_render_graph(&[p, s1, s2], None);
        let first = graph.family(&family_id(Some("P"), Some("S1"), 0)).unwrap();
        assert_eq!(first.marriage_order, 0);
        assert_eq!(first.label.as_deref(), Some("Primary spouse"));
        let second = graph.family(&family_id(Some("P"), Some("S2"), 1)).unwrap();
        assert_eq!(second.marriage_order, 1);
        assert_eq!(second.label.as_deref(), Some("Spouse 2"));
    }

    #[test]
    fn existing_family_id_never_overwritten() {
        let mut father = person("F", 1);
        father.marriages = vec![Marriage {
            spouse_id: Some("M".into()),
            spouse_name: None,
            order: 0,
            kind: MarriageKind::Primary,
        }];
        let mut mother = person("M", 1);
        mother.gender = Gender::Female;
        let mut child = person("C", 2);
        child.father_id = Some("F".into());
        child.mother_id = Some("M".into());

        let graph = build_render_graph(&[father, mother, child], None);
        // Sibling grouping created F-F-M first; the marriage pass must not
        // replace it, so the child set stays intact.
        let family = graph.family(&family_id(Some("F"), Some("M"), 0)).unwrap();
        assert!(family.children.contains("C"));
        assert!(family.label.is_none());
    }

    #[test]
    fn spousal_families_recovers_all_marriages() {
        let mut p = person("P", 1);
        p.marriages = vec![
            Marriage {
                spouse_id: Some("S1".into()),
                spouse_name: None,
                order: 0,
                kind: MarriageKind::Primary,
            },
            Marriage {
                spouse_id: Some("S2".into()),
                spouse_name: None,
                order: 1,
                kind: MarriageKind::Secondary,
            },
        ];
        let graph = build_render_graph(&[p, person("S1", 1), person("S2", 1)], None);
        let families = graph.spousal_families("P");
        assert!(families.len() >= 2);
        // The one-value map kept only the last marriage.
        assert_eq!(
            graph.person_to_family.get("P").unwrap(),
            &family_id(Some("P"), Some("S2"), 1)
        );
    }
}
