use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Placeholder token used in family ids for an absent spouse.
pub const UNKNOWN_TOKEN: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    /// Accepts the English tokens plus the Vietnamese source aliases.
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "male" | "Male" | "M" | "m" | "Nam" | "nam" => Self::Male,
            "female" | "Female" | "F" | "f" | "Nữ" | "nữ" | "Nu" | "nu" => Self::Female,
            _ => Self::Other,
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Male => "male".to_string(),
            Gender::Female => "female".to_string(),
            Gender::Other => "other".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarriageKind {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marriage {
    #[serde(alias = "spouseId", default)]
    pub spouse_id: Option<String>,
    #[serde(alias = "spouseName", default)]
    pub spouse_name: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(rename = "type", default)]
    pub kind: MarriageKind,
}

/// One person as delivered by the backend. Field aliases cover the
/// historical spellings still present in exported data sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(alias = "personId", alias = "person_id")]
    pub id: String,
    #[serde(alias = "fullName", default)]
    pub full_name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(
        alias = "generation_number",
        alias = "generation_level",
        default = "default_generation"
    )]
    pub generation: i64,
    #[serde(alias = "fatherId", default)]
    pub father_id: Option<String>,
    #[serde(alias = "motherId", default)]
    pub mother_id: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub marriages: Vec<Marriage>,
}

fn default_generation() -> i64 {
    1
}

/// Rendering-layer projection of a [`PersonRecord`].
#[derive(Debug, Clone, Serialize)]
pub struct PersonNode {
    pub record: PersonRecord,
    pub branch: Option<String>,
}

impl PersonNode {
    pub fn from_record(record: &PersonRecord) -> Self {
        Self {
            branch: record.branch.clone(),
            record: record.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// One couple unit (marriage) or a single-parent/orphan placeholder,
/// plus the ids of the children attributed to it.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyNode {
    pub id: String,
    pub spouse1_id: Option<String>,
    pub spouse2_id: Option<String>,
    pub spouse1_name: Option<String>,
    pub spouse2_name: Option<String>,
    pub marriage_order: u32,
    pub generation: i64,
    pub children: BTreeSet<String>,
    pub label: Option<String>,
}

impl FamilyNode {
    pub fn has_spouse(&self, person_id: &str) -> bool {
        self.spouse1_id.as_deref() == Some(person_id)
            || self.spouse2_id.as_deref() == Some(person_id)
    }

    /// Name of the spouse that is not `person_id`, if any.
    pub fn other_spouse_name(&self, person_id: &str) -> Option<&str> {
        if self.spouse1_id.as_deref() == Some(person_id) {
            self.spouse2_name.as_deref()
        } else {
            self.spouse1_name.as_deref()
        }
    }
}

/// Parent-family to child edge.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub family_id: String,
    pub child_id: String,
}

/// Deterministic family identity: a function of the unordered spouse pair
/// plus the marriage order. The same couple reached from different input
/// paths always yields the same id.
pub fn family_id(spouse1: Option<&str>, spouse2: Option<&str>, order: u32) -> String {
    if spouse1.is_none() && spouse2.is_none() {
        return format!("F-{UNKNOWN_TOKEN}-{order}");
    }
    let a = spouse1.unwrap_or(UNKNOWN_TOKEN);
    let b = spouse2.unwrap_or(UNKNOWN_TOKEN);
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if order > 0 {
        format!("F-{lo}-{hi}-{order}")
    } else {
        format!("F-{lo}-{hi}")
    }
}

/// Id for the placeholder family wrapped around a person with no spousal
/// family, so the assembled tree stays family-shaped.
pub fn single_person_family_id(person_id: &str) -> String {
    format!("F-{person_id}-{UNKNOWN_TOKEN}-single")
}

/// Derived parent/child adjacency. Callers may supply their own maps when
/// the backend exports richer relationship data than the records carry.
#[derive(Debug, Clone, Default)]
pub struct RelationshipMaps {
    /// parent id -> child ids
    pub children: BTreeMap<String, BTreeSet<String>>,
    /// child id -> parent ids
    pub parents: BTreeMap<String, BTreeSet<String>>,
}

impl RelationshipMaps {
    pub fn from_records(records: &[PersonRecord]) -> Self {
        let mut maps = Self::default();
        for record in records {
            for parent in [&record.father_id, &record.mother_id]
                .into_iter()
                .flatten()
            {
                maps.children
                    .entry(parent.clone())
                    .or_default()
                    .insert(record.id.clone());
                maps.parents
                    .entry(record.id.clone())
                    .or_default()
                    .insert(parent.clone());
            }
        }
        maps
    }

    pub fn children_of(&self, person_id: &str) -> Option<&BTreeSet<String>> {
        self.children.get(person_id)
    }

    pub fn parents_of(&self, person_id: &str) -> Option<&BTreeSet<String>> {
        self.parents.get(person_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_id_is_symmetric() {
        assert_eq!(
            family_id(Some("P1"), Some("P2"), 0),
            family_id(Some("P2"), Some("P1"), 0)
        );
        assert_eq!(
            family_id(Some("P1"), Some("P2"), 3),
            family_id(Some("P2"), Some("P1"), 3)
        );
    }

    #[test]
    fn family_id_order_suffix_only_when_positive() {
        assert_eq!(family_id(Some("A"), Some("B"), 0), "F-A-B");
        assert_eq!(family_id(Some("A"), Some("B"), 2), "F-A-B-2");
    }

    #[test]
    fn family_id_substitutes_unknown_spouse() {
        assert_eq!(family_id(Some("P9"), None, 0), "F-P9-unknown");
        assert_eq!(family_id(None, None, 0), "F-unknown-0");
        assert_eq!(family_id(None, None, 1), "F-unknown-1");
    }

    #[test]
    fn gender_parses_source_aliases() {
        assert_eq!(Gender::parse("Nam"), Gender::Male);
        assert_eq!(Gender::parse("Nữ"), Gender::Female);
        assert_eq!(Gender::parse("khác"), Gender::Other);
    }

    #[test]
    fn person_record_accepts_field_aliases() {
        let json = r#"{
            "personId": "P1",
            "fullName": "Tran Van A",
            "gender": "Nam",
            "generation_number": 4,
            "fatherId": "P0"
        }"#;
        let record: PersonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "P1");
        assert_eq!(record.generation, 4);
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.father_id.as_deref(), Some("P0"));
        assert!(record.mother_id.is_none());
    }

    #[test]
    fn relationship_maps_link_both_directions() {
        let records = vec![
            PersonRecord {
                id: "C".into(),
                full_name: "Child".into(),
                gender: Gender::Male,
                generation: 2,
                father_id: Some("F".into()),
                mother_id: Some("M".into()),
                branch: None,
                marriages: Vec::new(),
            },
        ];
        let maps = RelationshipMaps::from_records(&records);
        assert!(maps.children_of("F").unwrap().contains("C"));
        assert!(maps.children_of("M").unwrap().contains("C"));
        assert_eq!(maps.parents_of("C").unwrap().len(), 2);
    }
}
