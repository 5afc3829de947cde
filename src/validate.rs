use crate::model::EntityDescription;
use std::collections::HashSet;
use thiserror::Error;

/// A single violated well-formedness rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("entity name is empty")]
    EmptyName,
    #[error("duplicate identifier label `{0}`")]
    DuplicateIdentifier(String),
    #[error("duplicate attribute label `{0}`")]
    DuplicateAttribute(String),
    #[error("duplicate sub-attribute label `{label}` in field group `{group}`")]
    DuplicateSubAttribute { group: String, label: String },
    #[error("entity name `{0}` appears more than once in this batch")]
    DuplicateEntityName(String),
}

/// Carries every rule the entity violated, not just the first.
#[derive(Debug, Clone, Error)]
#[error("entity `{entity}` failed validation ({} rule{} violated)",
    violations.len(), if violations.len() == 1 { "" } else { "s" })]
pub struct ValidationError {
    pub entity: String,
    pub violations: Vec<Violation>,
}

/// Checks one entity description for structural well-formedness. Pure; a
/// failure here never affects sibling entities in a batch.
pub fn validate_entity(entity: &EntityDescription) -> Result<(), ValidationError> {
    let mut violations = collect_violations(entity);
    if violations.is_empty() {
        Ok(())
    } else {
        violations.dedup();
        Err(ValidationError {
            entity: entity.name.clone(),
            violations,
        })
    }
}

/// Like [`validate_entity`] but lets the batch driver prepend batch-level
/// violations (duplicate entity names) before deciding pass/fail.
pub fn collect_violations(entity: &EntityDescription) -> Vec<Violation> {
    let mut violations = Vec::new();

    if entity.name.trim().is_empty() {
        violations.push(Violation::EmptyName);
    }

    for label in duplicate_labels(entity.identifiers.iter().map(|id| id.label.as_str())) {
        violations.push(Violation::DuplicateIdentifier(label));
    }
    for label in duplicate_labels(entity.attributes.iter().map(|attr| attr.label.as_str())) {
        violations.push(Violation::DuplicateAttribute(label));
    }
    for group in &entity.field_groups {
        for label in duplicate_labels(group.sub_attributes.iter().map(|sub| sub.label.as_str())) {
            violations.push(Violation::DuplicateSubAttribute {
                group: group.label.clone(),
                label,
            });
        }
    }

    violations
}

fn duplicate_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for label in labels {
        if !seen.insert(label) && reported.insert(label) {
            duplicates.push(label.to_string());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, FieldGroup, Identifier};

    fn entity(name: &str) -> EntityDescription {
        EntityDescription {
            name: name.to_string(),
            identifiers: Vec::new(),
            attributes: Vec::new(),
            field_groups: Vec::new(),
        }
    }

    #[test]
    fn valid_entity_passes() {
        let mut person = entity("Person");
        person.identifiers = vec![Identifier::new("PersonId"), Identifier::new("SSN")];
        person.attributes = vec![Attribute::new("FirstName")];
        assert!(validate_entity(&person).is_ok());
    }

    #[test]
    fn empty_name_is_flagged() {
        let err = validate_entity(&entity("  ")).unwrap_err();
        assert_eq!(err.violations, vec![Violation::EmptyName]);
    }

    #[test]
    fn reports_every_violation_not_just_the_first() {
        let mut bad = entity("");
        bad.identifiers = vec![Identifier::new("Id"), Identifier::new("Id")];
        bad.attributes = vec![
            Attribute::new("Name"),
            Attribute::new("Name"),
            Attribute::new("Name"),
        ];
        bad.field_groups = vec![FieldGroup::new(
            "Address",
            vec![Attribute::new("City"), Attribute::new("City")],
        )];

        let err = validate_entity(&bad).unwrap_err();
        assert_eq!(err.violations.len(), 4);
        assert!(err.violations.contains(&Violation::EmptyName));
        assert!(
            err.violations
                .contains(&Violation::DuplicateIdentifier("Id".to_string()))
        );
        assert!(
            err.violations
                .contains(&Violation::DuplicateAttribute("Name".to_string()))
        );
        assert!(err.violations.contains(&Violation::DuplicateSubAttribute {
            group: "Address".to_string(),
            label: "City".to_string(),
        }));
    }

    #[test]
    fn same_label_across_sections_is_allowed() {
        let mut person = entity("Person");
        person.identifiers = vec![Identifier::new("Status")];
        person.attributes = vec![Attribute::new("Status")];
        person.field_groups = vec![FieldGroup::new("Status", vec![Attribute::new("Status")])];
        assert!(validate_entity(&person).is_ok());
    }
}
