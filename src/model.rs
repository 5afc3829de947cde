use serde::{Deserialize, Deserializer};

/// Closed set of diagram item kinds. Color policy and column placement are
/// total functions over this enum; it is deliberately not user-extensible.
///
/// The declaration order is the stable legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Entity,
    Identifier,
    Attribute,
    FieldGroup,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Entity,
        Category::Identifier,
        Category::Attribute,
        Category::FieldGroup,
    ];
}

/// The metadata document supplied on the command line: an ordered batch of
/// entity descriptions.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataDocument {
    pub entities: Vec<EntityDescription>,
}

/// One master entity to diagram. Field order in the input is preserved and is
/// the single source of vertical stacking order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescription {
    pub name: String,
    #[serde(default)]
    pub identifiers: Vec<Identifier>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub field_groups: Vec<FieldGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Identifier {
    pub label: String,
}

impl Identifier {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

/// A leaf value on the entity. `has_selector` marks a value chosen from an
/// enumerated set and adds a dropdown glyph to the rendered box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub label: String,
    pub has_selector: bool,
}

impl Attribute {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            has_selector: false,
        }
    }

    pub fn with_selector(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            has_selector: true,
        }
    }
}

// Accept either a bare label string or the full object form, so the plain
// field lists produced by upstream model exports deserialize as-is.
impl<'de> Deserialize<'de> for Attribute {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(String),
            Full {
                label: String,
                #[serde(rename = "hasSelector", default)]
                has_selector: bool,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(label) => Attribute {
                label,
                has_selector: false,
            },
            Repr::Full {
                label,
                has_selector,
            } => Attribute {
                label,
                has_selector,
            },
        })
    }
}

/// A named group owning an ordered list of sub-attributes. A group with no
/// sub-attributes is still drawn; it just contributes nothing to column 2.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldGroup {
    #[serde(alias = "name")]
    pub label: String,
    #[serde(rename = "subAttributes", default)]
    pub sub_attributes: Vec<Attribute>,
}

impl FieldGroup {
    pub fn new(label: impl Into<String>, sub_attributes: Vec<Attribute>) -> Self {
        Self {
            label: label.into(),
            sub_attributes,
        }
    }
}

impl EntityDescription {
    /// Number of column-1 rows this entity produces.
    pub fn column1_len(&self) -> usize {
        self.identifiers.len() + self.attributes.len() + self.field_groups.len()
    }

    /// Number of column-2 rows (sub-attributes across all field groups).
    pub fn column2_len(&self) -> usize {
        self.field_groups
            .iter()
            .map(|group| group.sub_attributes.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let doc: MetadataDocument = serde_json::from_str(
            r#"{
                "entities": [{
                    "name": "Person",
                    "identifiers": ["PersonId", "SSN"],
                    "attributes": ["FirstName", {"label": "Gender", "hasSelector": true}],
                    "fieldGroups": [{
                        "label": "Address",
                        "subAttributes": ["City", {"label": "State", "hasSelector": true}]
                    }]
                }]
            }"#,
        )
        .expect("document should parse");

        let entity = &doc.entities[0];
        assert_eq!(entity.name, "Person");
        assert_eq!(entity.identifiers.len(), 2);
        assert!(!entity.attributes[0].has_selector);
        assert!(entity.attributes[1].has_selector);
        assert_eq!(entity.field_groups[0].sub_attributes.len(), 2);
        assert_eq!(entity.column1_len(), 5);
        assert_eq!(entity.column2_len(), 2);
    }

    #[test]
    fn field_group_without_sub_attributes_parses_empty() {
        let group: FieldGroup =
            serde_json::from_str(r#"{"name": "Phone"}"#).expect("group should parse");
        assert_eq!(group.label, "Phone");
        assert!(group.sub_attributes.is_empty());
    }
}
