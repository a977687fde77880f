//! Property views and relationship annotations.
//!
//! Property bodies stay raw in the entity map; [`Property`] is a borrowed,
//! typed view over the members the expansion engine reads. The relationship
//! annotation under the `relationship` key is parsed on demand into a
//! normalized [`Relationship`].

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use std::fmt;
use strum::Display;

use crate::schema::StringOrList;

/// Cardinality of one side of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum MultiplicitySide {
    /// Exactly one related entity.
    #[default]
    #[strum(serialize = "1")]
    One,
    /// Any number of related entities.
    #[strum(serialize = "n")]
    Many,
}

impl MultiplicitySide {
    fn parse(token: &str) -> Self {
        if token.trim() == "n" {
            MultiplicitySide::Many
        } else {
            MultiplicitySide::One
        }
    }
}

/// Source and target cardinality of a relationship, written `"1"`, `"n"`,
/// or `"<source>:<target>"`. Defaults to `1:1`.
///
/// ## Examples
///
/// ```
/// use linkspec_define::{Multiplicity, MultiplicitySide};
///
/// let m = Multiplicity::parse("1:n");
/// assert_eq!(m.source, MultiplicitySide::One);
/// assert_eq!(m.target, MultiplicitySide::Many);
/// assert!(m.is_multi_valued());
/// assert_eq!(m.to_string(), "1:n");
///
/// assert!(!Multiplicity::default().is_multi_valued());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Multiplicity {
    /// Cardinality on the declaring side.
    pub source: MultiplicitySide,
    /// Cardinality on the target side; `n` makes the relationship
    /// multi-valued.
    pub target: MultiplicitySide,
}

impl Multiplicity {
    /// Parses a multiplicity token. A bare token applies to both sides.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split(':');
        let first = parts.next().unwrap_or(text);
        let last = parts.next_back().unwrap_or(first);
        Multiplicity {
            source: MultiplicitySide::parse(first),
            target: MultiplicitySide::parse(last),
        }
    }

    /// Whether the target side is multi-valued.
    pub fn is_multi_valued(&self) -> bool {
        self.target == MultiplicitySide::Many
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.target)
    }
}

impl<'de> Deserialize<'de> for Multiplicity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MultiplicityVisitor;

        impl Visitor<'_> for MultiplicityVisitor {
            type Value = Multiplicity;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a multiplicity such as \"1\", \"n\" or \"1:n\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Multiplicity::parse(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Multiplicity::parse(&value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Multiplicity::parse(&value.to_string()))
            }
        }

        deserializer.deserialize_any(MultiplicityVisitor)
    }
}

/// Accepted media types for creating members of a multi-valued relationship.
///
/// Written either as a media-type string-or-list, or as a map from media
/// type to the entity reference(s) creatable with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Consumes {
    /// Media types only; create entities default to the edge target.
    MediaTypes(Vec<String>),
    /// Media type to creatable entity references, in declaration order.
    ByMediaType(Vec<(String, Vec<String>)>),
}

impl Consumes {
    /// The accepted media types, in declaration order.
    pub fn media_types(&self) -> Vec<String> {
        match self {
            Consumes::MediaTypes(types) => types.clone(),
            Consumes::ByMediaType(pairs) => {
                pairs.iter().map(|(media_type, _)| media_type.clone()).collect()
            }
        }
    }

    /// The creatable entity references, or `None` when the declaration does
    /// not name any (the edge target applies).
    pub fn create_entities(&self) -> Option<Vec<String>> {
        match self {
            Consumes::MediaTypes(_) => None,
            Consumes::ByMediaType(pairs) => Some(
                pairs
                    .iter()
                    .flat_map(|(_, entities)| entities.iter().cloned())
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Consumes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Map(Mapping),
            List(StringOrList),
        }

        match Raw::deserialize(deserializer)? {
            Raw::List(list) => Ok(Consumes::MediaTypes(list.items())),
            Raw::Map(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (key, value) in &map {
                    let media_type = key
                        .as_str()
                        .ok_or_else(|| de::Error::custom("consumes media type must be a string"))?;
                    let entities: StringOrList = serde_yaml::from_value(value.clone())
                        .map_err(|_| de::Error::custom("consumes entities must be a string or list"))?;
                    pairs.push((media_type.to_string(), entities.items()));
                }
                Ok(Consumes::ByMediaType(pairs))
            }
        }
    }
}

/// A normalized relationship annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Target entity references; one edge is derived per target.
    pub entities: Vec<String>,
    /// Relationship cardinality.
    pub multiplicity: Multiplicity,
    /// Whether a multi-valued relationship is an independently addressable
    /// collection resource (default true).
    pub collection_resource: bool,
    /// Accepted create media types / entities.
    pub consumes: Option<Consumes>,
    /// Whether members may be created through the relationship.
    pub read_only: bool,
    /// The entity representing one element of the collection result set,
    /// required whenever a collection GET is assembled.
    pub element_entity: Option<String>,
}

impl Relationship {
    /// Parses a relationship annotation value: a target-reference
    /// string-or-list shorthand, or the detailed map form.
    pub fn from_value(value: &Value) -> Result<Self, serde_yaml::Error> {
        #[derive(Deserialize)]
        struct Detailed {
            entities: StringOrList,
            #[serde(default)]
            multiplicity: Multiplicity,
            collection_resource: Option<bool>,
            consumes: Option<Consumes>,
            #[serde(rename = "readOnly", default)]
            read_only: bool,
            multi_valued_relationship_entity: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Decl {
            Detailed(Detailed),
            Shorthand(StringOrList),
        }

        let relationship = match serde_yaml::from_value(value.clone())? {
            Decl::Shorthand(targets) => Relationship {
                entities: targets.items(),
                multiplicity: Multiplicity::default(),
                collection_resource: true,
                consumes: None,
                read_only: false,
                element_entity: None,
            },
            Decl::Detailed(detailed) => Relationship {
                entities: detailed.entities.items(),
                multiplicity: detailed.multiplicity,
                collection_resource: detailed.collection_resource.unwrap_or(true),
                consumes: detailed.consumes,
                read_only: detailed.read_only,
                element_entity: detailed.multi_valued_relationship_entity,
            },
        };
        Ok(relationship)
    }
}

/// A borrowed, typed view over one property's raw schema fragment.
#[derive(Debug, Clone, Copy)]
pub struct Property<'a> {
    body: Option<&'a Mapping>,
}

impl<'a> Property<'a> {
    /// Wraps a raw property value. Non-mapping values yield a view with no
    /// recognized members.
    pub fn new(value: &'a Value) -> Self {
        Property {
            body: value.as_mapping(),
        }
    }

    /// The raw fragment, when it is a mapping.
    pub fn body(&self) -> Option<&'a Mapping> {
        self.body
    }

    /// One raw member of the fragment.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.body.and_then(|map| map.get(key))
    }

    /// The declared JSON-schema type, if any.
    pub fn schema_type(&self) -> Option<&'a str> {
        self.get("type").and_then(Value::as_str)
    }

    /// Whether the property is marked read-only.
    pub fn read_only(&self) -> bool {
        self.flag("readOnly")
    }

    /// Whether the property exists only for internal wiring.
    pub fn implementation_private(&self) -> bool {
        self.flag("implementation_private")
    }

    /// The parsed relationship annotation, if the property carries one.
    pub fn relationship(&self) -> Option<Result<Relationship, serde_yaml::Error>> {
        self.get("relationship").map(Relationship::from_value)
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relationship(yaml: &str) -> Relationship {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        Relationship::from_value(&value).unwrap()
    }

    #[test]
    fn multiplicity_forms_parse() {
        assert!(!Multiplicity::parse("1").is_multi_valued());
        assert!(Multiplicity::parse("n").is_multi_valued());
        assert!(Multiplicity::parse("1:n").is_multi_valued());
        assert!(!Multiplicity::parse("n:1").is_multi_valued());
        assert_eq!(Multiplicity::parse("n:1").source, MultiplicitySide::Many);
    }

    #[test]
    fn shorthand_string_names_one_target() {
        let rel = relationship("'#Item'");
        assert_eq!(rel.entities, vec!["#Item"]);
        assert!(!rel.multiplicity.is_multi_valued());
        assert!(!rel.read_only);
        assert!(rel.element_entity.is_none());
    }

    #[test]
    fn shorthand_list_fans_out() {
        let rel = relationship("['#Dog', '#Cat']");
        assert_eq!(rel.entities, vec!["#Dog", "#Cat"]);
    }

    #[test]
    fn detailed_form_carries_collection_semantics() {
        let rel = relationship(
            "entities: '#Item'\n\
             multiplicity: '1:n'\n\
             collection_resource: false\n\
             readOnly: true\n\
             multi_valued_relationship_entity: '#ItemPage'",
        );
        assert!(rel.multiplicity.is_multi_valued());
        assert!(!rel.collection_resource);
        assert!(rel.read_only);
        assert_eq!(rel.element_entity.as_deref(), Some("#ItemPage"));
    }

    #[test]
    fn numeric_multiplicity_is_accepted() {
        let rel = relationship("entities: '#Item'\nmultiplicity: 1");
        assert!(!rel.multiplicity.is_multi_valued());
    }

    #[test]
    fn consumes_list_form_has_no_create_entities() {
        let rel = relationship("entities: '#Item'\nconsumes: application/json");
        let consumes = rel.consumes.unwrap();
        assert_eq!(consumes.media_types(), vec!["application/json"]);
        assert!(consumes.create_entities().is_none());
    }

    #[test]
    fn consumes_map_form_names_create_entities() {
        let rel = relationship(
            "entities: '#Pet'\n\
             consumes:\n\
             \x20 application/json: '#Dog #Cat'\n\
             \x20 application/xml: ['#Bird']",
        );
        let consumes = rel.consumes.unwrap();
        assert_eq!(
            consumes.media_types(),
            vec!["application/json", "application/xml"]
        );
        assert_eq!(
            consumes.create_entities().unwrap(),
            vec!["#Dog", "#Cat", "#Bird"]
        );
    }

    #[test]
    fn property_view_reads_flags_and_relationship() {
        let value: Value = serde_yaml::from_str(
            "type: string\nreadOnly: true\nimplementation_private: true\nrelationship: '#Other'",
        )
        .unwrap();
        let property = Property::new(&value);
        assert_eq!(property.schema_type(), Some("string"));
        assert!(property.read_only());
        assert!(property.implementation_private());
        let rel = property.relationship().unwrap().unwrap();
        assert_eq!(rel.entities, vec!["#Other"]);
    }

    #[test]
    fn non_mapping_property_has_no_members() {
        let value: Value = serde_yaml::from_str("just a string").unwrap();
        let property = Property::new(&value);
        assert!(property.body().is_none());
        assert!(!property.read_only());
        assert!(property.relationship().is_none());
    }
}
