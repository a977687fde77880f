//! Entity declarations.
//!
//! An entity is a named resource type. Its property bodies are kept as raw
//! ordered mappings: the generator passes them through to the output
//! document, and [`Property`](crate::Property) provides a typed view over
//! the members the engine itself consumes.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;

use crate::property::Property;
use crate::schema::StringOrList;

/// A `$ref`-style reference to another entity, as written in `allOf` and
/// `oneOf` lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRef {
    /// The referenced entity, in `#/entities/<name>` or identifier form.
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// The implementation-private path at which an entity is wired internally.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Implementation {
    /// Path template, may contain `{var}` placeholders.
    pub path: String,
}

/// One declared query path: either a bare pattern string or a pattern with a
/// per-path discriminator separator override.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum QueryPathDecl {
    /// A bare pattern such as `"items;{id}"`.
    Pattern(String),
    /// A pattern with an explicit separator override.
    Configured {
        /// The pattern text.
        segments: String,
        /// Separator joining a segment to its `{param}`, overriding the
        /// document convention for this one path.
        discriminator_separator: Option<String>,
    },
}

impl QueryPathDecl {
    /// The pattern text.
    pub fn segments(&self) -> &str {
        match self {
            QueryPathDecl::Pattern(text) => text,
            QueryPathDecl::Configured { segments, .. } => segments,
        }
    }

    /// The per-path separator override, if declared.
    pub fn separator_override(&self) -> Option<&str> {
        match self {
            QueryPathDecl::Pattern(_) => None,
            QueryPathDecl::Configured {
                discriminator_separator,
                ..
            } => discriminator_separator.as_deref(),
        }
    }
}

/// The declared query paths of one entity.
///
/// Accepts a whitespace-separated string of patterns or a list mixing bare
/// patterns and configured declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPathDecls(Vec<QueryPathDecl>);

impl QueryPathDecls {
    /// The declarations, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &QueryPathDecl> {
        self.0.iter()
    }

    /// Number of declared query paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no query paths were declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for QueryPathDecls {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<QueryPathDecl>),
            Single(QueryPathDecl),
        }

        let decls = match Raw::deserialize(deserializer)? {
            Raw::One(text) => text
                .split_whitespace()
                .map(|pattern| QueryPathDecl::Pattern(pattern.to_string()))
                .collect(),
            Raw::Many(items) => items,
            Raw::Single(decl) => vec![decl],
        };
        Ok(QueryPathDecls(decls))
    }
}

/// A declared resource type.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Entity {
    /// External identifier; references resolve through it in addition to the
    /// generated `#/entities/<name>` form. Defaults to `#<name>`.
    pub id: Option<String>,
    /// Declared JSON-schema type. Entities without one (or with `object`)
    /// are "structured" and updated via PATCH rather than PUT.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    /// Property bodies by name, in declaration order.
    pub properties: Option<Mapping>,
    /// Passed through to the output definition verbatim.
    pub required: Option<Value>,
    /// Parent entity references for inheritance.
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<SchemaRef>>,
    /// Alternative entity references for polymorphic unions.
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<SchemaRef>>,
    /// Abstract entities get no entity-URL interface of their own.
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    /// Whole-entity immutability: suppresses update and delete operations
    /// and forces `readOnly` onto every emitted property.
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
    /// Whether the entity is independently addressable (default true).
    pub resource: Option<bool>,
    /// Fixed paths at which the entity is exposed.
    #[serde(rename = "well_known_URLs")]
    pub well_known_urls: Option<StringOrList>,
    /// Path patterns matched against relationship chains rooted here.
    pub query_paths: Option<QueryPathDecls>,
    /// Media-type override for update request bodies.
    pub consumes: Option<StringOrList>,
    /// Media-type override for response bodies.
    pub produces: Option<StringOrList>,
    /// Query parameter fragments attached to GET operations.
    pub query_parameters: Option<Vec<Mapping>>,
    /// Implementation-private path wiring.
    pub implementation: Option<Implementation>,
}

impl Entity {
    /// Whether the entity is independently addressable.
    pub fn is_resource(&self) -> bool {
        self.resource.unwrap_or(true)
    }

    /// Whether the entity is structured (no primitive `type` declared).
    pub fn is_structured(&self) -> bool {
        self.schema_type.is_none()
    }

    /// Typed view over one property, if declared.
    pub fn property(&self, name: &str) -> Option<Property<'_>> {
        self.properties
            .as_ref()
            .and_then(|map| map.get(name))
            .map(Property::new)
    }

    /// Typed views over all properties, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, Property<'_>)> {
        self.properties
            .iter()
            .flat_map(|map| map.iter())
            .filter_map(|(key, value)| key.as_str().map(|name| (name, Property::new(value))))
    }

    /// Declared well-known URLs, normalized to a list.
    pub fn well_known_urls(&self) -> Vec<String> {
        self.well_known_urls
            .as_ref()
            .map(StringOrList::items)
            .unwrap_or_default()
    }
}

/// The ordered entity map of a source schema.
///
/// Declaration order is an observable contract of the generated output, so
/// the map is kept as an ordered list of `(name, entity)` pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityMap {
    entries: Vec<(String, Entity)>,
}

impl EntityMap {
    /// The entries, in declaration order.
    pub fn entries(&self) -> &[(String, Entity)] {
        &self.entries
    }

    /// Number of declared entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for EntityMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntityMapVisitor;

        impl<'de> Visitor<'de> for EntityMapVisitor {
            type Value = EntityMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping of entity name to entity body")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, entity)) = access.next_entry::<String, Entity>()? {
                    entries.push((name, entity));
                }
                Ok(EntityMap { entries })
            }
        }

        deserializer.deserialize_map(EntityMapVisitor)
    }
}
