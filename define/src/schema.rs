//! Top-level source-schema document types.
//!
//! A source schema is a YAML mapping with a handful of recognized top-level
//! keys. Everything the generator does not understand is ignored here; the
//! structural validator in `linkspec-gen` is responsible for flagging it.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::conventions::Conventions;
use crate::entity::EntityMap;

/// A value that may be written as a single string or as a list of strings.
///
/// The source-schema grammar allows list-valued keys (`consumes`,
/// `produces`, `well_known_URLs`, relationship `entities`, ...) to be given
/// as one whitespace-separated string. [`StringOrList::items`] normalizes
/// both forms to a list.
///
/// ## Examples
///
/// ```
/// use linkspec_define::StringOrList;
///
/// let one: StringOrList = serde_yaml::from_str("application/json").unwrap();
/// assert_eq!(one.items(), vec!["application/json"]);
///
/// let split: StringOrList = serde_yaml::from_str("'/config /settings'").unwrap();
/// assert_eq!(split.items(), vec!["/config", "/settings"]);
///
/// let many: StringOrList = serde_yaml::from_str("[a, b]").unwrap();
/// assert_eq!(many.items(), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    /// A single string, split on whitespace when listed.
    One(String),
    /// An explicit list of strings.
    Many(Vec<String>),
}

impl StringOrList {
    /// Returns the normalized list form.
    pub fn items(&self) -> Vec<String> {
        match self {
            StringOrList::One(text) => text.split_whitespace().map(str::to_string).collect(),
            StringOrList::Many(items) => items.clone(),
        }
    }
}

/// A complete linkspec source document.
///
/// Order matters: the entity map preserves declaration order, and the
/// generator emits definitions and paths in that order.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSchema {
    /// Document title, defaulting to `"untitled"`.
    pub title: Option<String>,
    /// Document version, defaulting to `"initial"`.
    pub version: Option<String>,
    /// Generation conventions (discriminator separator, patch media types,
    /// shared error response schema).
    #[serde(default)]
    pub conventions: Conventions,
    /// Default request media types, defaulting to `application/json`.
    pub consumes: Option<StringOrList>,
    /// Default response media types, defaulting to `application/json`.
    pub produces: Option<StringOrList>,
    /// Passed through to the output document verbatim.
    #[serde(rename = "securityDefinitions")]
    pub security_definitions: Option<Value>,
    /// Passed through to the output document verbatim.
    pub security: Option<Value>,
    /// Declared entities, in declaration order.
    pub entities: Option<EntityMap>,
}

impl SourceSchema {
    /// Decodes a source schema from YAML text.
    ///
    /// ## Errors
    ///
    /// Returns the codec error when the document is not valid YAML, contains
    /// duplicate mapping keys, or an entity body does not fit the schema
    /// grammar.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// The document title, or its default.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("untitled")
    }

    /// The document version, or its default.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("initial")
    }

    /// Request media types, or the `application/json` default.
    pub fn consumes(&self) -> Vec<String> {
        media_types(self.consumes.as_ref())
    }

    /// Response media types, or the `application/json` default.
    pub fn produces(&self) -> Vec<String> {
        media_types(self.produces.as_ref())
    }

    /// The declared entities in declaration order, if any.
    pub fn entities(&self) -> Option<&[(String, crate::entity::Entity)]> {
        self.entities.as_ref().map(|map| map.entries())
    }
}

fn media_types(declared: Option<&StringOrList>) -> Vec<String> {
    declared.map_or_else(|| vec!["application/json".to_string()], StringOrList::items)
}
