//! Path anchors: the prefixes interfaces are emitted under.
//!
//! Three anchor variants exist, modeled as one closed union so builders
//! dispatch on variant rather than inspecting types: fixed well-known URLs,
//! opaque entity-URL placeholders, and implementation-private paths.

use serde_yaml::{Mapping, Value};

use crate::catalog::EntityCatalog;
use crate::errors::GeneratorError;
use crate::expand::{articled, put, text};
use crate::parser::extract_path_params;

/// Description attached to implementation-path interfaces.
pub const IMPLEMENTATION_PATH_DESCRIPTION: &str = "This path is NOT part of the API. It is used \
     in the implementation and may be important to implementation-aware software, such as \
     proxies or specification-driven implementations.";

/// The anchor under which an interface is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum PathPrefix {
    /// A fixed, schema-declared path.
    WellKnown {
        /// The declared URL, kept verbatim as the interface key.
        base_url: String,
        /// Reference form of the anchored entity.
        target_entity: String,
    },
    /// An opaque `{<Name>_URL}` placeholder; interfaces anchored here land
    /// in `x-uris` rather than `paths`.
    EntityUrl {
        /// Reference form of the anchored entity.
        target_entity: String,
    },
    /// An implementation-private path, materialized only when
    /// implementation output is requested.
    Implementation {
        /// The declared implementation path template.
        path: String,
        /// Reference form of the anchored entity.
        target_entity: String,
    },
}

impl PathPrefix {
    /// Reference form of the entity this anchor addresses.
    pub fn target_entity(&self) -> &str {
        match self {
            PathPrefix::WellKnown { target_entity, .. }
            | PathPrefix::EntityUrl { target_entity }
            | PathPrefix::Implementation { target_entity, .. } => target_entity,
        }
    }

    /// Whether interfaces anchored here key the `x-uris` map instead of
    /// `paths`.
    pub fn is_uri_anchor(&self) -> bool {
        matches!(self, PathPrefix::EntityUrl { .. })
    }

    /// The path string contributed by the anchor. Query-path segments are
    /// appended to it with `/`, so a trailing slash is trimmed first.
    pub fn path_segment(&self, catalog: &EntityCatalog) -> Result<String, GeneratorError> {
        match self {
            PathPrefix::WellKnown { base_url, .. } => {
                Ok(base_url.strip_suffix('/').unwrap_or(base_url).to_string())
            }
            PathPrefix::EntityUrl { target_entity } => {
                let name = catalog.entity_name(target_entity, "entity URL anchor")?;
                Ok(format!("{{{name}_URL}}"))
            }
            PathPrefix::Implementation { path, .. } => Ok(path.clone()),
        }
    }

    /// The `x-description` the anchor contributes, if any.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            PathPrefix::Implementation { .. } => Some(IMPLEMENTATION_PATH_DESCRIPTION),
            _ => None,
        }
    }

    /// Path parameters contributed by the anchor itself: `{var}` template
    /// variables for fixed and implementation paths, or the opaque entity
    /// URL placeholder parameter.
    pub fn parameters(&self, catalog: &EntityCatalog) -> Result<Vec<Value>, GeneratorError> {
        match self {
            PathPrefix::WellKnown { base_url, .. } => Ok(template_parameters(base_url)),
            PathPrefix::Implementation { path, .. } => Ok(template_parameters(path)),
            PathPrefix::EntityUrl { target_entity } => {
                let name = catalog.entity_name(target_entity, "entity URL anchor")?;
                let mut parameter = Mapping::new();
                put(&mut parameter, "name", text(&format!("{name}_URL")));
                put(&mut parameter, "in", text("URL"));
                put(&mut parameter, "type", text("string"));
                put(
                    &mut parameter,
                    "description",
                    text(&format!("The URL of {} entity", articled(name))),
                );
                put(&mut parameter, "required", Value::Bool(true));
                Ok(vec![Value::Mapping(parameter)])
            }
        }
    }
}

fn template_parameters(path: &str) -> Vec<Value> {
    extract_path_params(path)
        .into_iter()
        .map(|name| {
            let mut parameter = Mapping::new();
            put(&mut parameter, "name", text(name));
            put(&mut parameter, "in", text("path"));
            put(&mut parameter, "type", text("string"));
            put(&mut parameter, "required", Value::Bool(true));
            Value::Mapping(parameter)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkspec_define::SourceSchema;

    fn schema(yaml: &str) -> SourceSchema {
        SourceSchema::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn well_known_segment_trims_trailing_slash() {
        let schema = schema("entities:\n  Config: {}");
        let catalog = EntityCatalog::from_schema(&schema).unwrap();
        let anchor = PathPrefix::WellKnown {
            base_url: "/config".to_string(),
            target_entity: "#Config".to_string(),
        };
        assert_eq!(anchor.path_segment(&catalog).unwrap(), "/config");

        let root = PathPrefix::WellKnown {
            base_url: "/".to_string(),
            target_entity: "#Config".to_string(),
        };
        assert_eq!(root.path_segment(&catalog).unwrap(), "");
    }

    #[test]
    fn well_known_template_variables_become_parameters() {
        let schema = schema("entities:\n  Shop: {}");
        let catalog = EntityCatalog::from_schema(&schema).unwrap();
        let anchor = PathPrefix::WellKnown {
            base_url: "/shops/{shop_id}".to_string(),
            target_entity: "#Shop".to_string(),
        };
        let parameters = anchor.parameters(&catalog).unwrap();
        assert_eq!(parameters.len(), 1);
        let parameter = parameters[0].as_mapping().unwrap();
        assert_eq!(parameter.get("name").and_then(Value::as_str), Some("shop_id"));
        assert_eq!(parameter.get("in").and_then(Value::as_str), Some("path"));
    }

    #[test]
    fn entity_url_anchor_renders_placeholder_and_parameter() {
        let schema = schema("entities:\n  Order: {}");
        let catalog = EntityCatalog::from_schema(&schema).unwrap();
        let anchor = PathPrefix::EntityUrl {
            target_entity: "#Order".to_string(),
        };
        assert!(anchor.is_uri_anchor());
        assert_eq!(anchor.path_segment(&catalog).unwrap(), "{Order_URL}");
        let parameters = anchor.parameters(&catalog).unwrap();
        let parameter = parameters[0].as_mapping().unwrap();
        assert_eq!(
            parameter.get("name").and_then(Value::as_str),
            Some("Order_URL")
        );
        assert_eq!(parameter.get("in").and_then(Value::as_str), Some("URL"));
        assert_eq!(
            parameter.get("description").and_then(Value::as_str),
            Some("The URL of an Order entity")
        );
    }

    #[test]
    fn implementation_anchor_is_described_and_not_a_uri_anchor() {
        let anchor = PathPrefix::Implementation {
            path: "/impl/orders/{id}".to_string(),
            target_entity: "#Order".to_string(),
        };
        assert!(!anchor.is_uri_anchor());
        assert_eq!(anchor.description(), Some(IMPLEMENTATION_PATH_DESCRIPTION));
    }
}
