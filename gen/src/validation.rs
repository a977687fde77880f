//! Structural validation of source schemas.
//!
//! A keyword-table-driven linter, independent of the expansion engine: it
//! consumes the same source document but only reports. Unknown keywords get
//! fuzzy did-you-mean suggestions, shape violations are counted as errors,
//! and scanning always continues - the caller decides pass/fail from the
//! final error count.

use serde_yaml::{Mapping, Value};

use crate::diagnostics::Diagnostics;
use crate::parser::QueryPath;

/// Jaro-Winkler similarity above which an unknown keyword earns a
/// suggestion.
const SIMILARITY_THRESHOLD: f64 = 0.7;

/// JSON-schema primitive types accepted for `type` members.
const SCHEMA_TYPES: &[&str] = &[
    "array", "boolean", "integer", "number", "null", "object", "string",
];

type Check = fn(&mut Validator, key: &str, value: &Value);

static TOP_LEVEL_KEYWORDS: &[(&str, Check)] = &[
    ("title", Validator::check_title),
    ("version", Validator::check_version),
    ("entities", Validator::check_entities),
    ("non_entities", Validator::check_non_entities),
    ("conventions", Validator::check_conventions),
    ("consumes", Validator::check_media_types),
    ("produces", Validator::check_media_types),
    ("securityDefinitions", Validator::check_passthrough),
    ("security", Validator::check_passthrough),
];

static ENTITY_KEYWORDS: &[(&str, Check)] = &[
    ("id", Validator::check_id),
    ("type", Validator::check_schema_type),
    ("properties", Validator::check_properties),
    ("required", Validator::check_required),
    ("allOf", Validator::check_refs),
    ("oneOf", Validator::check_refs),
    ("abstract", Validator::check_boolean),
    ("readOnly", Validator::check_boolean),
    ("resource", Validator::check_boolean),
    ("well_known_URLs", Validator::check_well_known_urls),
    ("query_paths", Validator::check_query_paths),
    ("consumes", Validator::check_media_types),
    ("produces", Validator::check_media_types),
    ("query_parameters", Validator::check_query_parameters),
    ("implementation", Validator::check_implementation),
];

static NON_ENTITY_KEYWORDS: &[(&str, Check)] = &[
    ("id", Validator::check_id),
    ("type", Validator::check_schema_type),
    ("properties", Validator::check_properties),
    ("required", Validator::check_required),
    ("readOnly", Validator::check_boolean),
];

static CONVENTIONS_KEYWORDS: &[(&str, Check)] = &[
    ("selector_location", Validator::check_selector_location),
    ("patch_consumes", Validator::check_media_types),
    ("error_response", Validator::check_error_response),
];

static PROPERTY_KEYWORDS: &[(&str, Check)] = &[
    ("type", Validator::check_schema_type),
    ("format", Validator::check_string),
    ("relationship", Validator::check_relationship),
    ("items", Validator::check_items),
    ("readOnly", Validator::check_boolean),
    ("implementation_private", Validator::check_boolean),
    ("description", Validator::check_string),
];

/// The structural linter.
pub struct Validator {
    diagnostics: Diagnostics,
    checked_id_uniqueness: bool,
    root: Mapping,
}

impl Validator {
    /// Creates a validator reporting against one source file name.
    pub fn new(source_name: impl Into<String>) -> Self {
        Validator {
            diagnostics: Diagnostics::new(source_name),
            checked_id_uniqueness: false,
            root: Mapping::new(),
        }
    }

    /// Decodes and validates source text. Codec rejections (bad YAML,
    /// duplicate mapping keys) are counted as errors naming the cause.
    pub fn validate_str(&mut self, source: &str) -> usize {
        match serde_yaml::from_str::<Value>(source) {
            Ok(document) => self.validate(&document),
            Err(error) => {
                self.diagnostics
                    .error(&format!("failed to decode source schema: {error}"));
                self.error_count()
            }
        }
    }

    /// Validates a decoded source document and returns the error count.
    pub fn validate(&mut self, document: &Value) -> usize {
        match document.as_mapping() {
            Some(map) => {
                self.root = map.clone();
                self.check_keywords(TOP_LEVEL_KEYWORDS, map);
            }
            None => self
                .diagnostics
                .error("source schema must be a YAML mapping"),
        }
        self.error_count()
    }

    /// Errors reported so far.
    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    fn check_keywords(&mut self, table: &[(&str, Check)], map: &Mapping) {
        for (key, value) in map {
            let Some(keyword) = key.as_str() else {
                self.diagnostics.error("keywords must be strings");
                continue;
            };
            match table.iter().find(|(known, _)| *known == keyword) {
                Some((_, check)) => check(self, keyword, value),
                None => {
                    let similar: Vec<&str> = table
                        .iter()
                        .map(|(known, _)| *known)
                        .filter(|known| {
                            strsim::jaro_winkler(keyword, known) > SIMILARITY_THRESHOLD
                        })
                        .collect();
                    if similar.is_empty() {
                        self.diagnostics
                            .info(&format!("unrecognized keyword {keyword}"));
                    } else {
                        self.diagnostics.info(&format!(
                            "unrecognized keyword {keyword} - did you mean {}?",
                            similar.join(" or ")
                        ));
                    }
                }
            }
        }
    }

    fn check_title(&mut self, key: &str, value: &Value) {
        if !value.is_string() {
            self.diagnostics.error(&format!("{key} must be a string"));
        }
    }

    fn check_version(&mut self, key: &str, value: &Value) {
        self.check_title(key, value);
    }

    fn check_string(&mut self, key: &str, value: &Value) {
        if !value.is_string() {
            self.diagnostics.error(&format!("{key} must be a string"));
        }
    }

    fn check_id(&mut self, _key: &str, value: &Value) {
        if !value.is_string() {
            self.diagnostics
                .error(&format!("id must be a string: {value:?}"));
        }
    }

    fn check_boolean(&mut self, key: &str, value: &Value) {
        if !value.is_bool() {
            self.diagnostics
                .error(&format!("{key} must be a boolean: {value:?}"));
        }
    }

    fn check_schema_type(&mut self, _key: &str, value: &Value) {
        let declared = value.as_str();
        if !declared.is_some_and(|name| SCHEMA_TYPES.contains(&name)) {
            self.diagnostics.error(&format!(
                "type must be one of {}: {value:?}",
                SCHEMA_TYPES.join(", ")
            ));
        }
    }

    fn check_entities(&mut self, key: &str, value: &Value) {
        if !self.checked_id_uniqueness {
            self.check_id_uniqueness();
        }
        self.check_entity_map(key, value, ENTITY_KEYWORDS);
    }

    fn check_non_entities(&mut self, key: &str, value: &Value) {
        if !self.checked_id_uniqueness {
            self.check_id_uniqueness();
        }
        self.check_entity_map(key, value, NON_ENTITY_KEYWORDS);
    }

    fn check_entity_map(&mut self, key: &str, value: &Value, table: &[(&str, Check)]) {
        let Some(entities) = value.as_mapping() else {
            self.diagnostics.error(&format!("{key} must be a map"));
            return;
        };
        for (name, body) in entities {
            match body.as_mapping() {
                Some(body) => self.check_keywords(table, body),
                None => self
                    .diagnostics
                    .error(&format!("entity {name:?} must be a map")),
            }
        }
    }

    fn check_conventions(&mut self, _key: &str, value: &Value) {
        match value.as_mapping() {
            Some(conventions) => self.check_keywords(CONVENTIONS_KEYWORDS, conventions),
            None => self.diagnostics.error("conventions must be a map"),
        }
    }

    fn check_selector_location(&mut self, _key: &str, value: &Value) {
        let declared = value.as_str();
        if !declared.is_some_and(|name| name == "path-segment" || name == "path-parameter") {
            self.diagnostics.error(&format!(
                "{value:?} must be either the string \"path-segment\" or \"path-parameter\""
            ));
        }
    }

    fn check_error_response(&mut self, key: &str, value: &Value) {
        if !value.is_mapping() {
            self.diagnostics.error(&format!("{key} must be a map"));
        }
    }

    fn check_media_types(&mut self, key: &str, value: &Value) {
        let well_formed = match value {
            Value::String(_) => true,
            Value::Sequence(items) => items.iter().all(Value::is_string),
            _ => false,
        };
        if !well_formed {
            self.diagnostics
                .error(&format!("{key} must be a string or an array of strings"));
        }
    }

    fn check_passthrough(&mut self, _key: &str, _value: &Value) {}

    fn check_required(&mut self, key: &str, value: &Value) {
        let well_formed = match value {
            Value::Sequence(items) => items.iter().all(Value::is_string),
            _ => false,
        };
        if !well_formed {
            self.diagnostics
                .error(&format!("{key} must be an array of property names"));
        }
    }

    fn check_refs(&mut self, key: &str, value: &Value) {
        let Some(refs) = value.as_sequence() else {
            self.diagnostics
                .error(&format!("{key} must be an array of $ref objects"));
            return;
        };
        for entry in refs {
            let reference = entry
                .as_mapping()
                .and_then(|map| map.get("$ref"))
                .and_then(Value::as_str);
            if reference.is_none() {
                self.diagnostics
                    .error(&format!("{key} entries must be objects with a $ref string"));
            }
        }
    }

    fn check_properties(&mut self, key: &str, value: &Value) {
        let Some(properties) = value.as_mapping() else {
            self.diagnostics.error(&format!("{key} must be a map"));
            return;
        };
        for (name, body) in properties {
            match body.as_mapping() {
                Some(body) => self.check_keywords(PROPERTY_KEYWORDS, body),
                None => self
                    .diagnostics
                    .error(&format!("property {name:?} must be a map")),
            }
        }
    }

    fn check_relationship(&mut self, key: &str, value: &Value) {
        let well_formed = match value {
            Value::String(_) => true,
            Value::Sequence(items) => items.iter().all(Value::is_string),
            Value::Mapping(map) => map.contains_key("entities"),
            _ => false,
        };
        if !well_formed {
            self.diagnostics.error(&format!(
                "{key} must be an entity reference, a list of them, or a map with an 'entities' member"
            ));
        }
    }

    fn check_items(&mut self, _key: &str, _value: &Value) {
        self.diagnostics.info("items not yet validated");
    }

    fn check_well_known_urls(&mut self, key: &str, value: &Value) {
        let urls: Vec<String> = match value {
            Value::String(text) => text.split_whitespace().map(str::to_string).collect(),
            Value::Sequence(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => {
                self.diagnostics
                    .error(&format!("{key} must be a string or an array: {value:?}"));
                return;
            }
        };
        for url in urls {
            if !url.starts_with('/') || url.contains("://") {
                self.diagnostics.error(&format!(
                    "well_known_URLs must begin with a single slash: {url}"
                ));
            }
        }
    }

    fn check_query_paths(&mut self, key: &str, value: &Value) {
        let declared: Result<linkspec_define::QueryPathDecls, _> =
            serde_yaml::from_value(value.clone());
        match declared {
            Ok(declared) => {
                for decl in declared.iter() {
                    if let Err(error) = QueryPath::parse(decl, ';') {
                        self.diagnostics.error(&error.to_string());
                    }
                }
            }
            Err(_) => self.diagnostics.error(&format!(
                "{key} must be a pattern string or a list of patterns"
            )),
        }
    }

    fn check_query_parameters(&mut self, key: &str, value: &Value) {
        let well_formed = match value {
            Value::Sequence(items) => items.iter().all(Value::is_mapping),
            _ => false,
        };
        if !well_formed {
            self.diagnostics
                .error(&format!("{key} must be an array of parameter objects"));
        }
    }

    fn check_implementation(&mut self, key: &str, value: &Value) {
        let path = value
            .as_mapping()
            .and_then(|map| map.get("path"))
            .and_then(Value::as_str);
        if path.is_none() {
            self.diagnostics
                .error(&format!("{key} must be a map with a 'path' string"));
        }
    }

    /// Advisory pass over declared identifiers: duplicates within a section
    /// are informational, an identifier declared both as an entity and a
    /// non-entity is an error.
    fn check_id_uniqueness(&mut self) {
        self.checked_id_uniqueness = true;
        let root = self.root.clone();

        let mut entity_ids: Vec<String> = Vec::new();
        for (name, body) in section(&root, "entities") {
            let id = declared_id(&name, &body);
            if entity_ids.contains(&id) {
                self.diagnostics.info(&format!(
                    "information about {id} is provided in multiple places - is this what you meant?"
                ));
            } else {
                entity_ids.push(id);
            }
        }

        let mut non_entity_ids: Vec<String> = Vec::new();
        for (name, body) in section(&root, "non_entities") {
            let id = declared_id(&name, &body);
            if non_entity_ids.contains(&id) {
                self.diagnostics.info(&format!(
                    "information about {id} is provided in multiple places - is this what you meant?"
                ));
            }
            if entity_ids.contains(&id) {
                self.diagnostics.error(&format!(
                    "{id} is declared to be both an entity and a non_entity. It cannot be both"
                ));
            } else {
                non_entity_ids.push(id);
            }
        }
    }
}

fn section(root: &Mapping, key: &str) -> Vec<(String, Value)> {
    root.get(key)
        .and_then(Value::as_mapping)
        .map(|map| {
            map.iter()
                .filter_map(|(name, body)| {
                    name.as_str().map(|name| (name.to_string(), body.clone()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn declared_id(name: &str, body: &Value) -> String {
    body.as_mapping()
        .and_then(|map| map.get("id"))
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(yaml: &str) -> usize {
        Validator::new("test.yaml").validate_str(yaml)
    }

    #[test]
    fn minimal_valid_schema_passes() {
        let count = errors(
            "title: Todo List API\n\
             version: '0.1'\n\
             entities:\n\
             \x20 TodoList:\n\
             \x20   well_known_URLs: /to-dos\n\
             \x20   properties:\n\
             \x20     items:\n\
             \x20       relationship:\n\
             \x20         entities: '#Item'\n\
             \x20 Item:\n\
             \x20   properties:\n\
             \x20     id:\n\
             \x20       type: string\n",
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn non_mapping_document_is_an_error() {
        assert_eq!(errors("- just\n- a\n- list"), 1);
    }

    #[test]
    fn undecodable_document_is_an_error() {
        assert_eq!(errors("a: 1\na: 2"), 1);
    }

    #[test]
    fn non_string_title_is_an_error() {
        assert_eq!(errors("title: 17"), 1);
    }

    #[test]
    fn boolean_flags_are_type_checked() {
        assert_eq!(errors("entities:\n  Pet:\n    readOnly: 'yes'"), 1);
    }

    #[test]
    fn unknown_property_type_is_an_error() {
        assert_eq!(
            errors("entities:\n  Pet:\n    properties:\n      age:\n        type: int"),
            1
        );
    }

    #[test]
    fn relative_well_known_url_is_an_error() {
        assert_eq!(errors("entities:\n  Config:\n    well_known_URLs: config"), 1);
        assert_eq!(
            errors("entities:\n  Config:\n    well_known_URLs: 'http://x/config'"),
            1
        );
    }

    #[test]
    fn malformed_query_path_is_an_error() {
        assert_eq!(
            errors("entities:\n  Pet:\n    query_paths: 'toys;{}'"),
            1
        );
    }

    #[test]
    fn invalid_selector_location_is_an_error() {
        assert_eq!(errors("conventions:\n  selector_location: inline"), 1);
    }

    #[test]
    fn unknown_keywords_are_informational_not_errors() {
        assert_eq!(errors("titel: Pets"), 0);
        assert_eq!(errors("entities:\n  Pet:\n    query_pathz: items"), 0);
    }

    #[test]
    fn entity_and_non_entity_id_collision_is_an_error() {
        let count = errors("entities:\n  Pet: {}\nnon_entities:\n  Pet: {}");
        assert_eq!(count, 1);
    }

    #[test]
    fn errors_accumulate_across_the_document() {
        let count = errors(
            "title: 17\n\
             version: 17\n\
             entities:\n\
             \x20 Pet:\n\
             \x20   readOnly: 3\n",
        );
        assert_eq!(count, 3);
    }

    #[test]
    fn similar_keywords_are_suggested() {
        // "titel" is close enough to "title" to clear the threshold
        assert!(strsim::jaro_winkler("titel", "title") > SIMILARITY_THRESHOLD);
        // and an unrelated word is not
        assert!(strsim::jaro_winkler("zzz", "title") < SIMILARITY_THRESHOLD);
    }
}
