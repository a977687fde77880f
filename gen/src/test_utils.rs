//! Shared test utilities for linkspec-gen tests.
//!
//! These helpers panic on malformed fixtures rather than returning errors:
//! a broken fixture is a test bug, not a runtime condition.

use linkspec_define::SourceSchema;
use serde_yaml::Value;

use crate::expand::{GeneratorOptions, expand};
use crate::output::encode;

/// The canonical fixture: a todo-list API with a well-known URL, a
/// multi-valued relationship, a collection result-set entity, and both
/// collection and selector query paths.
pub const TODO_LIST_SCHEMA: &str = r#"
title: Todo List API
version: '0.1'
conventions:
  error_response:
    type: object
    properties:
      message:
        type: string
entities:
  TodoList:
    well_known_URLs: /to-dos
    query_paths:
      - items
      - items;{id}
    properties:
      items:
        relationship:
          entities: '#Item'
          multiplicity: '1:n'
          multi_valued_relationship_entity: '#ItemCollection'
  ItemCollection:
    readOnly: true
    properties:
      contents:
        type: array
  Item:
    properties:
      id:
        type: string
      description:
        type: string
"#;

/// Parses a source schema fixture.
pub fn parse_schema(yaml: &str) -> SourceSchema {
    SourceSchema::from_yaml_str(yaml).expect("fixture schema must parse")
}

/// Expands a source schema fixture into a document tree.
pub fn expand_schema(yaml: &str, options: GeneratorOptions) -> Value {
    expand(&parse_schema(yaml), options).expect("fixture schema must expand")
}

/// Expands a fixture and encodes it to YAML text.
pub fn expand_to_text(yaml: &str, options: GeneratorOptions) -> String {
    encode(&expand_schema(yaml, options)).expect("document must encode")
}

/// Walks nested mappings by key.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_mapping()?.get(*key)?;
    }
    Some(current)
}

/// The string keys of a mapping value, in order.
pub fn keys_of(value: &Value) -> Vec<String> {
    value
        .as_mapping()
        .map(|map| {
            map.keys()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_list_fixture_parses() {
        let schema = parse_schema(TODO_LIST_SCHEMA);
        assert_eq!(schema.title(), "Todo List API");
        assert_eq!(schema.entities().unwrap().len(), 3);
    }

    #[test]
    fn lookup_walks_nested_mappings() {
        let value: Value = serde_yaml::from_str("a:\n  b:\n    c: 1").unwrap();
        assert!(lookup(&value, &["a", "b", "c"]).is_some());
        assert!(lookup(&value, &["a", "missing"]).is_none());
    }
}
