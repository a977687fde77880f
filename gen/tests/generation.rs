//! End-to-end generation tests: expand source schemas and verify the
//! emitted document structure.

use linkspec_gen::expand::GeneratorOptions;
use linkspec_gen::test_utils::{
    TODO_LIST_SCHEMA, expand_schema, expand_to_text, keys_of, lookup,
};
use serde_yaml::Value;

fn default_doc(yaml: &str) -> Value {
    expand_schema(yaml, GeneratorOptions::default())
}

#[test]
fn todo_list_emits_collection_and_selector_interfaces() {
    let doc = default_doc(TODO_LIST_SCHEMA);

    let well_known = lookup(&doc, &["paths", "/to-dos"]).expect("well-known interface");
    assert_eq!(keys_of(well_known), vec!["get", "patch", "head", "options"]);

    let collection = lookup(&doc, &["paths", "/to-dos/items"]).expect("collection interface");
    assert_eq!(keys_of(collection), vec!["get", "post", "head", "options"]);

    let selector = lookup(&doc, &["paths", "/to-dos/items;{id}"]).expect("selector interface");
    assert_eq!(
        keys_of(selector),
        vec!["parameters", "get", "patch", "delete", "head", "options"]
    );
}

#[test]
fn collection_get_returns_the_element_entity_schema() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    let schema_ref = lookup(
        &doc,
        &["paths", "/to-dos/items", "get", "responses", "200", "schema", "$ref"],
    );
    assert_eq!(
        schema_ref.and_then(Value::as_str),
        Some("#/definitions/ItemCollection")
    );
}

#[test]
fn selector_parameter_is_typed_from_the_discriminator_property() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    let parameters = lookup(&doc, &["paths", "/to-dos/items;{id}", "parameters"])
        .and_then(Value::as_sequence)
        .expect("selector parameters");
    let parameter = parameters[0].as_mapping().unwrap();
    assert_eq!(parameter.get("name").and_then(Value::as_str), Some("id"));
    assert_eq!(parameter.get("in").and_then(Value::as_str), Some("path"));
    assert_eq!(parameter.get("type").and_then(Value::as_str), Some("string"));
    assert_eq!(parameter.get("required").and_then(Value::as_bool), Some(true));
}

#[test]
fn well_known_fixed_resource_is_not_deletable() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    assert!(lookup(&doc, &["paths", "/to-dos", "delete"]).is_none());
}

#[test]
fn readonly_well_known_entity_gets_only_read_methods() {
    let doc = default_doc(
        r#"
entities:
  Config:
    readOnly: true
    well_known_URLs: /config
"#,
    );
    let interface = lookup(&doc, &["paths", "/config"]).expect("config interface");
    assert_eq!(keys_of(interface), vec!["get", "head", "options"]);
}

#[test]
fn immutability_propagates_to_emitted_properties() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    let read_only = lookup(
        &doc,
        &["definitions", "ItemCollection", "properties", "contents", "readOnly"],
    );
    assert_eq!(read_only.and_then(Value::as_bool), Some(true));
}

#[test]
fn error_response_convention_is_injected_first_and_referenced() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    let definitions = lookup(&doc, &["definitions"]).unwrap();
    assert_eq!(
        keys_of(definitions),
        vec!["ErrorResponse", "TodoList", "ItemCollection", "Item"]
    );
    let schema_404 = lookup(&doc, &["responses", "404", "schema", "$ref"]);
    assert_eq!(
        schema_404.and_then(Value::as_str),
        Some("#/definitions/ErrorResponse")
    );
}

#[test]
fn response_catalog_order_is_deterministic() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    let responses = lookup(&doc, &["responses"]).unwrap();
    assert_eq!(
        keys_of(responses),
        vec![
            "401",
            "403",
            "404",
            "406",
            "default",
            "400",
            "409",
            "standard_200",
            "options_200",
            "303"
        ]
    );
}

#[test]
fn generation_is_idempotent() {
    let first = expand_to_text(TODO_LIST_SCHEMA, GeneratorOptions::default());
    let second = expand_to_text(TODO_LIST_SCHEMA, GeneratorOptions::default());
    assert_eq!(first, second);
}

#[test]
fn entity_url_interfaces_land_in_x_uris() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    let uris = lookup(&doc, &["x-uris"]).expect("x-uris section");
    assert_eq!(
        keys_of(uris),
        vec!["{TodoList_URL}", "{ItemCollection_URL}", "{Item_URL}"]
    );
    let parameters = lookup(&doc, &["x-uris", "{Item_URL}", "parameters"])
        .and_then(Value::as_sequence)
        .expect("placeholder parameter");
    let parameter = parameters[0].as_mapping().unwrap();
    assert_eq!(parameter.get("name").and_then(Value::as_str), Some("Item_URL"));
    assert_eq!(parameter.get("in").and_then(Value::as_str), Some("URL"));
}

#[test]
fn x_uris_is_omitted_when_empty() {
    let doc = default_doc(
        r#"
entities:
  Config:
    resource: false
    well_known_URLs: /config
"#,
    );
    assert!(lookup(&doc, &["x-uris"]).is_none());
    assert!(lookup(&doc, &["paths", "/config"]).is_some());
}

#[test]
fn abstract_entities_get_no_entity_url_interface() {
    let doc = default_doc(
        r#"
entities:
  Base:
    abstract: true
  Concrete:
    allOf:
      - $ref: '#Base'
"#,
    );
    let uris = lookup(&doc, &["x-uris"]).expect("x-uris");
    assert_eq!(keys_of(uris), vec!["{Concrete_URL}"]);
}

#[test]
fn implementation_private_property_is_stripped_by_default() {
    let yaml = r#"
entities:
  Order:
    properties:
      total:
        type: number
      shard_key:
        type: string
        implementation_private: true
"#;
    let doc = default_doc(yaml);
    let properties = lookup(&doc, &["definitions", "Order", "properties"]).unwrap();
    assert_eq!(keys_of(properties), vec!["total"]);

    let impl_doc = expand_schema(
        yaml,
        GeneratorOptions {
            include_impl: true,
            ..Default::default()
        },
    );
    let properties = lookup(&impl_doc, &["definitions", "Order", "properties"]).unwrap();
    assert_eq!(keys_of(properties), vec!["total", "shard_key"]);
}

#[test]
fn structured_entities_patch_and_primitive_entities_put() {
    let doc = default_doc(
        r#"
entities:
  Note:
    properties:
      text:
        type: string
  Counter:
    type: integer
    well_known_URLs: /counter
"#,
    );
    // structured: PATCH with the merge-patch media types
    let patch = lookup(&doc, &["x-uris", "{Note_URL}", "patch"]).expect("patch operation");
    let consumes: Vec<&str> = lookup(patch, &["consumes"])
        .and_then(Value::as_sequence)
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        consumes,
        vec!["application/merge-patch+json", "application/json-patch+json"]
    );
    assert!(lookup(&doc, &["x-uris", "{Note_URL}", "put"]).is_none());

    // primitive: PUT with a 201-with-Location create response
    let put = lookup(&doc, &["paths", "/counter", "put"]).expect("put operation");
    assert!(lookup(put, &["responses", "201", "headers", "Location"]).is_some());
    let precondition = lookup(put, &["parameters"])
        .and_then(Value::as_sequence)
        .unwrap()[0]
        .as_mapping()
        .unwrap();
    assert_eq!(
        precondition.get("$ref").and_then(Value::as_str),
        Some("#/parameters/Put-If-Match")
    );
    // the optional precondition header is registered on demand
    assert!(lookup(&doc, &["parameters", "Put-If-Match"]).is_some());
}

#[test]
fn put_if_match_is_absent_when_nothing_puts() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    assert!(lookup(&doc, &["parameters", "Put-If-Match"]).is_none());
    assert_eq!(
        keys_of(lookup(&doc, &["parameters"]).unwrap()),
        vec![
            "If-Match",
            "Accept",
            "Access-Control-Request-Method",
            "Access-Control-Request-Headers"
        ]
    );
}

#[test]
fn polymorphic_relationship_unions_get_and_post_schemas() {
    let doc = default_doc(
        r#"
entities:
  Zoo:
    well_known_URLs: /zoo
    query_paths: animals
    properties:
      animals:
        relationship:
          entities: ['#Dog', '#Cat']
          multiplicity: '1:n'
          multi_valued_relationship_entity: '#AnimalCollection'
  AnimalCollection:
    readOnly: true
  Dog: {}
  Cat: {}
"#,
    );
    let post = lookup(&doc, &["paths", "/zoo/animals", "post"]).expect("post operation");
    let body_schema = lookup(post, &["parameters"])
        .and_then(Value::as_sequence)
        .unwrap()[0]
        .as_mapping()
        .unwrap()
        .get("schema")
        .unwrap();
    let union: Vec<&str> = lookup(body_schema, &["x-oneOf"])
        .and_then(Value::as_sequence)
        .expect("post body union")
        .iter()
        .filter_map(|entry| lookup(entry, &["$ref"]).and_then(Value::as_str))
        .collect();
    assert_eq!(union, vec!["#/definitions/Dog", "#/definitions/Cat"]);
    assert_eq!(
        lookup(post, &["responses", "201", "description"]).and_then(Value::as_str),
        Some("Created new Dog or Cat")
    );
}

#[test]
fn collection_get_merges_query_parameters_through_one_of() {
    let doc = default_doc(
        r#"
entities:
  Library:
    well_known_URLs: /library
    query_paths: media
    properties:
      media:
        relationship:
          entities: '#Media'
          multiplicity: '1:n'
          multi_valued_relationship_entity: '#MediaCollection'
  MediaCollection:
    readOnly: true
    oneOf:
      - $ref: '#Books'
      - $ref: '#Films'
  Books:
    query_parameters:
      - name: author
        type: string
      - name: sort
        type: string
  Films:
    query_parameters:
      - name: director
        type: string
      - name: sort
        type: string
"#,
    );
    let parameters = lookup(&doc, &["paths", "/library/media", "get", "parameters"])
        .and_then(Value::as_sequence)
        .expect("collection query parameters");
    let names: Vec<&str> = parameters
        .iter()
        .filter_map(|parameter| lookup(parameter, &["name"]).and_then(Value::as_str))
        .collect();
    // de-duplicated by name, first occurrence wins
    assert_eq!(names, vec!["author", "sort", "director"]);
    assert!(
        parameters
            .iter()
            .all(|parameter| lookup(parameter, &["in"]).and_then(Value::as_str) == Some("query"))
    );
}

#[test]
fn first_producer_wins_for_a_contested_path() {
    let doc = default_doc(
        r#"
entities:
  Primary:
    readOnly: true
    well_known_URLs: /shared
  Secondary:
    well_known_URLs: /shared
"#,
    );
    // the read-only first declarer produced the interface, so no update verb
    let interface = lookup(&doc, &["paths", "/shared"]).expect("shared interface");
    assert_eq!(keys_of(interface), vec!["get", "head", "options"]);
}

#[test]
fn yaml_merge_mode_emits_merge_directives() {
    let text = expand_to_text(
        TODO_LIST_SCHEMA,
        GeneratorOptions {
            yaml_merge: true,
            ..Default::default()
        },
    );
    assert!(text.contains("<<:"));
    assert!(!text.contains("'<<':"));
}

#[test]
fn inline_mode_has_no_merge_directives() {
    let text = expand_to_text(TODO_LIST_SCHEMA, GeneratorOptions::default());
    assert!(!text.contains("<<"));
}

#[test]
fn media_type_defaults_are_emitted() {
    let doc = default_doc(TODO_LIST_SCHEMA);
    let consumes: Vec<&str> = lookup(&doc, &["consumes"])
        .and_then(Value::as_sequence)
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(consumes, vec!["application/json"]);
}

#[test]
fn entities_without_entities_section_yield_a_bare_skeleton() {
    let doc = default_doc("title: Empty");
    assert_eq!(
        keys_of(&doc),
        vec!["swagger", "info", "consumes", "produces", "definitions", "paths", "parameters", "responses"]
    );
    assert!(keys_of(lookup(&doc, &["responses"]).unwrap()).is_empty());
    assert_eq!(keys_of(lookup(&doc, &["parameters"]).unwrap()).len(), 4);
}
