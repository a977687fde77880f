//! Output assembly, encoding, and writing.
//!
//! The assembler merges the generation accumulators into the final document
//! tree in its contractual key order; nothing is ever re-sorted, because
//! downstream tooling and diffs depend on stable, declaration-order output.
//! Encoding is block-style YAML with one codec quirk handled here: `<<`
//! merge keys produced in yaml-merge mode must come out unquoted.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use linkspec_define::SourceSchema;
use serde_yaml::{Mapping, Value};

use crate::errors::GeneratorError;
use crate::expand::{put, string_seq, text};

/// The generation accumulators handed to the assembler.
#[derive(Debug, Default)]
pub struct GeneratedParts {
    /// Per-entity definitions, in declaration order.
    pub definitions: Mapping,
    /// Public interfaces keyed by path string.
    pub paths: Mapping,
    /// Interfaces reachable only by entity-URL placeholder.
    pub uris: Mapping,
    /// The shared header-parameter section.
    pub parameters: Mapping,
    /// The lazily populated shared response section.
    pub responses: Mapping,
}

/// Assembles the output document tree.
///
/// Key order is the contract: `swagger`, `info`, `consumes`, `produces`,
/// the security passthroughs when present, `definitions`, `paths`,
/// `x-uris` (omitted entirely when empty), `parameters`, `responses`.
pub fn assemble(schema: &SourceSchema, parts: GeneratedParts) -> Value {
    let mut document = Mapping::new();
    put(&mut document, "swagger", text("2.0"));

    let mut info = Mapping::new();
    put(&mut info, "title", text(schema.title()));
    put(&mut info, "version", text(schema.version()));
    put(&mut document, "info", Value::Mapping(info));

    put(&mut document, "consumes", string_seq(&schema.consumes()));
    put(&mut document, "produces", string_seq(&schema.produces()));
    if let Some(security_definitions) = &schema.security_definitions {
        put(&mut document, "securityDefinitions", security_definitions.clone());
    }
    if let Some(security) = &schema.security {
        put(&mut document, "security", security.clone());
    }

    put(&mut document, "definitions", Value::Mapping(parts.definitions));
    put(&mut document, "paths", Value::Mapping(parts.paths));
    if !parts.uris.is_empty() {
        put(&mut document, "x-uris", Value::Mapping(parts.uris));
    }
    put(&mut document, "parameters", Value::Mapping(parts.parameters));
    put(&mut document, "responses", Value::Mapping(parts.responses));

    Value::Mapping(document)
}

/// Encodes the document as block-style YAML.
///
/// ## Errors
///
/// Returns [`GeneratorError::EncodeError`] when the codec rejects the tree.
pub fn encode(document: &Value) -> Result<String, GeneratorError> {
    let encoded = serde_yaml::to_string(document).map_err(GeneratorError::EncodeError)?;
    Ok(rewrite_merge_keys(encoded))
}

/// Writes the encoded document to a file, or to stdout when no output path
/// was given.
pub fn write(encoded: &str, output: Option<&Path>) -> Result<(), GeneratorError> {
    match output {
        Some(path) => fs::write(path, encoded).map_err(|source| GeneratorError::WriteError {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(encoded.as_bytes())
                .map_err(|source| GeneratorError::WriteError {
                    path: "<stdout>".to_string(),
                    source,
                })
        }
    }
}

/// The codec quotes `<<` map keys to keep them literal strings; merge
/// directives must come out bare to mean merging to YAML consumers.
fn rewrite_merge_keys(encoded: String) -> String {
    encoded.replace("'<<':", "<<:").replace("\"<<\":", "<<:")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_from(yaml: &str) -> SourceSchema {
        SourceSchema::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn skeleton_key_order_is_contractual() {
        let schema = schema_from("title: Pets");
        let document = assemble(&schema, GeneratedParts::default());
        let keys: Vec<&str> = document
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["swagger", "info", "consumes", "produces", "definitions", "paths", "parameters", "responses"]
        );
    }

    #[test]
    fn empty_x_uris_is_omitted_and_nonempty_is_kept() {
        let schema = schema_from("title: Pets");
        let document = assemble(&schema, GeneratedParts::default());
        assert!(document.as_mapping().unwrap().get("x-uris").is_none());

        let mut parts = GeneratedParts::default();
        parts.uris.insert(text("{Pet_URL}"), Value::Mapping(Mapping::new()));
        let document = assemble(&schema, parts);
        assert!(document.as_mapping().unwrap().get("x-uris").is_some());
    }

    #[test]
    fn security_sections_pass_through_in_order() {
        let schema = schema_from(
            "securityDefinitions:\n  key:\n    type: apiKey\nsecurity:\n  - key: []",
        );
        let document = assemble(&schema, GeneratedParts::default());
        let keys: Vec<&str> = document
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        let sec_def = keys.iter().position(|&k| k == "securityDefinitions").unwrap();
        let sec = keys.iter().position(|&k| k == "security").unwrap();
        let definitions = keys.iter().position(|&k| k == "definitions").unwrap();
        assert!(sec_def < sec && sec < definitions);
    }

    #[test]
    fn encode_preserves_insertion_order() {
        let schema = schema_from("title: Zoo");
        let mut parts = GeneratedParts::default();
        parts.definitions.insert(text("Zebra"), Value::Mapping(Mapping::new()));
        parts.definitions.insert(text("Aardvark"), Value::Mapping(Mapping::new()));
        let encoded = encode(&assemble(&schema, parts)).unwrap();
        let zebra = encoded.find("Zebra").unwrap();
        let aardvark = encoded.find("Aardvark").unwrap();
        assert!(zebra < aardvark);
    }

    #[test]
    fn merge_keys_come_out_bare() {
        let mut inner = Mapping::new();
        put(&mut inner, "<<", text("shared"));
        let document = Value::Mapping(inner);
        let encoded = encode(&document).unwrap();
        assert!(encoded.contains("<<:"));
        assert!(!encoded.contains("'<<':"));
    }

    #[test]
    fn write_to_file_round_trips(){
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        write("swagger: '2.0'\n", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "swagger: '2.0'\n");
    }
}
