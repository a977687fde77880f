//! The expansion engine.
//!
//! [`Generator`] owns everything one run needs: the entity catalog, the
//! resolved conventions, and the ordered output accumulators (definitions,
//! paths, x-uris, and the shared response/parameter catalogs). It is built
//! once per run and threaded through every builder; there is no ambient
//! state.
//!
//! ## Modules
//!
//! - [`matcher`] - query-path traversal over the relationship graph
//! - [`entity`] - singleton interface assembly
//! - [`collection`] - collection interface assembly
//! - [`prefix`] - the path anchors interfaces are emitted under

pub mod collection;
pub mod entity;
pub mod matcher;
pub mod prefix;

use linkspec_define::SourceSchema;
use serde_yaml::{Mapping, Value};

use crate::catalog::EntityCatalog;
use crate::errors::GeneratorError;
use crate::output::{self, GeneratedParts};
use crate::parser::QueryPath;
use crate::relationships::RelationshipEdge;
use crate::responses::{ParameterCatalog, ResponseCatalog, StandardKits};

use self::prefix::PathPrefix;

/// Description attached to selector parameters contributed by private edges.
const PRIVATE_PARAMETER_DESCRIPTION: &str =
    "This parameter is a private part of the implementation. It is not part of the API";

/// Recognized generation flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOptions {
    /// Emit `<<` merge directives referencing shared bodies instead of
    /// inlining them.
    pub yaml_merge: bool,
    /// Permit native aliasing in the encoded output. Accepted for
    /// compatibility; the codec always writes full duplication.
    pub yaml_alias: bool,
    /// Include implementation-private paths and properties, and anchor
    /// query paths at implementation paths instead of entity URLs.
    pub include_impl: bool,
    /// Omit descriptive `x-description` annotation fields.
    pub suppress_annotations: bool,
}

/// One expansion run: source schema in, output document tree out.
pub struct Generator<'a> {
    pub(crate) schema: &'a SourceSchema,
    pub(crate) options: GeneratorOptions,
    pub(crate) catalog: EntityCatalog<'a>,
    pub(crate) separator: char,
    pub(crate) patch_consumes: Vec<String>,
    pub(crate) definitions: Mapping,
    pub(crate) paths: Mapping,
    pub(crate) uris: Mapping,
    pub(crate) responses: ResponseCatalog,
    pub(crate) parameters: ParameterCatalog,
}

/// Expands a source schema into a Swagger 2.0 document tree.
///
/// ## Errors
///
/// Any configuration error (unresolved reference, malformed or unmatched
/// query path, missing collection element, ...) aborts the run; no partial
/// document is returned.
pub fn expand(schema: &SourceSchema, options: GeneratorOptions) -> Result<Value, GeneratorError> {
    Generator::new(schema, options)?.generate()
}

impl<'a> Generator<'a> {
    /// Builds the generation context: catalog, conventions, and empty
    /// output accumulators.
    pub fn new(schema: &'a SourceSchema, options: GeneratorOptions) -> Result<Self, GeneratorError> {
        let mut catalog = EntityCatalog::from_schema(schema)?;
        let mut definitions = Mapping::new();
        let mut error_schema = Value::Mapping(Mapping::new());
        if schema.entities.is_some() {
            if let Some(error_response) = &schema.conventions.error_response {
                definitions.insert(text("ErrorResponse"), error_response.clone());
                catalog.register_alias("#ErrorResponse", "ErrorResponse");
                error_schema = json_ref("#/definitions/ErrorResponse");
            }
        }
        Ok(Generator {
            schema,
            options,
            catalog,
            separator: schema.conventions.discriminator_separator(),
            patch_consumes: schema.conventions.patch_consumes(),
            definitions,
            paths: Mapping::new(),
            uris: Mapping::new(),
            responses: ResponseCatalog::new(error_schema),
            parameters: ParameterCatalog::new(),
        })
    }

    /// Runs the expansion and assembles the output document.
    pub fn generate(mut self) -> Result<Value, GeneratorError> {
        if self.schema.entities.is_some() {
            self.build_definitions()?;
            let kits = StandardKits::build(&mut self.responses, &self.parameters);
            self.build_paths(&kits)?;
        }
        Ok(output::assemble(
            self.schema,
            GeneratedParts {
                definitions: self.definitions,
                paths: self.paths,
                uris: self.uris,
                parameters: self.parameters.into_emitted(),
                responses: self.responses.into_emitted(),
            },
        ))
    }

    /// Emits one definition per entity, in declaration order.
    ///
    /// Implementation-private properties are stripped unless implementation
    /// output is requested; immutable entities force `readOnly` onto every
    /// emitted property; `allOf`/`oneOf` references are rewritten to
    /// `#/definitions/...` pointers.
    fn build_definitions(&mut self) -> Result<(), GeneratorError> {
        for (name, entity) in self.catalog.entries() {
            let context = format!("entity '{name}'");
            let mut definition = Mapping::new();

            if let Some(parents) = &entity.all_of {
                let mut refs = Vec::with_capacity(parents.len());
                for parent in parents {
                    refs.push(json_ref(&self.catalog.definition_ref(&parent.reference, &context)?));
                }
                put(&mut definition, "allOf", Value::Sequence(refs));
            }
            if let Some(alternatives) = &entity.one_of {
                let mut refs = Vec::with_capacity(alternatives.len());
                for alternative in alternatives {
                    refs.push(json_ref(
                        &self.catalog.definition_ref(&alternative.reference, &context)?,
                    ));
                }
                put(&mut definition, "x-oneOf", Value::Sequence(refs));
            }

            let object_like = entity
                .schema_type
                .as_deref()
                .is_none_or(|declared| declared == "object");
            if object_like {
                if let Some(properties) = &entity.properties {
                    let mut emitted = Mapping::new();
                    for (property_key, body) in properties {
                        let view = linkspec_define::Property::new(body);
                        if view.implementation_private() && !self.options.include_impl {
                            continue;
                        }
                        let mut body = body.clone();
                        if entity.read_only {
                            if let Value::Mapping(fragment) = &mut body {
                                fragment.insert(text("readOnly"), Value::Bool(true));
                            }
                        }
                        emitted.insert(property_key.clone(), body);
                    }
                    put(&mut definition, "properties", Value::Mapping(emitted));
                }
                if let Some(required) = &entity.required {
                    put(&mut definition, "required", required.clone());
                }
            }
            if let Some(declared) = &entity.schema_type {
                put(&mut definition, "type", text(declared));
            }

            self.definitions.insert(text(name), Value::Mapping(definition));
        }
        Ok(())
    }

    /// Emits every interface each entity implies: well-known URL
    /// interfaces, entity-URL (or implementation-path) interfaces, and
    /// query-path interfaces matched against the relationship graph.
    fn build_paths(&mut self, kits: &StandardKits) -> Result<(), GeneratorError> {
        for (name, entity) in self.catalog.entries() {
            let entity_ref = format!("#{name}");

            for url in entity.well_known_urls() {
                let anchor = PathPrefix::WellKnown {
                    base_url: url.clone(),
                    target_entity: entity_ref.clone(),
                };
                if !self.paths.contains_key(url.as_str()) {
                    let interface = self.build_entity_interface(&anchor, None, &[], kits)?;
                    self.paths.insert(text(&url), interface);
                }
            }

            let edges =
                crate::relationships::extract_relationships(&entity_ref, name, entity)?;

            if self.options.include_impl {
                if let Some(implementation) = &entity.implementation {
                    let anchor = PathPrefix::Implementation {
                        path: implementation.path.clone(),
                        target_entity: entity_ref.clone(),
                    };
                    // Entities sharing one implementation path respond
                    // polymorphically at it.
                    let candidates: Vec<String> = self
                        .catalog
                        .entries()
                        .iter()
                        .filter(|(_, other)| {
                            other
                                .implementation
                                .as_ref()
                                .is_some_and(|i| i.path == implementation.path)
                        })
                        .map(|(other_name, _)| format!("#{other_name}"))
                        .collect();
                    let segment = anchor.path_segment(&self.catalog)?;
                    if !self.paths.contains_key(segment.as_str()) {
                        let interface =
                            self.build_entity_interface(&anchor, None, &candidates, kits)?;
                        self.paths.insert(text(&segment), interface);
                    }
                }
            } else if !entity.is_abstract && entity.is_resource() {
                let anchor = PathPrefix::EntityUrl {
                    target_entity: entity_ref.clone(),
                };
                let segment = anchor.path_segment(&self.catalog)?;
                if !self.uris.contains_key(segment.as_str()) {
                    let interface = self.build_entity_interface(&anchor, None, &[], kits)?;
                    self.uris.insert(text(&segment), interface);
                }
            }

            self.build_query_paths(name, entity, &entity_ref, &edges, kits)?;
        }
        Ok(())
    }

    /// Path parameters for one interface: the anchor's own parameters plus
    /// one typed parameter per selector segment of the matched query path.
    pub(crate) fn build_parameters(
        &self,
        anchor: &PathPrefix,
        query: Option<(&QueryPath, &[RelationshipEdge])>,
    ) -> Result<Vec<Value>, GeneratorError> {
        let mut parameters = anchor.parameters(&self.catalog)?;
        let Some((query_path, stack)) = query else {
            return Ok(parameters);
        };
        for (segment, edge) in query_path.segments.iter().zip(stack) {
            let (Some(parameter_name), Some(discriminator)) =
                (&segment.parameter_name, &segment.discriminator_property)
            else {
                continue;
            };
            let context = format!("query path '{}'", query_path.source());
            let property = self
                .catalog
                .resolve_property(&edge.target_entity, discriminator, &context)?
                .ok_or_else(|| GeneratorError::DiscriminatorNotFound {
                    property: discriminator.clone(),
                    entity: edge.target_entity.clone(),
                })?;
            let type_name =
                property
                    .schema_type()
                    .ok_or_else(|| GeneratorError::DiscriminatorUntyped {
                        property: discriminator.clone(),
                        entity: edge.target_entity.clone(),
                    })?;
            let mut parameter = Mapping::new();
            put(&mut parameter, "name", text(parameter_name));
            put(&mut parameter, "in", text("path"));
            put(&mut parameter, "type", text(type_name));
            put(&mut parameter, "required", Value::Bool(true));
            if edge.private {
                put(
                    &mut parameter,
                    "description",
                    text(PRIVATE_PARAMETER_DESCRIPTION),
                );
            }
            parameters.push(Value::Mapping(parameter));
        }
        Ok(parameters)
    }
}

// Ordered-tree building helpers shared by the expansion modules.

/// A string key or scalar for the output tree.
pub(crate) fn text(value: &str) -> Value {
    Value::String(value.to_string())
}

/// `{"$ref": target}`
pub(crate) fn json_ref(target: &str) -> Value {
    let mut reference = Mapping::with_capacity(1);
    reference.insert(text("$ref"), text(target));
    Value::Mapping(reference)
}

/// Inserts a string-keyed member, preserving insertion order.
pub(crate) fn put(map: &mut Mapping, name: &str, value: Value) {
    map.insert(text(name), value);
}

/// A sequence of strings.
pub(crate) fn string_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|item| text(item)).collect())
}

/// Merges a shared body into a target map: inlined member by member, or as
/// a `<<` merge directive in yaml-merge mode.
pub(crate) fn merge_into(target: &mut Mapping, body: &Value, yaml_merge: bool) {
    if yaml_merge {
        put(target, "<<", body.clone());
    } else if let Some(members) = body.as_mapping() {
        for (member_key, member_value) in members {
            target.insert(member_key.clone(), member_value.clone());
        }
    }
}

/// `"a"` or `"an"`, by the first letter of the name.
pub(crate) fn article(name: &str) -> &'static str {
    let first = name.chars().next().map(|c| c.to_ascii_lowercase());
    match first {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// The name with its indefinite article: `"an Order"`, `"a Pet"`.
pub(crate) fn articled(name: &str) -> String {
    format!("{} {}", article(name), name)
}
