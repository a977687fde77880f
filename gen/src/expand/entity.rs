//! Singleton interface assembly.
//!
//! A singleton interface addresses one entity at one path: GET always, an
//! update operation (PATCH for structured entities, PUT otherwise) unless
//! the entity is immutable, DELETE unless the entity is immutable or fixed
//! at a well-known URL, and HEAD/OPTIONS from the shared method catalog.

use linkspec_define::StringOrList;
use serde_yaml::{Mapping, Value};

use crate::errors::GeneratorError;
use crate::expand::prefix::{IMPLEMENTATION_PATH_DESCRIPTION, PathPrefix};
use crate::expand::{Generator, articled, json_ref, merge_into, put, string_seq, text};
use crate::parser::QueryPath;
use crate::relationships::RelationshipEdge;
use crate::responses::StandardKits;

impl Generator<'_> {
    /// Assembles the operation map for one entity at one anchor.
    ///
    /// `query` carries the matched query path and its edge chain when the
    /// interface was reached through the relationship graph. `candidates`
    /// widens the 200 response to a tagged union when several entities
    /// answer at the same path (shared implementation paths).
    pub(crate) fn build_entity_interface(
        &mut self,
        anchor: &PathPrefix,
        query: Option<(&QueryPath, &[RelationshipEdge])>,
        candidates: &[String],
        kits: &StandardKits,
    ) -> Result<Value, GeneratorError> {
        let subject_ref = query
            .and_then(|(_, stack)| stack.last())
            .map(|edge| edge.target_entity.as_str())
            .unwrap_or_else(|| anchor.target_entity());
        let (subject_name, subject) = self.catalog.resolve(subject_ref, "interface assembly")?;
        let context = format!("entity '{subject_name}'");

        let consumes = subject.consumes.as_ref().map(StringOrList::items);
        let produces = subject.produces.as_ref().map(StringOrList::items);
        let structured = subject.is_structured();

        // The 200 body shared by GET, the update operation, and DELETE.
        let mut ok_response = Mapping::new();
        let schema = if candidates.len() > 1 {
            let mut refs = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                refs.push(json_ref(&self.catalog.definition_ref(candidate, &context)?));
            }
            let mut union = Mapping::new();
            put(&mut union, "x-oneOf", Value::Sequence(refs));
            Value::Mapping(union)
        } else {
            json_ref(&self.catalog.definition_ref(subject_ref, &context)?)
        };
        put(&mut ok_response, "schema", schema);
        merge_into(
            &mut ok_response,
            &self.responses.body("standard_200"),
            self.options.yaml_merge,
        );
        let ok_response = Value::Mapping(ok_response);

        let mut interface = Mapping::new();
        let is_private = query.is_some_and(|(_, stack)| stack.iter().any(|edge| edge.private));
        if is_private {
            put(&mut interface, "x-private", Value::Bool(true));
        }
        let annotation = if is_private {
            Some(IMPLEMENTATION_PATH_DESCRIPTION)
        } else {
            anchor.description()
        };
        if let Some(annotation) = annotation {
            if !self.options.suppress_annotations {
                put(&mut interface, "x-description", text(annotation));
            }
        }

        let path_parameters = self.build_parameters(anchor, query)?;
        if !path_parameters.is_empty() {
            put(&mut interface, "parameters", Value::Sequence(path_parameters));
        }

        // GET
        let mut get = Mapping::new();
        put(
            &mut get,
            "description",
            text(&format!("Retrieve {}", articled(subject_name))),
        );
        match &subject.query_parameters {
            Some(query_parameters) => {
                put(&mut get, "parameters", query_parameter_seq(query_parameters));
            }
            None => {
                put(
                    &mut get,
                    "parameters",
                    Value::Sequence(vec![self.parameters.reference("Accept")]),
                );
            }
        }
        if let Some(produces) = &produces {
            put(&mut get, "produces", string_seq(produces));
        }
        let mut get_responses = Mapping::new();
        put(&mut get_responses, "200", ok_response.clone());
        merge_into(&mut get_responses, &kits.sets.entity_get, self.options.yaml_merge);
        put(&mut get, "responses", Value::Mapping(get_responses));
        put(&mut interface, "get", Value::Mapping(get));

        // PATCH or PUT
        if !subject.read_only {
            let schema_ref = json_ref(&self.catalog.definition_ref(subject_ref, &context)?);
            let (verb, description, precondition, body_description) = if structured {
                (
                    "patch",
                    format!("Update {} entity", articled(subject_name)),
                    self.parameters.reference("If-Match"),
                    format!("The subset of properties of the {subject_name} being updated"),
                )
            } else {
                self.parameters.define_put_if_match();
                (
                    "put",
                    format!("Create or Update {} entity", articled(subject_name)),
                    self.parameters.reference("Put-If-Match"),
                    format!("The representation of the {subject_name} being replaced"),
                )
            };

            let mut operation = Mapping::new();
            put(&mut operation, "description", text(&description));
            let mut body_parameter = Mapping::new();
            put(&mut body_parameter, "name", text("body"));
            put(&mut body_parameter, "in", text("body"));
            put(&mut body_parameter, "description", text(&body_description));
            put(&mut body_parameter, "schema", schema_ref.clone());
            put(
                &mut operation,
                "parameters",
                Value::Sequence(vec![precondition, Value::Mapping(body_parameter)]),
            );
            if structured {
                put(&mut operation, "consumes", string_seq(&self.patch_consumes));
            } else if let Some(consumes) = &consumes {
                put(&mut operation, "consumes", string_seq(consumes));
            }
            if let Some(produces) = &produces {
                put(&mut operation, "produces", string_seq(produces));
            }

            let mut responses = Mapping::new();
            put(&mut responses, "200", ok_response.clone());
            if !structured {
                // PUT may create the resource it addresses.
                let mut created = Mapping::new();
                put(
                    &mut created,
                    "description",
                    text(&format!("Created new {subject_name}")),
                );
                put(&mut created, "schema", schema_ref);
                let mut location = Mapping::new();
                put(&mut location, "type", text("string"));
                put(
                    &mut location,
                    "description",
                    text(&format!("perma-link URL of newly-created {subject_name}")),
                );
                let mut headers = Mapping::new();
                put(&mut headers, "Location", Value::Mapping(location));
                put(&mut created, "headers", Value::Mapping(headers));
                put(&mut responses, "201", Value::Mapping(created));
            }
            merge_into(&mut responses, &kits.sets.put_patch, self.options.yaml_merge);
            put(&mut operation, "responses", Value::Mapping(responses));
            put(&mut interface, verb, Value::Mapping(operation));
        }

        // DELETE: fixed resources and immutable entities are not deletable.
        if subject.well_known_urls.is_none() && !subject.read_only {
            let mut delete = Mapping::new();
            put(
                &mut delete,
                "description",
                text(&format!("Delete {}", articled(subject_name))),
            );
            if let Some(produces) = &produces {
                put(&mut delete, "produces", string_seq(produces));
            }
            let mut responses = Mapping::new();
            put(&mut responses, "200", ok_response.clone());
            merge_into(&mut responses, &kits.sets.delete, self.options.yaml_merge);
            put(&mut delete, "responses", Value::Mapping(responses));
            put(&mut interface, "delete", Value::Mapping(delete));
        }

        // HEAD / OPTIONS
        let mut head = Mapping::new();
        put(&mut head, "description", text("Retrieve HEAD"));
        merge_into(&mut head, &kits.methods.head, self.options.yaml_merge);
        put(&mut interface, "head", Value::Mapping(head));

        let mut options = Mapping::new();
        put(&mut options, "description", text("Retrieve OPTIONS"));
        merge_into(&mut options, &kits.methods.options, self.options.yaml_merge);
        put(&mut interface, "options", Value::Mapping(options));

        Ok(Value::Mapping(interface))
    }
}

/// Declared query parameter fragments, each emitted with `in: query`.
pub(crate) fn query_parameter_seq(fragments: &[Mapping]) -> Value {
    Value::Sequence(
        fragments
            .iter()
            .map(|fragment| {
                let mut parameter = Mapping::new();
                put(&mut parameter, "in", text("query"));
                for (member_key, member_value) in fragment {
                    parameter.insert(member_key.clone(), member_value.clone());
                }
                Value::Mapping(parameter)
            })
            .collect(),
    )
}
