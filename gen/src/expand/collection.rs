//! Collection interface assembly.
//!
//! A collection interface addresses the set of elements reachable via one
//! multi-valued relationship edge: GET always (returning the element
//! entity's schema), POST unless the edge is read-only, and HEAD/OPTIONS
//! from the shared method catalog.

use serde_yaml::{Mapping, Value};

use crate::errors::GeneratorError;
use crate::expand::entity::query_parameter_seq;
use crate::expand::prefix::PathPrefix;
use crate::expand::{Generator, json_ref, merge_into, put, string_seq, text};
use crate::parser::QueryPath;
use crate::relationships::RelationshipEdge;
use crate::responses::StandardKits;

impl Generator<'_> {
    /// Assembles the operation map for the collection resource at the end
    /// of a matched chain.
    ///
    /// `siblings` is the candidate edge set the last edge was drawn from;
    /// edges sharing its property name make the POST body and the 201
    /// response polymorphic.
    pub(crate) fn build_collection_interface(
        &mut self,
        anchor: &PathPrefix,
        query_path: &QueryPath,
        stack: &[RelationshipEdge],
        siblings: &[RelationshipEdge],
        kits: &StandardKits,
    ) -> Result<Value, GeneratorError> {
        let edge = &stack[stack.len() - 1];
        let subject_ref = edge.target_entity.as_str();
        let context = format!("relationship '{}'", edge.property_name);

        let mut interface = Mapping::new();
        if stack.iter().any(|chain_edge| chain_edge.private) {
            put(&mut interface, "x-private", Value::Bool(true));
        }
        let path_parameters = self.build_parameters(anchor, Some((query_path, stack)))?;
        if !path_parameters.is_empty() {
            put(&mut interface, "parameters", Value::Sequence(path_parameters));
        }

        let get = self.build_collection_get(edge)?;
        put(&mut interface, "get", get);

        let siblings: Vec<&RelationshipEdge> = siblings
            .iter()
            .filter(|sibling| sibling.property_name == edge.property_name)
            .collect();
        let mut sibling_names = Vec::with_capacity(siblings.len());
        for sibling in &siblings {
            sibling_names.push(self.catalog.entity_name(&sibling.target_entity, &context)?);
        }
        let create_entities: Vec<String> = siblings
            .iter()
            .filter_map(|sibling| sibling.collection())
            .flat_map(|collection| collection.consumes_entities.iter().cloned())
            .collect();
        let create_media_types: Vec<String> = siblings
            .iter()
            .filter_map(|sibling| sibling.collection())
            .filter_map(|collection| collection.consumes_media_types.as_ref())
            .flatten()
            .cloned()
            .collect();

        let (created_schema, created_names) = if siblings.len() > 1 {
            let mut refs = Vec::with_capacity(siblings.len());
            for sibling in &siblings {
                refs.push(json_ref(
                    &self.catalog.definition_ref(&sibling.target_entity, &context)?,
                ));
            }
            let mut union = Mapping::new();
            put(&mut union, "x-oneOf", Value::Sequence(refs));
            (Value::Mapping(union), sibling_names.join(" or "))
        } else {
            (
                json_ref(&self.catalog.definition_ref(subject_ref, &context)?),
                self.catalog.entity_name(subject_ref, &context)?.to_string(),
            )
        };

        // POST
        if !edge.read_only {
            let (body_schema, post_description) = if create_entities.len() > 1 {
                let mut refs = Vec::with_capacity(create_entities.len());
                for entity in &create_entities {
                    refs.push(json_ref(&self.catalog.definition_ref(entity, &context)?));
                }
                let mut union = Mapping::new();
                put(&mut union, "x-oneOf", Value::Sequence(refs));
                (
                    Value::Mapping(union),
                    format!("Create a new {}", sibling_names.join(" or ")),
                )
            } else {
                (
                    json_ref(&self.catalog.definition_ref(subject_ref, &context)?),
                    format!("Create a new {created_names}"),
                )
            };

            let mut post = Mapping::new();
            put(&mut post, "description", text(&post_description));
            let mut body_parameter = Mapping::new();
            put(&mut body_parameter, "name", text("body"));
            put(&mut body_parameter, "in", text("body"));
            put(
                &mut body_parameter,
                "description",
                text(&format!(
                    "The representation of the new {created_names} being created"
                )),
            );
            put(&mut body_parameter, "schema", body_schema);
            put(
                &mut post,
                "parameters",
                Value::Sequence(vec![Value::Mapping(body_parameter)]),
            );
            if !create_media_types.is_empty() {
                put(&mut post, "consumes", string_seq(&create_media_types));
            }

            let mut created = Mapping::new();
            put(
                &mut created,
                "description",
                text(&format!("Created new {created_names}")),
            );
            put(&mut created, "schema", created_schema);
            let mut location = Mapping::new();
            put(&mut location, "type", text("string"));
            put(
                &mut location,
                "description",
                text(&format!("perma-link URL of newly-created {created_names}")),
            );
            let mut etag = Mapping::new();
            put(&mut etag, "type", text("string"));
            put(
                &mut etag,
                "description",
                text("Value of ETag required for subsequent updates"),
            );
            let mut headers = Mapping::new();
            put(&mut headers, "Location", Value::Mapping(location));
            put(&mut headers, "ETag", Value::Mapping(etag));
            put(&mut created, "headers", Value::Mapping(headers));

            let mut responses = Mapping::new();
            put(&mut responses, "201", Value::Mapping(created));
            merge_into(&mut responses, &kits.sets.post, self.options.yaml_merge);
            put(&mut post, "responses", Value::Mapping(responses));
            put(&mut interface, "post", Value::Mapping(post));
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

    /// The GET operation of a collection interface.
    ///
    /// Returns the element entity's schema and the query parameters
    /// declared on the element entity or transitively through its `oneOf`
    /// alternatives, de-duplicated by name.
    ///
    /// ## Errors
    ///
    /// Fails when the edge declares no element entity, or the declared
    /// element reference does not resolve. This is the lazy check the
    /// extractor defers until a collection GET is actually assembled.
    pub(crate) fn build_collection_get(
        &mut self,
        edge: &RelationshipEdge,
    ) -> Result<Value, GeneratorError> {
        let element_ref = edge
            .collection()
            .and_then(|collection| collection.element_entity.as_deref())
            .ok_or_else(|| GeneratorError::MissingElementEntity {
                property: edge.property_name.clone(),
                entity: edge.source_entity.clone(),
            })?;
        let context = format!("relationship '{}'", edge.property_name);
        let element_location = self.catalog.definition_ref(element_ref, &context)?;

        let mut fragments = Vec::new();
        self.collect_query_parameters(element_ref, &context, &mut fragments)?;
        let fragments = dedup_by_name(fragments);

        let mut get = Mapping::new();
        if !fragments.is_empty() {
            put(&mut get, "parameters", query_parameter_seq(&fragments));
        }

        let mut ok_response = Mapping::new();
        put(&mut ok_response, "description", text("successful"));
        put(&mut ok_response, "schema", json_ref(&element_location));
        let mut content_location = Mapping::new();
        put(&mut content_location, "type", text("string"));
        put(
            &mut content_location,
            "description",
            text("perma-link URL of collection"),
        );
        let mut headers = Mapping::new();
        put(&mut headers, "Content-Location", Value::Mapping(content_location));
        put(&mut ok_response, "headers", Value::Mapping(headers));

        let mut responses = Mapping::new();
        put(&mut responses, "200", Value::Mapping(ok_response));
        for status in ["303", "401", "403", "404", "406", "default"] {
            put(&mut responses, status, self.responses.reference(status));
        }
        put(&mut get, "responses", Value::Mapping(responses));
        Ok(Value::Mapping(get))
    }

    fn collect_query_parameters(
        &self,
        reference: &str,
        context: &str,
        out: &mut Vec<Mapping>,
    ) -> Result<(), GeneratorError> {
        let (_, entity) = self.catalog.resolve(reference, context)?;
        if let Some(fragments) = &entity.query_parameters {
            out.extend(fragments.iter().cloned());
        }
        for alternative in entity.one_of.iter().flatten() {
            self.collect_query_parameters(&alternative.reference, context, out)?;
        }
        Ok(())
    }
}

/// Keeps the first fragment per `name`, preserving order.
fn dedup_by_name(fragments: Vec<Mapping>) -> Vec<Mapping> {
    let mut seen = Vec::new();
    let mut kept = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let name = fragment
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(name) = name {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
        }
        kept.push(fragment);
    }
    kept
}
