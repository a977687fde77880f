//! Shared response and parameter catalogs.
//!
//! Standard responses and header parameters are defined once in the output
//! document and referenced by pointer everywhere else. The response catalog
//! is lazy: a body is written into the document's `responses` section the
//! first time an interface references it, and the section's key order is
//! exactly first-registration order.

use serde_yaml::{Mapping, Value};

use crate::expand::{json_ref, put, text};

/// The standard response bodies, in their canonical order.
const STANDARD_RESPONSES: &[&str] = &[
    "standard_200",
    "options_200",
    "303",
    "400",
    "401",
    "403",
    "404",
    "406",
    "409",
    "default",
];

/// Lazy registry of the shared `responses` section.
#[derive(Debug)]
pub struct ResponseCatalog {
    bodies: Vec<(&'static str, Value)>,
    emitted: Mapping,
}

impl ResponseCatalog {
    /// Builds the registry. `error_schema` is attached to every error
    /// response body; an empty mapping when the document declares no
    /// shared error response.
    pub fn new(error_schema: Value) -> Self {
        let bodies = STANDARD_RESPONSES
            .iter()
            .map(|&name| (name, standard_body(name, &error_schema)))
            .collect();
        ResponseCatalog {
            bodies,
            emitted: Mapping::new(),
        }
    }

    /// Returns a pointer to a standard response, writing its body into the
    /// shared section on first reference.
    pub fn reference(&mut self, name: &str) -> Value {
        if !self.emitted.contains_key(name) {
            if let Some(body) = self.lookup(name) {
                self.emitted.insert(text(name), body);
            }
        }
        json_ref(&format!("#/responses/{name}"))
    }

    /// A standard response body, for interfaces that inline it rather than
    /// referencing it (the shared 200).
    pub fn body(&self, name: &str) -> Value {
        self.lookup(name).unwrap_or(Value::Mapping(Mapping::new()))
    }

    /// The populated `responses` section, in first-registration order.
    pub fn into_emitted(self) -> Mapping {
        self.emitted
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.bodies
            .iter()
            .find(|(body_name, _)| *body_name == name)
            .map(|(_, body)| body.clone())
    }
}

/// Registry of the shared header parameters.
#[derive(Debug)]
pub struct ParameterCatalog {
    emitted: Mapping,
}

impl ParameterCatalog {
    /// Builds the catalog with its four standing members: `If-Match`,
    /// `Accept`, and the two CORS preflight request headers.
    pub fn new() -> Self {
        let mut emitted = Mapping::new();
        emitted.insert(
            text("If-Match"),
            header_parameter(
                "If-Match",
                "specifies the last known ETag value of the resource being modified",
                true,
            ),
        );
        emitted.insert(
            text("Accept"),
            header_parameter("Accept", "specifies the requested media type - required", true),
        );
        emitted.insert(
            text("Access-Control-Request-Method"),
            header_parameter(
                "Access-Control-Request-Method",
                "specifies the method the client wishes to use",
                true,
            ),
        );
        emitted.insert(
            text("Access-Control-Request-Headers"),
            header_parameter(
                "Access-Control-Request-Headers",
                "specifies the custom headers the client wishes to use",
                true,
            ),
        );
        ParameterCatalog { emitted }
    }

    /// A pointer to a shared parameter.
    pub fn reference(&self, name: &str) -> Value {
        json_ref(&format!("#/parameters/{name}"))
    }

    /// Registers the optional `Put-If-Match` header on first PUT. The
    /// header name on the wire stays `If-Match`; only the requirement
    /// differs from the standing member.
    pub fn define_put_if_match(&mut self) {
        if !self.emitted.contains_key("Put-If-Match") {
            self.emitted.insert(
                text("Put-If-Match"),
                header_parameter(
                    "If-Match",
                    "specifies the last known ETag value of the resource being modified",
                    false,
                ),
            );
        }
    }

    /// The populated `parameters` section.
    pub fn into_emitted(self) -> Mapping {
        self.emitted
    }
}

impl Default for ParameterCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// The standard response sets merged into each operation's responses.
#[derive(Debug)]
pub struct ResponseSets {
    /// 401/403/404/406/default, for entity GET.
    pub entity_get: Value,
    /// 400/401/403/404/406/409/default, for PUT and PATCH.
    pub put_patch: Value,
    /// 400/401/403/404/406/default, for DELETE.
    pub delete: Value,
    /// 400/401/403/404/406/default, for POST.
    pub post: Value,
}

/// The shared HEAD and OPTIONS operation bodies.
#[derive(Debug)]
pub struct SharedMethods {
    /// Responses of every HEAD operation.
    pub head: Value,
    /// Parameters and responses of every OPTIONS operation.
    pub options: Value,
}

/// Response sets and shared methods, built once per run.
#[derive(Debug)]
pub struct StandardKits {
    pub sets: ResponseSets,
    pub methods: SharedMethods,
}

impl StandardKits {
    /// Builds the kits, registering their referenced responses in
    /// deterministic order (this order is the observable key order of the
    /// output `responses` section).
    pub fn build(responses: &mut ResponseCatalog, parameters: &ParameterCatalog) -> Self {
        let entity_get = response_set(responses, &["401", "403", "404", "406", "default"]);
        let put_patch = response_set(
            responses,
            &["400", "401", "403", "404", "406", "409", "default"],
        );
        let delete = response_set(responses, &["400", "401", "403", "404", "406", "default"]);
        let post = response_set(responses, &["400", "401", "403", "404", "406", "default"]);

        let mut head = Mapping::new();
        let mut head_responses = Mapping::new();
        put(&mut head_responses, "200", responses.reference("standard_200"));
        for status in ["401", "403", "404", "default"] {
            put(&mut head_responses, status, responses.reference(status));
        }
        put(&mut head, "responses", Value::Mapping(head_responses));

        let mut options = Mapping::new();
        put(
            &mut options,
            "parameters",
            Value::Sequence(vec![
                parameters.reference("Access-Control-Request-Method"),
                parameters.reference("Access-Control-Request-Headers"),
            ]),
        );
        let mut options_responses = Mapping::new();
        put(&mut options_responses, "200", responses.reference("options_200"));
        for status in ["401", "403", "404", "default"] {
            put(&mut options_responses, status, responses.reference(status));
        }
        put(&mut options, "responses", Value::Mapping(options_responses));

        StandardKits {
            sets: ResponseSets {
                entity_get,
                put_patch,
                delete,
                post,
            },
            methods: SharedMethods {
                head: Value::Mapping(head),
                options: Value::Mapping(options),
            },
        }
    }
}

fn response_set(responses: &mut ResponseCatalog, statuses: &[&str]) -> Value {
    let mut set = Mapping::new();
    for status in statuses {
        put(&mut set, status, responses.reference(status));
    }
    Value::Mapping(set)
}

fn header_parameter(name: &str, description: &str, required: bool) -> Value {
    let mut parameter = Mapping::new();
    put(&mut parameter, "name", text(name));
    put(&mut parameter, "in", text("header"));
    put(&mut parameter, "type", text("string"));
    put(&mut parameter, "description", text(description));
    put(&mut parameter, "required", Value::Bool(required));
    Value::Mapping(parameter)
}

fn header_field(name: &str, description: &str) -> (Value, Value) {
    let mut field = Mapping::new();
    put(&mut field, "type", text("string"));
    put(&mut field, "description", text(description));
    (text(name), Value::Mapping(field))
}

fn standard_body(name: &str, error_schema: &Value) -> Value {
    let mut body = Mapping::new();
    match name {
        "standard_200" => {
            put(&mut body, "description", text("successful"));
            let mut headers = Mapping::new();
            let (key, value) = header_field("Content-Location", "perma-link URL of resource");
            headers.insert(key, value);
            let (key, value) = header_field(
                "ETag",
                "this value must be echoed in the If-Match header of every PATCH or PUT",
            );
            headers.insert(key, value);
            put(&mut body, "headers", Value::Mapping(headers));
        }
        "options_200" => {
            put(&mut body, "description", text("successful"));
            let mut headers = Mapping::new();
            for (header, description) in [
                ("Access-Control-Allow-Origin", "origins allowed"),
                ("Access-Control-Allow-Methods", "methods allowed"),
                ("Access-Control-Allow-Headers", "headers allowed"),
                ("Access-Control-Max-Age", "length of time response can be cached"),
            ] {
                let (key, value) = header_field(header, description);
                headers.insert(key, value);
            }
            put(&mut body, "headers", Value::Mapping(headers));
        }
        "303" => {
            put(
                &mut body,
                "description",
                text("See other. Server is redirecting client to a different resource"),
            );
            let mut headers = Mapping::new();
            let (key, value) = header_field("Location", "URL of other resource");
            headers.insert(key, value);
            put(&mut body, "headers", Value::Mapping(headers));
        }
        "400" => error_body(&mut body, "Bad Request. Client request in error", error_schema),
        "401" => error_body(
            &mut body,
            "Unauthorized. Client authentication token missing from request",
            error_schema,
        ),
        "403" => error_body(
            &mut body,
            "Forbidden. Client authentication token does not permit this method on this resource",
            error_schema,
        ),
        "404" => error_body(&mut body, "Not Found. Resource not found", error_schema),
        "406" => error_body(
            &mut body,
            "Not Acceptable. Requested media type not available",
            error_schema,
        ),
        "409" => error_body(
            &mut body,
            "Conflict. Value provided in If-Match header does not match current ETag value of resource",
            error_schema,
        ),
        _ => error_body(
            &mut body,
            "5xx errors and other unexpected conditions",
            error_schema,
        ),
    }
    Value::Mapping(body)
}

fn error_body(body: &mut Mapping, description: &str, error_schema: &Value) {
    put(body, "description", text(description));
    put(body, "schema", error_schema.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ResponseCatalog {
        ResponseCatalog::new(Value::Mapping(Mapping::new()))
    }

    #[test]
    fn reference_registers_each_body_once() {
        let mut responses = catalog();
        let first = responses.reference("404");
        let second = responses.reference("404");
        assert_eq!(first, second);
        let emitted = responses.into_emitted();
        assert_eq!(emitted.len(), 1);
        assert!(emitted.contains_key("404"));
    }

    #[test]
    fn reference_points_into_the_responses_section() {
        let mut responses = catalog();
        let pointer = responses.reference("401");
        assert_eq!(
            pointer.as_mapping().unwrap().get("$ref").and_then(Value::as_str),
            Some("#/responses/401")
        );
    }

    #[test]
    fn emitted_order_is_first_registration_order() {
        let mut responses = catalog();
        let parameters = ParameterCatalog::new();
        StandardKits::build(&mut responses, &parameters);
        let order: Vec<String> = responses
            .into_emitted()
            .keys()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        assert_eq!(
            order,
            vec![
                "401",
                "403",
                "404",
                "406",
                "default",
                "400",
                "409",
                "standard_200",
                "options_200"
            ]
        );
    }

    #[test]
    fn error_schema_is_attached_to_error_bodies() {
        let mut responses = ResponseCatalog::new(json_ref("#/definitions/ErrorResponse"));
        responses.reference("409");
        let emitted = responses.into_emitted();
        let body = emitted.get("409").and_then(Value::as_mapping).unwrap();
        assert_eq!(
            body.get("schema")
                .and_then(Value::as_mapping)
                .and_then(|schema| schema.get("$ref"))
                .and_then(Value::as_str),
            Some("#/definitions/ErrorResponse")
        );
    }

    #[test]
    fn standing_parameters_are_in_declaration_order() {
        let parameters = ParameterCatalog::new();
        let order: Vec<&str> = parameters
            .emitted
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(
            order,
            vec![
                "If-Match",
                "Accept",
                "Access-Control-Request-Method",
                "Access-Control-Request-Headers"
            ]
        );
    }

    #[test]
    fn put_if_match_registers_once_and_stays_optional() {
        let mut parameters = ParameterCatalog::new();
        parameters.define_put_if_match();
        parameters.define_put_if_match();
        let emitted = parameters.into_emitted();
        let body = emitted
            .get("Put-If-Match")
            .and_then(Value::as_mapping)
            .unwrap();
        assert_eq!(body.get("name").and_then(Value::as_str), Some("If-Match"));
        assert_eq!(body.get("required").and_then(Value::as_bool), Some(false));
    }
}
