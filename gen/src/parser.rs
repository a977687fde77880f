//! Query-path grammar and path-template parameter extraction.
//!
//! A query path is a `/`-joined chain of segments, each naming a
//! relationship property and optionally selecting one element of a
//! multi-valued relationship by a discriminator property:
//! `items;{id}` selects the item whose `id` matches the path parameter.

use linkspec_define::QueryPathDecl;

use crate::errors::GeneratorError;
use crate::relationships::RelationshipEdge;

/// One parsed segment of a query path.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySegment {
    /// The relationship property this segment traverses.
    pub property_name: String,
    /// The property used to select one element, when declared.
    pub discriminator_property: Option<String>,
    /// The path-parameter name bound by the selector; renamed with a
    /// numeric suffix when an earlier segment already bound the same name.
    pub parameter_name: Option<String>,
    rendered: String,
}

/// A parsed query path pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPath {
    /// The segments, in traversal order.
    pub segments: Vec<QuerySegment>,
    rendered: String,
    source: String,
}

impl QueryPath {
    /// Parses one declared pattern, joining selectors with the given
    /// discriminator separator unless the declaration overrides it.
    ///
    /// ## Errors
    ///
    /// Fails on malformed selector syntax: more than one `;` in a segment,
    /// or a missing, unclosed, or empty `{parameter}` after the `;`.
    pub fn parse(decl: &QueryPathDecl, default_separator: char) -> Result<Self, GeneratorError> {
        let separator = decl
            .separator_override()
            .and_then(|text| text.chars().next())
            .unwrap_or(default_separator);
        let source = decl.segments().to_string();

        let mut segments: Vec<QuerySegment> = Vec::new();
        for raw in source.split('/') {
            let mut parts = raw.splitn(3, ';');
            let property_name = parts.next().unwrap_or_default().to_string();
            let selector = parts.next();
            if parts.next().is_some() {
                return Err(invalid(&source, "segment contains more than one ';'"));
            }
            let segment = match selector {
                None => QuerySegment {
                    property_name,
                    discriminator_property: None,
                    parameter_name: None,
                    rendered: raw.to_string(),
                },
                Some(selector) => {
                    let open = selector
                        .find('{')
                        .ok_or_else(|| invalid(&source, "missing path parameter ({...}) after ';'"))?;
                    let close = selector
                        .find('}')
                        .ok_or_else(|| invalid(&source, "no closing '}' for path parameter"))?;
                    if close <= open + 1 {
                        return Err(invalid(&source, "empty path parameter ({})"));
                    }
                    let discriminator = &selector[open + 1..close];
                    // Earlier segments may already bind this name; suffix it
                    // so parameter names stay unique within the path.
                    let duplicates = segments
                        .iter()
                        .filter(|earlier| {
                            earlier.discriminator_property.as_deref() == Some(discriminator)
                        })
                        .count();
                    let parameter_name = if duplicates > 0 {
                        format!("{discriminator}_{duplicates}")
                    } else {
                        discriminator.to_string()
                    };
                    let rendered = format!(
                        "{}{}{}{{{}}}{}",
                        property_name,
                        separator,
                        &selector[..open],
                        parameter_name,
                        &selector[close + 1..]
                    );
                    QuerySegment {
                        property_name,
                        discriminator_property: Some(discriminator.to_string()),
                        parameter_name: Some(parameter_name),
                        rendered,
                    }
                }
            };
            segments.push(segment);
        }

        let rendered = segments
            .iter()
            .map(|segment| segment.rendered.as_str())
            .collect::<Vec<_>>()
            .join("/");
        Ok(QueryPath {
            segments,
            rendered,
            source,
        })
    }

    /// The pattern rendered into its output path form.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// The declared pattern text, for error messages.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this pattern matches a traversed edge stack: equal length and
    /// equal property names, in order.
    pub fn matches(&self, stack: &[RelationshipEdge]) -> bool {
        self.segments.len() == stack.len()
            && self
                .segments
                .iter()
                .zip(stack)
                .all(|(segment, edge)| segment.property_name == edge.property_name)
    }
}

fn invalid(path: &str, reason: &str) -> GeneratorError {
    GeneratorError::InvalidQueryPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Extracts parameter names from a path template.
///
/// ## Examples
///
/// ```
/// use linkspec_gen::parser::extract_path_params;
///
/// assert_eq!(extract_path_params("/config"), vec![] as Vec<&str>);
/// assert_eq!(extract_path_params("/orders/{id}"), vec!["id"]);
/// assert_eq!(
///     extract_path_params("/shops/{shop}/orders/{order}"),
///     vec!["shop", "order"]
/// );
/// ```
pub fn extract_path_params(path: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut pos = 0;

    for (idx, c) in path.char_indices() {
        if c == '{' {
            pos = idx + 1; // Start after '{'
        } else if c == '}' && pos > 0 {
            let param = &path[pos..idx];
            if !param.is_empty() {
                params.push(param);
            }
            pos = 0;
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkspec_define::QueryPathDecl;

    fn parse(pattern: &str) -> QueryPath {
        QueryPath::parse(&QueryPathDecl::Pattern(pattern.to_string()), ';').unwrap()
    }

    fn parse_err(pattern: &str) -> GeneratorError {
        QueryPath::parse(&QueryPathDecl::Pattern(pattern.to_string()), ';').unwrap_err()
    }

    #[test]
    fn plain_segments_render_unchanged() {
        let path = parse("items");
        assert_eq!(path.segments.len(), 1);
        assert_eq!(path.rendered(), "items");
        assert!(path.segments[0].parameter_name.is_none());
    }

    #[test]
    fn selector_segment_binds_a_parameter() {
        let path = parse("items;{id}");
        assert_eq!(path.rendered(), "items;{id}");
        let segment = &path.segments[0];
        assert_eq!(segment.property_name, "items");
        assert_eq!(segment.discriminator_property.as_deref(), Some("id"));
        assert_eq!(segment.parameter_name.as_deref(), Some("id"));
    }

    #[test]
    fn path_segment_separator_renders_with_slash() {
        let decl = QueryPathDecl::Pattern("items;{id}".to_string());
        let path = QueryPath::parse(&decl, '/').unwrap();
        assert_eq!(path.rendered(), "items/{id}");
    }

    #[test]
    fn separator_override_beats_the_default() {
        let decl = QueryPathDecl::Configured {
            segments: "items;{id}".to_string(),
            discriminator_separator: Some("/".to_string()),
        };
        let path = QueryPath::parse(&decl, ';').unwrap();
        assert_eq!(path.rendered(), "items/{id}");
    }

    #[test]
    fn repeated_parameter_names_are_suffixed() {
        let path = parse("lists;{id}/items;{id}");
        assert_eq!(
            path.segments[0].parameter_name.as_deref(),
            Some("id")
        );
        assert_eq!(
            path.segments[1].parameter_name.as_deref(),
            Some("id_1")
        );
        assert_eq!(path.rendered(), "lists;{id}/items;{id_1}");
        // lookup still happens by the declared discriminator name
        assert_eq!(
            path.segments[1].discriminator_property.as_deref(),
            Some("id")
        );
    }

    #[test]
    fn distinct_parameter_names_are_not_suffixed() {
        let path = parse("lists;{list_id}/items;{id}");
        assert_eq!(path.segments[1].parameter_name.as_deref(), Some("id"));
    }

    #[test]
    fn two_semicolons_in_a_segment_fail() {
        assert!(matches!(
            parse_err("items;{id};{extra}"),
            GeneratorError::InvalidQueryPath { .. }
        ));
    }

    #[test]
    fn missing_braces_fail() {
        assert!(matches!(
            parse_err("items;id"),
            GeneratorError::InvalidQueryPath { .. }
        ));
    }

    #[test]
    fn unclosed_parameter_fails() {
        assert!(matches!(
            parse_err("items;{id"),
            GeneratorError::InvalidQueryPath { .. }
        ));
    }

    #[test]
    fn empty_parameter_fails() {
        assert!(matches!(
            parse_err("items;{}"),
            GeneratorError::InvalidQueryPath { .. }
        ));
    }

    #[test]
    fn extract_no_params() {
        assert_eq!(extract_path_params("/config"), Vec::<&str>::new());
        assert_eq!(extract_path_params("/"), Vec::<&str>::new());
    }

    #[test]
    fn extract_single_param() {
        assert_eq!(extract_path_params("/orders/{id}"), vec!["id"]);
        assert_eq!(extract_path_params("{Order_URL}"), vec!["Order_URL"]);
    }

    #[test]
    fn extract_multiple_params() {
        assert_eq!(
            extract_path_params("/shops/{shop}/orders/{order}"),
            vec!["shop", "order"]
        );
    }
}
