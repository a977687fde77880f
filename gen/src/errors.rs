//! Error types for the linkspec generator.

use thiserror::Error;

/// Errors that can occur during expansion.
///
/// Every variant is fatal: the generator terminates the run with no output
/// document rather than emitting a partial one.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Failed to read the source schema file
    #[error("failed to read '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the output document
    #[error("failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The source document could not be decoded
    #[error("failed to decode source schema: {0}")]
    DecodeError(#[from] serde_yaml::Error),

    /// The output document could not be encoded
    #[error("failed to encode output document: {0}")]
    EncodeError(serde_yaml::Error),

    /// A reference does not name any declared entity
    #[error("unresolved entity reference '{reference}' in {referenced_from}")]
    UnresolvedReference {
        reference: String,
        referenced_from: String,
    },

    /// A relationship annotation does not fit the grammar
    #[error("invalid relationship on property '{property}' of entity '{entity}': {source}")]
    InvalidRelationship {
        property: String,
        entity: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A multi-valued relationship was asked for a collection GET without
    /// declaring its element entity
    #[error(
        "must provide multi_valued_relationship_entity for property '{property}' of entity '{entity}'"
    )]
    MissingElementEntity { property: String, entity: String },

    /// A query path pattern could not be parsed
    #[error("invalid query path '{path}': {reason}")]
    InvalidQueryPath { path: String, reason: String },

    /// A multi-valued segment before the last position carries no selector
    #[error("query path '{path}' has a multi-valued segment with no selecting parameter")]
    AmbiguousSegment { path: String },

    /// The same query path is declared more than once on one entity
    #[error("query path '{path}' of entity '{entity}' is listed more than once")]
    DuplicateQueryPath { entity: String, path: String },

    /// Declared query paths matched no relationship chain
    #[error("query paths of entity '{entity}' match no relationship chain: {paths:?}")]
    UnmatchedQueryPaths { entity: String, paths: Vec<String> },

    /// A selector names a property the target entity does not declare
    #[error("property '{property}' not found in entity '{entity}'")]
    DiscriminatorNotFound { property: String, entity: String },

    /// A selector property has no usable type for a path parameter
    #[error("property '{property}' of entity '{entity}' must declare a type to be used as a path parameter")]
    DiscriminatorUntyped { property: String, entity: String },
}
