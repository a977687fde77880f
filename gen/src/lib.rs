//! Linkspec generator library.
//!
//! This crate expands compact, relationship-oriented API descriptions
//! (parsed by `linkspec-define`) into fully explicit Swagger 2.0 documents.
//! Designers declare entities, their properties, and their relationships
//! once; the generator synthesizes every resource path, HTTP method,
//! parameter, request/response schema, and standard error response those
//! relationships imply.
//!
//! ## Modules
//!
//! - [`catalog`] - entity reference resolution
//! - [`relationships`] - relationship edges derived from properties
//! - [`parser`] - query-path grammar and path-template parameters
//! - [`expand`] - the expansion engine (traversal and interface assembly)
//! - [`responses`] - shared response/parameter catalogs
//! - [`output`] - final assembly, encoding, and writing
//! - [`validation`] - the independent structural linter
//! - [`diagnostics`] - the stderr diagnostics stream
//! - [`errors`] - error types for the generator
//!
//! ## Example Usage
//!
//! ```
//! use linkspec_define::SourceSchema;
//! use linkspec_gen::expand::{GeneratorOptions, expand};
//!
//! let schema = SourceSchema::from_yaml_str(r#"
//! title: Config API
//! entities:
//!   Config:
//!     readOnly: true
//!     well_known_URLs: /config
//! "#)
//! .unwrap();
//!
//! let document = expand(&schema, GeneratorOptions::default()).unwrap();
//! let paths = document.as_mapping().unwrap().get("paths").unwrap();
//! assert!(paths.as_mapping().unwrap().contains_key("/config"));
//! ```

pub mod catalog;
pub mod diagnostics;
pub mod errors;
pub mod expand;
pub mod output;
pub mod parser;
pub mod relationships;
pub mod responses;
pub mod test_utils;
pub mod validation;

// Re-export the main entry points at crate root
pub use errors::GeneratorError;
pub use expand::{Generator, GeneratorOptions, expand};
