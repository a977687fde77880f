//! Linkspec Definition Library
//!
//! This crate provides the data model for linkspec source schemas: compact,
//! relationship-oriented API descriptions that the `linkspec-gen` binary
//! expands into fully explicit Swagger 2.0 documents.
//!
//! ## Core Types
//!
//! - [`SourceSchema`] - A complete source document with conventions, media
//!   types, and the ordered entity map
//! - [`Entity`] - A declared resource type with properties, relationships,
//!   well-known URLs, and query paths
//! - [`Property`] - A borrowed view over one property's schema fragment
//! - [`Relationship`] - A normalized relationship annotation
//! - [`Multiplicity`] - Source/target cardinality of a relationship
//! - [`Conventions`] - Document-wide generation conventions
//!
//! ## Examples
//!
//! Parse a small schema and inspect an entity:
//!
//! ```
//! use linkspec_define::SourceSchema;
//!
//! let schema = SourceSchema::from_yaml_str(r#"
//! title: Todo List API
//! entities:
//!   TodoList:
//!     well_known_URLs: /to-dos
//!     properties:
//!       items:
//!         relationship:
//!           entities: '#Item'
//!           multiplicity: '1:n'
//!   Item:
//!     properties:
//!       id:
//!         type: string
//! "#)
//! .unwrap();
//!
//! assert_eq!(schema.title(), "Todo List API");
//! assert_eq!(schema.version(), "initial");
//! let entities = schema.entities().unwrap();
//! assert_eq!(entities.len(), 2);
//! assert_eq!(entities[0].0, "TodoList");
//! ```

pub mod conventions;
pub mod entity;
pub mod prelude;
pub mod property;
pub mod schema;

// Re-export main types at crate root
pub use conventions::{Conventions, SelectorLocation};
pub use entity::{Entity, EntityMap, Implementation, QueryPathDecl, QueryPathDecls, SchemaRef};
pub use property::{Consumes, Multiplicity, MultiplicitySide, Property, Relationship};
pub use schema::{SourceSchema, StringOrList};
