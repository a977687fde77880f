//! Convenient re-exports for working with linkspec source schemas.
//!
//! ## Examples
//!
//! ```
//! use linkspec_define::prelude::*;
//!
//! let schema = SourceSchema::from_yaml_str("title: Pets\nentities: {}").unwrap();
//! assert_eq!(schema.title(), "Pets");
//! assert!(schema.entities().unwrap().is_empty());
//! ```

pub use crate::conventions::{Conventions, SelectorLocation};
pub use crate::entity::{
    Entity, EntityMap, Implementation, QueryPathDecl, QueryPathDecls, SchemaRef,
};
pub use crate::property::{Consumes, Multiplicity, MultiplicitySide, Property, Relationship};
pub use crate::schema::{SourceSchema, StringOrList};
