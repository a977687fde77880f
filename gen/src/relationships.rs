//! Relationship edges derived from property annotations.
//!
//! One edge exists per (source entity, property, target entity) triple: a
//! relationship that fans out to several targets produces one edge per
//! target, all sharing the property name. Edges compare by value over all
//! fields, which is what cycle avoidance keys on during traversal.

use linkspec_define::{Consumes, Entity, Multiplicity};

use crate::errors::GeneratorError;

/// Collection semantics carried only by multi-valued edges.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEdge {
    /// Whether the relationship is an independently addressable collection
    /// resource (default true).
    pub collection_resource: bool,
    /// Media types accepted when creating members, if declared.
    pub consumes_media_types: Option<Vec<String>>,
    /// Entity references creatable through the relationship; defaults to
    /// the edge target.
    pub consumes_entities: Vec<String>,
    /// The entity representing one element of the collection result set.
    /// Required lazily, when a collection GET is assembled.
    pub element_entity: Option<String>,
}

/// The closed variant set of an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    /// A `..:1` relationship: no collection semantics.
    SingleValued,
    /// A `..:n` relationship.
    MultiValued(CollectionEdge),
}

/// A derived association from one entity to another via an annotated
/// property.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipEdge {
    /// The annotated property's name.
    pub property_name: String,
    /// Reference form of the declaring entity.
    pub source_entity: String,
    /// Reference form of the target entity.
    pub target_entity: String,
    /// Declared cardinality.
    pub multiplicity: Multiplicity,
    /// Whether the property exists only for internal wiring. A chain is
    /// private when any of its edges is.
    pub private: bool,
    /// Whether members may be created through the edge.
    pub read_only: bool,
    /// Single- or multi-valued variant.
    pub kind: EdgeKind,
}

impl RelationshipEdge {
    /// Whether the edge's target side is multi-valued.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self.kind, EdgeKind::MultiValued(_))
    }

    /// Whether the edge denotes an addressable collection resource.
    pub fn is_collection_resource(&self) -> bool {
        match &self.kind {
            EdgeKind::SingleValued => false,
            EdgeKind::MultiValued(collection) => collection.collection_resource,
        }
    }

    /// The collection component, for multi-valued edges.
    pub fn collection(&self) -> Option<&CollectionEdge> {
        match &self.kind {
            EdgeKind::SingleValued => None,
            EdgeKind::MultiValued(collection) => Some(collection),
        }
    }
}

/// Scans an entity's properties and produces every relationship edge they
/// declare.
///
/// ## Errors
///
/// Fails when a relationship annotation does not fit the grammar. Target
/// resolvability is the catalog's concern and element-entity presence is
/// checked lazily by the collection builder.
pub fn extract_relationships(
    entity_ref: &str,
    entity_name: &str,
    entity: &Entity,
) -> Result<Vec<RelationshipEdge>, GeneratorError> {
    let mut edges = Vec::new();
    for (property_name, property) in entity.properties() {
        let Some(relationship) = property.relationship() else {
            continue;
        };
        let relationship = relationship.map_err(|source| GeneratorError::InvalidRelationship {
            property: property_name.to_string(),
            entity: entity_name.to_string(),
            source,
        })?;
        let private = property.implementation_private();
        for target in &relationship.entities {
            let kind = if relationship.multiplicity.is_multi_valued() {
                let consumes = relationship.consumes.as_ref();
                EdgeKind::MultiValued(CollectionEdge {
                    collection_resource: relationship.collection_resource,
                    consumes_media_types: consumes.map(Consumes::media_types),
                    consumes_entities: consumes
                        .and_then(Consumes::create_entities)
                        .unwrap_or_else(|| vec![target.clone()]),
                    element_entity: relationship.element_entity.clone(),
                })
            } else {
                EdgeKind::SingleValued
            };
            edges.push(RelationshipEdge {
                property_name: property_name.to_string(),
                source_entity: entity_ref.to_string(),
                target_entity: target.clone(),
                multiplicity: relationship.multiplicity,
                private,
                read_only: relationship.read_only,
                kind,
            });
        }
    }
    Ok(edges)
}
