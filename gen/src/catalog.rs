//! Entity catalog: reference resolution over the declared entity map.
//!
//! Every entity is reachable through two reference forms: the generated
//! `#/entities/<name>` form and its declared identifier (the `id` member,
//! defaulting to `#<name>`). The catalog indexes both, knows where each
//! entity lands in the output document, and resolves properties through
//! `allOf` inheritance.

use std::collections::HashMap;

use linkspec_define::{Entity, Property, SourceSchema};

use crate::errors::GeneratorError;

/// Lookup table over the declared entities of one source schema.
///
/// Construction fails when any `allOf`/`oneOf` or relationship reference
/// does not resolve to a declared entity; collection element references are
/// checked lazily, when a collection GET is actually assembled.
#[derive(Debug)]
pub struct EntityCatalog<'a> {
    entries: &'a [(String, Entity)],
    by_reference: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl<'a> EntityCatalog<'a> {
    /// Indexes the schema's entities and checks that every declared
    /// reference resolves.
    pub fn from_schema(schema: &'a SourceSchema) -> Result<Self, GeneratorError> {
        let entries = schema.entities().unwrap_or(&[]);
        let mut by_reference = HashMap::with_capacity(entries.len() * 2);
        for (index, (name, _)) in entries.iter().enumerate() {
            by_reference.insert(format!("#/entities/{name}"), index);
        }
        // Declared identifiers may shadow generated forms; last writer wins,
        // matching declaration order.
        for (index, (name, entity)) in entries.iter().enumerate() {
            let identifier = entity
                .id
                .clone()
                .unwrap_or_else(|| format!("#{name}"));
            by_reference.insert(identifier, index);
        }

        let catalog = EntityCatalog {
            entries,
            by_reference,
            aliases: HashMap::new(),
        };
        catalog.check_references()?;
        Ok(catalog)
    }

    fn check_references(&self) -> Result<(), GeneratorError> {
        for (name, entity) in self.entries {
            for reference in entity
                .all_of
                .iter()
                .flatten()
                .chain(entity.one_of.iter().flatten())
            {
                if !self.contains(&reference.reference) {
                    return Err(GeneratorError::UnresolvedReference {
                        reference: reference.reference.clone(),
                        referenced_from: format!("entity '{name}'"),
                    });
                }
            }
            for (property_name, property) in entity.properties() {
                let Some(relationship) = property.relationship() else {
                    continue;
                };
                let relationship =
                    relationship.map_err(|source| GeneratorError::InvalidRelationship {
                        property: property_name.to_string(),
                        entity: name.clone(),
                        source,
                    })?;
                for target in &relationship.entities {
                    if !self.contains(target) {
                        return Err(GeneratorError::UnresolvedReference {
                            reference: target.clone(),
                            referenced_from: format!(
                                "property '{property_name}' of entity '{name}'"
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// The declared entities, in declaration order.
    pub fn entries(&self) -> &'a [(String, Entity)] {
        self.entries
    }

    /// Whether a reference names a declared entity.
    pub fn contains(&self, reference: &str) -> bool {
        self.by_reference.contains_key(reference)
    }

    /// Resolves a reference to its entity name and body.
    pub fn resolve(
        &self,
        reference: &str,
        referenced_from: &str,
    ) -> Result<(&'a str, &'a Entity), GeneratorError> {
        self.by_reference
            .get(reference)
            .map(|&index| {
                let (name, entity) = &self.entries[index];
                (name.as_str(), entity)
            })
            .ok_or_else(|| GeneratorError::UnresolvedReference {
                reference: reference.to_string(),
                referenced_from: referenced_from.to_string(),
            })
    }

    /// Resolves a reference to its entity name only.
    pub fn entity_name(
        &self,
        reference: &str,
        referenced_from: &str,
    ) -> Result<&'a str, GeneratorError> {
        self.resolve(reference, referenced_from).map(|(name, _)| name)
    }

    /// Registers a synthetic definition (such as `ErrorResponse`) so that
    /// references to it rewrite like entity references.
    pub fn register_alias(&mut self, reference: &str, definition_name: &str) {
        self.aliases
            .insert(reference.to_string(), definition_name.to_string());
    }

    /// The output-document location of a reference, in
    /// `#/definitions/<name>` form.
    pub fn definition_ref(
        &self,
        reference: &str,
        referenced_from: &str,
    ) -> Result<String, GeneratorError> {
        if let Some(&index) = self.by_reference.get(reference) {
            return Ok(format!("#/definitions/{}", self.entries[index].0));
        }
        if let Some(name) = self.aliases.get(reference) {
            return Ok(format!("#/definitions/{name}"));
        }
        Err(GeneratorError::UnresolvedReference {
            reference: reference.to_string(),
            referenced_from: referenced_from.to_string(),
        })
    }

    /// Looks a property up on an entity, climbing `allOf` parents when the
    /// entity does not declare it itself.
    pub fn resolve_property(
        &self,
        reference: &str,
        property_name: &str,
        referenced_from: &str,
    ) -> Result<Option<Property<'a>>, GeneratorError> {
        let (_, entity) = self.resolve(reference, referenced_from)?;
        if let Some(property) = entity.property(property_name) {
            return Ok(Some(property));
        }
        for parent in entity.all_of.iter().flatten() {
            if let Some(property) =
                self.resolve_property(&parent.reference, property_name, referenced_from)?
            {
                return Ok(Some(property));
            }
        }
        Ok(None)
    }
}
