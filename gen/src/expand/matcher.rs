//! Query-path matching: traversal of the relationship graph.
//!
//! For every entity that declares `query_paths`, the matcher walks chains of
//! relationship edges rooted at that entity and tests each declared pattern
//! against the current chain. The walk keeps an explicit frame stack instead
//! of recursing, so depth is bounded by the number of distinct edges and the
//! cycle guard is auditable: an edge already on the chain is never pushed
//! again.

use linkspec_define::Entity;

use crate::errors::GeneratorError;
use crate::expand::prefix::PathPrefix;
use crate::expand::{Generator, text};
use crate::parser::QueryPath;
use crate::relationships::{RelationshipEdge, extract_relationships};
use crate::responses::StandardKits;

/// One level of the traversal: the candidate edges reachable from the
/// corresponding chain position, and how far iteration has advanced.
struct Frame {
    candidates: Vec<RelationshipEdge>,
    next: usize,
}

impl Generator<'_> {
    /// Matches and emits every query path the entity declares.
    ///
    /// Each top-level edge seeds one traversal per anchor the entity
    /// offers. Consumption semantics differ by anchor: matches under the
    /// implementation anchor consume from a scratch copy, well-known
    /// anchors share one leftover set across their URLs, and the entity-URL
    /// anchor consumes from the remaining set directly. Whatever is left
    /// after all edges have been traversed is a fatal configuration error.
    pub(crate) fn build_query_paths(
        &mut self,
        entity_name: &str,
        entity: &Entity,
        entity_ref: &str,
        edges: &[RelationshipEdge],
        kits: &StandardKits,
    ) -> Result<(), GeneratorError> {
        let Some(declared) = &entity.query_paths else {
            return Ok(());
        };

        let mut remaining = Vec::with_capacity(declared.len());
        for decl in declared.iter() {
            remaining.push(QueryPath::parse(decl, self.separator)?);
        }
        for (index, query_path) in remaining.iter().enumerate() {
            if remaining[..index]
                .iter()
                .any(|earlier| earlier.rendered() == query_path.rendered())
            {
                return Err(GeneratorError::DuplicateQueryPath {
                    entity: entity_name.to_string(),
                    path: query_path.source().to_string(),
                });
            }
        }

        let well_known = entity.well_known_urls();
        for edge in edges {
            let mut stack = vec![edge.clone()];

            if self.options.include_impl {
                if let Some(implementation) = &entity.implementation {
                    let anchor = PathPrefix::Implementation {
                        path: implementation.path.clone(),
                        target_entity: entity_ref.to_string(),
                    };
                    let mut scratch = remaining.clone();
                    self.traverse(&mut scratch, &anchor, &mut stack, edges, kits)?;
                }
            }

            if well_known.is_empty() {
                let anchor = PathPrefix::EntityUrl {
                    target_entity: entity_ref.to_string(),
                };
                self.traverse(&mut remaining, &anchor, &mut stack, edges, kits)?;
            } else {
                // Each URL consumes from its own copy; the emissions differ
                // only in prefix, so every copy leaves the same leftover.
                let mut leftover = remaining.clone();
                for url in &well_known {
                    let mut scratch = remaining.clone();
                    let anchor = PathPrefix::WellKnown {
                        base_url: url.clone(),
                        target_entity: entity_ref.to_string(),
                    };
                    self.traverse(&mut scratch, &anchor, &mut stack, edges, kits)?;
                    leftover = scratch;
                }
                remaining = leftover;
            }
        }

        if remaining.is_empty() {
            Ok(())
        } else {
            Err(GeneratorError::UnmatchedQueryPaths {
                entity: entity_name.to_string(),
                paths: remaining
                    .iter()
                    .map(|query_path| query_path.source().to_string())
                    .collect(),
            })
        }
    }

    /// Walks every chain extending the seeded stack, testing the remaining
    /// query paths at each chain state. Pushes and pops balance, so the
    /// stack comes back in the state it was seeded with.
    fn traverse(
        &mut self,
        remaining: &mut Vec<QueryPath>,
        anchor: &PathPrefix,
        stack: &mut Vec<RelationshipEdge>,
        seed_siblings: &[RelationshipEdge],
        kits: &StandardKits,
    ) -> Result<(), GeneratorError> {
        self.match_remaining(remaining, anchor, stack, seed_siblings, kits)?;

        let seed_target = match stack.last() {
            Some(edge) => edge.target_entity.clone(),
            None => return Ok(()),
        };
        let mut frames = vec![Frame {
            candidates: self.edges_of_target(&seed_target)?,
            next: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            if frame.next >= frame.candidates.len() {
                frames.pop();
                if frames.is_empty() {
                    break;
                }
                stack.pop();
                continue;
            }
            let edge = frame.candidates[frame.next].clone();
            frame.next += 1;
            // Cycle guard: never push an edge already on the chain.
            if stack.contains(&edge) {
                continue;
            }
            let siblings = frame.candidates.clone();
            let target = edge.target_entity.clone();
            stack.push(edge);
            self.match_remaining(remaining, anchor, stack, &siblings, kits)?;
            frames.push(Frame {
                candidates: self.edges_of_target(&target)?,
                next: 0,
            });
        }
        Ok(())
    }

    fn edges_of_target(&self, reference: &str) -> Result<Vec<RelationshipEdge>, GeneratorError> {
        let (name, entity) = self.catalog.resolve(reference, "relationship traversal")?;
        extract_relationships(reference, name, entity)
    }

    /// Tests every remaining query path against the current chain; each
    /// match is consumed and emitted.
    fn match_remaining(
        &mut self,
        remaining: &mut Vec<QueryPath>,
        anchor: &PathPrefix,
        stack: &[RelationshipEdge],
        siblings: &[RelationshipEdge],
        kits: &StandardKits,
    ) -> Result<(), GeneratorError> {
        let mut index = 0;
        while index < remaining.len() {
            if remaining[index].matches(stack) {
                let query_path = remaining.remove(index);
                self.emit_query_path(anchor, &query_path, stack, siblings, kits)?;
            } else {
                index += 1;
            }
        }
        Ok(())
    }

    /// Emits the interface for one matched chain, honoring privacy
    /// suppression and the first-producer-wins rule.
    fn emit_query_path(
        &mut self,
        anchor: &PathPrefix,
        query_path: &QueryPath,
        stack: &[RelationshipEdge],
        siblings: &[RelationshipEdge],
        kits: &StandardKits,
    ) -> Result<(), GeneratorError> {
        let last = stack.len() - 1;
        for (position, edge) in stack.iter().enumerate() {
            if edge.is_multi_valued()
                && query_path.segments[position].parameter_name.is_none()
                && position != last
            {
                return Err(GeneratorError::AmbiguousSegment {
                    path: query_path.source().to_string(),
                });
            }
        }

        let is_private = stack.iter().any(|edge| edge.private);
        // Private chains are implementation artifacts: suppressed entirely
        // from public output, and never anchored at an entity URL when
        // implementation output is requested.
        if self.options.include_impl && anchor.is_uri_anchor() {
            return Ok(());
        }
        if is_private && !self.options.include_impl {
            return Ok(());
        }

        let path = format!(
            "{}/{}",
            anchor.path_segment(&self.catalog)?,
            query_path.rendered()
        );
        let already_emitted = if anchor.is_uri_anchor() {
            self.uris.contains_key(path.as_str())
        } else {
            self.paths.contains_key(path.as_str())
        };
        if already_emitted {
            return Ok(());
        }

        let is_collection = stack[last].is_collection_resource()
            && query_path.segments[last].parameter_name.is_none();
        let interface = if is_collection {
            self.build_collection_interface(anchor, query_path, stack, siblings, kits)?
        } else {
            // A shared property name reaching several target entities makes
            // the response polymorphic.
            let mut candidates: Vec<String> = siblings
                .iter()
                .filter(|sibling| sibling.property_name == stack[last].property_name)
                .map(|sibling| sibling.target_entity.clone())
                .collect();
            if candidates.len() < 2 {
                candidates.clear();
            }
            self.build_entity_interface(anchor, Some((query_path, stack)), &candidates, kits)?
        };
        let target = if anchor.is_uri_anchor() {
            &mut self.uris
        } else {
            &mut self.paths
        };
        target.insert(text(&path), interface);
        Ok(())
    }
}
