//! Bidirectional lookup between source lines and graph entities.
//!
//! Every line that produced an entity has exactly one entry and every
//! entity appears on at most one line, so the two lookups are inverse of
//! each other. Entities are keyed by kind and id together. The parser
//! never derives an edge or directive id that equals a node name, so the
//! untyped [`SourceMap::resolve_line_for_entity`] is unambiguous too.
//!
//! The map is assembled with [`SourceMapBuilder`] during a parse pass and is
//! immutable afterwards.

use std::{collections::HashMap, fmt};

use thiserror::Error;

use crate::identifier::Id;

/// What kind of entity a line produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Edge,
    Direction,
    Style,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Direction => "direction",
            EntityKind::Style => "style",
        };
        write!(f, "{name}")
    }
}

/// A typed reference to a mapped entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    kind: EntityKind,
    id: Id,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: Id) -> Self {
        Self { kind, id }
    }

    pub fn kind(self) -> EntityKind {
        self.kind
    }

    pub fn id(self) -> Id {
        self.id
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.id)
    }
}

/// An attempt to break the one-entry-per-line, one-line-per-entity rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceMapConflict {
    #[error("line {line} is already mapped to {existing}")]
    LineTaken { line: usize, existing: EntityRef },

    #[error("{entity} is already mapped to line {existing_line}")]
    EntityTaken { entity: EntityRef, existing_line: usize },
}

impl SourceMapConflict {
    /// The line whose insertion was rejected.
    pub fn line(&self) -> usize {
        match self {
            SourceMapConflict::LineTaken { line, .. } => *line,
            SourceMapConflict::EntityTaken { existing_line, .. } => *existing_line,
        }
    }
}

/// Line ↔ entity lookup for one parse pass.
///
/// # Examples
///
/// ```
/// use tandem_core::{
///     identifier::Id,
///     source_map::{EntityKind, EntityRef, SourceMap},
/// };
///
/// let mut builder = SourceMap::builder();
/// let edge = EntityRef::new(EntityKind::Edge, Id::new("edge_A_B_0"));
/// builder.insert(0, edge).unwrap();
/// let map = builder.build();
///
/// assert_eq!(map.resolve_entity_for_line(0), Some(edge));
/// assert_eq!(map.resolve_line_for_entity(Id::new("edge_A_B_0")), Some(0));
/// assert_eq!(map.resolve_entity_for_line(1), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMap {
    by_line: HashMap<usize, EntityRef>,
    by_entity: HashMap<EntityRef, usize>,
}

impl SourceMap {
    pub fn builder() -> SourceMapBuilder {
        SourceMapBuilder::default()
    }

    /// Returns the line that produced an entity with this id, if any.
    ///
    /// Prefer [`SourceMap::resolve_line`] when the kind is known. If a map
    /// holds the same id under several kinds, nodes win, then edges, then
    /// directives.
    pub fn resolve_line_for_entity(&self, id: Id) -> Option<usize> {
        [
            EntityKind::Node,
            EntityKind::Edge,
            EntityKind::Direction,
            EntityKind::Style,
        ]
        .into_iter()
        .find_map(|kind| self.resolve_line(EntityRef::new(kind, id)))
    }

    /// Returns the line that produced exactly this entity, if any.
    pub fn resolve_line(&self, entity: EntityRef) -> Option<usize> {
        self.by_entity.get(&entity).copied()
    }

    /// Returns the entity produced by the line, if any.
    pub fn resolve_entity_for_line(&self, line: usize) -> Option<EntityRef> {
        self.by_line.get(&line).copied()
    }

    pub fn len(&self) -> usize {
        self.by_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    /// Iterates entries in line order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, EntityRef)> + '_ {
        let mut lines: Vec<_> = self.by_line.keys().copied().collect();
        lines.sort_unstable();
        lines.into_iter().map(|line| (line, self.by_line[&line]))
    }
}

/// Collects entries while a parse pass runs.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    map: SourceMap,
}

impl SourceMapBuilder {
    /// Records that `line` produced `entity`.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceMapConflict`] when the line or the entity is
    /// already mapped; the map is left unchanged.
    pub fn insert(&mut self, line: usize, entity: EntityRef) -> Result<(), SourceMapConflict> {
        if let Some(existing) = self.map.by_line.get(&line) {
            return Err(SourceMapConflict::LineTaken {
                line,
                existing: *existing,
            });
        }
        if let Some(existing_line) = self.map.by_entity.get(&entity) {
            return Err(SourceMapConflict::EntityTaken {
                entity,
                existing_line: *existing_line,
            });
        }
        self.map.by_line.insert(line, entity);
        self.map.by_entity.insert(entity, line);
        Ok(())
    }

    /// Returns true if the entity already has a line.
    pub fn contains_entity(&self, entity: EntityRef) -> bool {
        self.map.by_entity.contains_key(&entity)
    }

    pub fn build(self) -> SourceMap {
        self.map
    }
}
