use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::{Entity, EntityId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate entity id {0}")]
pub struct DuplicateId(pub EntityId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Appended,
    Replaced,
}

/// Ordered set of entities keyed by id, in arrival order.
///
/// Ids are compared by the path segment they address (see
/// [`EntityId::matches`]), so `1` and `"1"` are the same entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    entities: Vec<Entity>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection in the given order, refusing bodies that repeat an id.
    pub fn from_entities(entities: Vec<Entity>) -> Result<Self, DuplicateId> {
        let mut seen = HashSet::with_capacity(entities.len());
        for entity in &entities {
            if !seen.insert(entity.id.to_string()) {
                return Err(DuplicateId(entity.id.clone()));
            }
        }
        Ok(Self { entities })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id.matches(id))
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Appends `entity`, or replaces the entry with the same id in place.
    pub fn upsert(&mut self, entity: Entity) -> Upsert {
        match self
            .entities
            .iter_mut()
            .find(|existing| existing.id.matches(&entity.id))
        {
            Some(existing) => {
                *existing = entity;
                Upsert::Replaced
            }
            None => {
                self.entities.push(entity);
                Upsert::Appended
            }
        }
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<Entity> {
        let position = self.entities.iter().position(|entity| entity.id.matches(id))?;
        Some(self.entities.remove(position))
    }
}

/// Read-only view of a collection at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    version: u64,
    entities: Arc<[Entity]>,
}

impl CollectionSnapshot {
    pub fn new(version: u64, collection: &Collection) -> Self {
        Self {
            version,
            entities: collection.as_slice().into(),
        }
    }

    /// Number of local mutations applied before this snapshot was taken.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id.matches(id))
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|entity| entity.id.clone()).collect()
    }
}

impl Default for CollectionSnapshot {
    fn default() -> Self {
        Self::new(0, &Collection::new())
    }
}
