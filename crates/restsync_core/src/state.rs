use crate::{Collection, CollectionSnapshot, Entity, EntityId, StorePolicy, Upsert};

/// Local working set of one store plus the policy it was opened with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreState {
    collection: Collection,
    policy: StorePolicy,
    version: u64,
    closed: bool,
}

impl StoreState {
    pub fn new(policy: StorePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot::new(self.version, &self.collection)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Marks the state dead; later messages are ignored.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub(crate) fn replace(&mut self, collection: Collection) {
        self.collection = collection;
        self.version += 1;
    }

    pub(crate) fn upsert(&mut self, entity: Entity) -> Upsert {
        self.version += 1;
        self.collection.upsert(entity)
    }

    pub(crate) fn remove(&mut self, id: &EntityId) -> bool {
        let removed = self.collection.remove(id).is_some();
        if removed {
            self.version += 1;
        }
        removed
    }
}
