use crate::{Candidate, CollectionSnapshot, EntityId};

/// A request the engine has to send on behalf of the store.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    List,
    Create(Candidate),
    Delete(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Remote(RemoteCall),
    /// Hand this snapshot to every subscriber.
    Notify(CollectionSnapshot),
}
