use crate::{Candidate, Collection, Entity, EntityId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asked for a full resynchronization.
    LoadRequested,
    /// GET succeeded with a well-formed, duplicate-free body.
    Loaded(Collection),
    /// Caller asked to persist a new entity.
    CreateRequested(Candidate),
    /// POST succeeded and the server replied with the persisted entity.
    Created(Entity),
    /// POST succeeded; the reply body is not used.
    CreateAcknowledged,
    /// Caller asked to delete an entity.
    RemoveRequested(EntityId),
    /// DELETE succeeded.
    Removed(EntityId),
}
