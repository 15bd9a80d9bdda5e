//! Restsync core: pure collection state machine, notification plumbing and
//! page assembly. Nothing in this crate performs IO.
mod collection;
mod effect;
mod entity;
mod msg;
mod notify;
mod pages;
mod policy;
mod state;
mod update;

pub use collection::{Collection, CollectionSnapshot, DuplicateId, Upsert};
pub use effect::{Effect, RemoteCall};
pub use entity::{Candidate, CandidateError, Entity, EntityId};
pub use msg::Msg;
pub use notify::{ChannelSink, SnapshotSink, SubscriptionId, Subscribers};
pub use pages::{plan_pages, PageAssembler, PageError, PendingPage};
pub use policy::{CreatePolicy, Reconciliation, RemovalRefresh, StorePolicy};
pub use state::StoreState;
pub use update::update;
