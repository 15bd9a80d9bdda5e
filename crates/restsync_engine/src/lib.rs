//! Restsync engine: transport, collection store and page aggregation.
mod aggregate;
mod extract;
mod store;
mod transport;
mod types;

pub use aggregate::{AggregatorSettings, PaginatedAggregator};
pub use extract::extract_at;
pub use store::CollectionStore;
pub use transport::{ReqwestTransport, Transport, TransportSettings};
pub use types::{FailureKind, Method, SyncError, TransportResponse};

pub use restsync_core::{
    Candidate, ChannelSink, CollectionSnapshot, CreatePolicy, Entity, EntityId, Reconciliation,
    RemovalRefresh, SnapshotSink, StorePolicy, SubscriptionId,
};
