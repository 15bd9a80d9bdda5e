use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use restsync_core::{
    update, Candidate, Collection, CollectionSnapshot, CreatePolicy, Effect, Entity, EntityId,
    Msg, RemoteCall, SnapshotSink, StorePolicy, StoreState, SubscriptionId, Subscribers,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sync_logging::{sync_debug, sync_trace};
use url::Url;

use crate::{FailureKind, Method, SyncError, Transport};

/// Local mirror of one remote REST collection.
///
/// Cloning is cheap and every clone drives the same working set. State
/// changes go through [`restsync_core::update`] under a single lock; remote
/// calls run without it, so independent operations may overlap. Two
/// overlapping creates both land, in reply order.
#[derive(Clone)]
pub struct CollectionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    transport: Arc<dyn Transport>,
    base_url: Url,
    state: Mutex<StoreState>,
    subscribers: Subscribers<CollectionSnapshot>,
    /// Version of the last snapshot handed to subscribers.
    published: Mutex<u64>,
}

impl CollectionStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: &str,
        policy: StorePolicy,
    ) -> Result<Self, SyncError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| SyncError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot carry entity paths"),
            ));
        }
        Ok(Self {
            inner: Arc::new(StoreInner {
                transport,
                base_url,
                state: Mutex::new(StoreState::new(policy)),
                subscribers: Subscribers::new(),
                published: Mutex::new(0),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    pub fn policy(&self) -> StorePolicy {
        self.lock_state().policy()
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        self.lock_state().snapshot()
    }

    /// Registers a listener that receives a snapshot after every successful
    /// local change.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&CollectionSnapshot) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(listener)
    }

    pub fn subscribe_sink(&self, sink: Arc<dyn SnapshotSink<CollectionSnapshot>>) -> SubscriptionId {
        self.inner.subscribers.subscribe_sink(sink)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers.unsubscribe(id)
    }

    /// Tears the store down. Operations still in flight finish their remote
    /// call but fail with [`FailureKind::Closed`] instead of applying it.
    pub fn close(&self) {
        self.lock_state().close();
        self.inner.subscribers.clear();
        sync_debug!("store for {} closed", self.inner.base_url);
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().is_closed()
    }

    /// Replaces the local collection with the server's. All-or-nothing.
    pub async fn load(&self) -> Result<CollectionSnapshot, SyncError> {
        self.drive(Msg::LoadRequested).await
    }

    pub async fn create(&self, candidate: Candidate) -> Result<CollectionSnapshot, SyncError> {
        self.drive(Msg::CreateRequested(candidate)).await
    }

    /// Deletes `id` remotely. Locally a no-op when `id` is absent.
    pub async fn remove(&self, id: impl Into<EntityId>) -> Result<CollectionSnapshot, SyncError> {
        self.drive(Msg::RemoveRequested(id.into())).await
    }

    /// Runs `first` and every follow-up message its effects produce.
    async fn drive(&self, first: Msg) -> Result<CollectionSnapshot, SyncError> {
        let mut pending = VecDeque::from([first]);
        let mut latest = None;
        while let Some(msg) = pending.pop_front() {
            for effect in self.apply(msg)? {
                match effect {
                    Effect::Notify(snapshot) => {
                        self.publish(&snapshot);
                        latest = Some(snapshot);
                    }
                    Effect::Remote(call) => pending.push_back(self.execute(call).await?),
                }
            }
        }
        Ok(latest.unwrap_or_else(|| self.snapshot()))
    }

    fn apply(&self, msg: Msg) -> Result<Vec<Effect>, SyncError> {
        let mut state = self.lock_state();
        if state.is_closed() {
            return Err(SyncError::closed());
        }
        let (next, effects) = update(std::mem::take(&mut *state), msg);
        *state = next;
        sync_trace!(
            "store {} at version {} ({} entities)",
            self.inner.base_url,
            state.version(),
            state.collection().len()
        );
        Ok(effects)
    }

    /// Never called with the state lock held, so listeners may read the store.
    fn publish(&self, snapshot: &CollectionSnapshot) {
        let mut published = self
            .inner
            .published
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if snapshot.version() <= *published {
            sync_trace!(
                "skipping snapshot version {}, already published {}",
                snapshot.version(),
                *published
            );
            return;
        }
        *published = snapshot.version();
        self.inner.subscribers.publish(snapshot);
    }

    async fn execute(&self, call: RemoteCall) -> Result<Msg, SyncError> {
        match call {
            RemoteCall::List => {
                let body = self.send(Method::Get, &self.inner.base_url, None).await?;
                let entities: Vec<Entity> = decode(body, "entity array")?;
                let collection = Collection::from_entities(entities)
                    .map_err(|err| SyncError::malformed(err.to_string()))?;
                Ok(Msg::Loaded(collection))
            }
            RemoteCall::Create(candidate) => {
                let payload = candidate.to_value();
                let body = self
                    .send(Method::Post, &self.inner.base_url, Some(&payload))
                    .await?;
                match self.policy().create {
                    CreatePolicy::AppendReturned => Ok(Msg::Created(decode(body, "entity")?)),
                    CreatePolicy::Reload => Ok(Msg::CreateAcknowledged),
                }
            }
            RemoteCall::Delete(id) => {
                let url = self.entity_url(&id)?;
                self.send(Method::Delete, &url, None).await?;
                Ok(Msg::Removed(id))
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<Option<Value>, SyncError> {
        self.inner
            .transport
            .request(method, url.as_str(), body)
            .await?
            .into_success_body()
    }

    fn entity_url(&self, id: &EntityId) -> Result<Url, SyncError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        // `update` is pure, so a panic elsewhere cannot leave the state half-written.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn decode<T: DeserializeOwned>(body: Option<Value>, expected: &str) -> Result<T, SyncError> {
    let body = body.ok_or_else(|| SyncError::malformed(format!("expected {expected}, got no JSON")))?;
    serde_json::from_value(body)
        .map_err(|err| SyncError::malformed(format!("expected {expected}: {err}")))
}
