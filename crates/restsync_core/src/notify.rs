use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

pub type SubscriptionId = u64;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Receives every published value. Implemented for consumers that prefer a
/// trait object over a closure.
pub trait SnapshotSink<T>: Send + Sync {
    fn emit(&self, value: &T);
}

/// Forwards published values over a channel, e.g. to a UI thread.
pub struct ChannelSink<T> {
    tx: mpsc::Sender<T>,
}

impl<T> ChannelSink<T> {
    pub fn new(tx: mpsc::Sender<T>) -> Self {
        Self { tx }
    }
}

impl<T: Clone + Send> SnapshotSink<T> for ChannelSink<T> {
    fn emit(&self, value: &T) {
        // A dropped receiver just means nobody is watching any more.
        let _ = self.tx.send(value.clone());
    }
}

/// Registration list of listeners, invoked in registration order.
///
/// Listeners run outside the internal lock, so a listener may subscribe or
/// unsubscribe (itself included) while being notified.
pub struct Subscribers<T> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn subscribe_sink(&self, sink: Arc<dyn SnapshotSink<T>>) -> SubscriptionId
    where
        T: 'static,
    {
        self.subscribe(move |value: &T| sink.emit(value))
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn publish(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener<T>)>> {
        // A panicking listener never runs under this lock, so the list itself
        // is always consistent.
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
