use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};

type SubscriberId = u64;

/// Pending messages a subscriber may hold before it is evicted.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

struct Registry<M> {
    next_id: AtomicU64,
    queue_depth: usize,
    subscribers: Mutex<HashMap<SubscriberId, Sender<M>>>,
}

impl<M> Registry<M> {
    fn subscribers(&self) -> MutexGuard<'_, HashMap<SubscriberId, Sender<M>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fan-out of one published message to every live [`Subscription`].
///
/// Each subscriber owns a bounded queue and `publish` only enqueues, so it
/// never waits on a slow reader. A subscriber whose queue is full is evicted:
/// its queue is closed and its [`Subscription`] ends after draining what was
/// already queued. Messages published before a subscription exists are not
/// replayed to it.
pub struct Broadcaster<M> {
    registry: Arc<Registry<M>>,
}

impl<M> Clone for Broadcaster<M> {
    fn clone(&self) -> Self { Self { registry: self.registry.clone() } }
}

impl<M: Clone + Send + 'static> Default for Broadcaster<M> {
    fn default() -> Self { Self::new() }
}

impl<M: Clone + Send + 'static> Broadcaster<M> {
    pub fn new() -> Self { Self::with_queue_depth(DEFAULT_QUEUE_DEPTH) }

    pub fn with_queue_depth(queue_depth: usize) -> Self {
        let queue_depth = queue_depth.max(1);
        Self { registry: Arc::new(Registry { next_id: AtomicU64::new(0), queue_depth, subscribers: Mutex::new(HashMap::new()) }) }
    }

    pub fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel(self.registry.queue_depth);
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.subscribers().insert(id, tx);
        tracing::debug!(subscriber = id, "subscribed");
        Subscription { id, rx, registry: Arc::downgrade(&self.registry) }
    }

    /// Hands `message` to every current subscriber and returns how many
    /// accepted it. With no subscribers the message is dropped. Subscribers
    /// that are gone or full are removed from the registry.
    pub fn publish(&self, message: M) -> usize {
        // Snapshot the senders so delivery runs without the registry lock.
        let targets: Vec<(SubscriberId, Sender<M>)> =
            self.registry.subscribers().iter().map(|(id, tx)| (*id, tx.clone())).collect();

        let mut delivered = 0;
        let mut gone = Vec::new();
        for (id, tx) in targets {
            match tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = id, "subscriber queue full, evicting");
                    gone.push(id);
                }
                Err(TrySendError::Closed(_)) => gone.push(id),
            }
        }
        if !gone.is_empty() {
            let mut subscribers = self.registry.subscribers();
            for id in gone { subscribers.remove(&id); }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize { self.registry.subscribers().len() }
}

/// Receiving end of a [`Broadcaster`]. Dropping it unsubscribes.
pub struct Subscription<M> {
    id: SubscriberId,
    rx: Receiver<M>,
    registry: Weak<Registry<M>>,
}

impl<M> Subscription<M> {
    /// Next published message, or `None` once this subscriber was evicted or
    /// the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<M> { self.rx.recv().await }

    pub fn unsubscribe(self) {}
}

impl<M> Stream for Subscription<M> {
    type Item = M;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<M>> {
        self.rx.poll_recv(cx)
    }
}

impl<M> Drop for Subscription<M> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.subscribers().remove(&self.id);
            tracing::debug!(subscriber = self.id, "unsubscribed");
        }
    }
}
