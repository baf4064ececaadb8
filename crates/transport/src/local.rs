//! In-process broadcast channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crossbeam_channel::Sender;

use crate::error::{Result, TransportError};
use crate::{Channel, Intent, ReceiverRegistration, Subscription};

struct ReceiverEntry {
    id: u64,
    registration: ReceiverRegistration,
    tx: Sender<Intent>,
}

#[derive(Default)]
struct Registry {
    receivers: Vec<ReceiverEntry>,
    closed: bool,
}

type SharedRegistry = Arc<Mutex<Registry>>;

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // Registry updates are single pushes/retains, so a poisoned guard is
    // still consistent.
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

/// Broadcast channel living inside one process.
///
/// Every registered receiver gets its own unbounded FIFO queue. Sends hold
/// the registry lock while enqueueing, so concurrent senders are totally
/// ordered and each receiver sees intents in send order. Nothing is
/// retained for receivers that register later.
pub struct LocalBroadcastChannel {
    registry: SharedRegistry,
    next_id: AtomicU64,
    sent: AtomicU64,
    dropped: AtomicU64,
}

impl Default for LocalBroadcastChannel {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            next_id: AtomicU64::new(1),
            sent: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }
}

impl LocalBroadcastChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shut the channel down. Pending queues disconnect once drained.
    pub fn close(&self) {
        let mut registry = lock(&self.registry);
        registry.closed = true;
        let count = registry.receivers.len();
        registry.receivers.clear();
        tracing::info!(receivers = count, "broadcast channel closed");
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.registry).closed
    }

    /// Number of live receivers registered for `action`.
    pub fn receiver_count(&self, action: &str) -> usize {
        lock(&self.registry)
            .receivers
            .iter()
            .filter(|r| r.registration.filter.action == action)
            .count()
    }

    /// Intents sent so far, including those that reached nobody.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Intents that matched no receiver.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn release_handle(registry: Weak<Mutex<Registry>>, id: u64) -> impl FnOnce() + Send + 'static {
        move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).receivers.retain(|r| r.id != id);
            }
        }
    }
}

impl Channel for LocalBroadcastChannel {
    fn send(&self, intent: Intent) -> Result<usize> {
        if intent.action.is_empty() {
            return Err(TransportError::EmptyAction);
        }

        let mut registry = lock(&self.registry);
        if registry.closed {
            return Err(TransportError::Closed);
        }

        let mut delivered = 0;
        let mut disconnected = Vec::new();
        for entry in registry
            .receivers
            .iter()
            .filter(|r| r.registration.accepts(&intent))
        {
            if entry.tx.send(intent.clone()).is_ok() {
                delivered += 1;
            } else {
                disconnected.push(entry.id);
            }
        }

        if !disconnected.is_empty() {
            registry.receivers.retain(|r| !disconnected.contains(&r.id));
            tracing::debug!(pruned = disconnected.len(), "pruned disconnected receivers");
        }
        drop(registry);

        self.sent.fetch_add(1, Ordering::Relaxed);
        if delivered == 0 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(action = %intent.action, "no receiver registered, intent dropped");
        }

        Ok(delivered)
    }

    fn register(&self, registration: ReceiverRegistration) -> Result<Subscription> {
        let mut registry = lock(&self.registry);
        if registry.closed {
            return Err(TransportError::Closed);
        }

        let duplicate = registry.receivers.iter().any(|r| {
            r.registration.name == registration.name
                && r.registration.filter == registration.filter
        });
        if duplicate {
            return Err(TransportError::AlreadyRegistered {
                name: registration.name,
                action: registration.filter.action,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = crossbeam_channel::unbounded();

        tracing::debug!(
            subscription = id,
            name = %registration.name,
            package = %registration.package,
            action = %registration.filter.action,
            flags = ?registration.flags,
            "receiver registered"
        );

        registry.receivers.push(ReceiverEntry {
            id,
            registration,
            tx,
        });
        drop(registry);

        let release = Self::release_handle(Arc::downgrade(&self.registry), id);
        Ok(Subscription::new(id, rx, release))
    }
}
