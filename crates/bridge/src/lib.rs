//! Notification bridge.
//!
//! Owns the host application's receiver on the notification channel and
//! re-emits every delivered notification to the scripting layer under
//! [`event_names::NOTIFICATION`]. Construction registers the receiver;
//! [`NotificationBridge::teardown`] releases it.
//!
//! Delivered intents are drained by a single worker thread, so emissions
//! reach the [`EventBus`] one at a time and in delivery order no matter
//! which thread sent them.

mod convert;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use serde::Deserialize;

use crossbeam_channel::{select, Sender};

use screenmind_events::{event_names, module_names, EventBus, EventBusRef, DEFAULT_HOST_PACKAGE};
use screenmind_transport::{
    Channel, Intent, IntentFilter, ReceiverRegistration, Subscription, TransportError,
    SDK_TIRAMISU,
};

pub use convert::{to_script_payload, ConversionError};

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to register notification receiver: {0}")]
    Register(#[from] TransportError),

    #[error("failed to spawn bridge worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Package the receiver is registered under.
    pub host_package: String,
    pub channel_action: String,
    /// Event name used toward the scripting layer.
    pub event_name: String,
    /// Platform SDK level; decides the receiver export flags.
    pub sdk_int: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host_package: DEFAULT_HOST_PACKAGE.to_string(),
            channel_action: event_names::NOTIFICATION.to_string(),
            event_name: event_names::NOTIFICATION.to_string(),
            sdk_int: SDK_TIRAMISU,
        }
    }
}

/// Counters updated by the bridge worker.
#[derive(Debug, Default)]
pub struct BridgeStats {
    emitted: AtomicU64,
    failed: AtomicU64,
}

impl BridgeStats {
    /// Events handed to the scripting layer.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Acquire)
    }

    /// Delivered intents that could not be converted or emitted.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Acquire)
    }
}

/// Relays notification intents to the scripting layer.
pub struct NotificationBridge {
    subscription: Option<Subscription>,
    worker: Option<JoinHandle<()>>,
    /// Dropped on teardown to wake the worker.
    stop: Option<Sender<()>>,
    closed: Arc<AtomicBool>,
    /// Set when torn down from the worker itself; queued intents are discarded.
    abandoned: Arc<AtomicBool>,
    stats: Arc<BridgeStats>,
}

impl NotificationBridge {
    /// Register on `channel` and start relaying to `bus`.
    pub fn init(
        channel: &dyn Channel,
        bus: EventBusRef,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        tracing::debug!(
            package = %config.host_package,
            action = %config.channel_action,
            "notification bridge constructed"
        );

        let registration = ReceiverRegistration::for_sdk(
            module_names::NOTIFICATION_BRIDGE,
            &config.host_package,
            IntentFilter::new(&config.channel_action),
            config.sdk_int,
        );
        let flags = registration.flags;
        let subscription = channel.register(registration)?;
        tracing::info!(
            subscription = subscription.id(),
            ?flags,
            sdk_int = config.sdk_int,
            "notification receiver registered"
        );

        let closed = Arc::new(AtomicBool::new(false));
        let abandoned = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(BridgeStats::default());

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let worker = {
            let receiver = subscription.receiver().clone();
            let abandoned = Arc::clone(&abandoned);
            let stats = Arc::clone(&stats);
            let event_name = config.event_name;

            std::thread::Builder::new()
                .name("notification-bridge".into())
                .spawn(move || {
                    let deliver = |intent: Intent| {
                        if !abandoned.load(Ordering::Acquire) {
                            relay(&intent, &event_name, bus.as_ref(), &stats);
                        }
                    };
                    loop {
                        let running = select! {
                            recv(receiver) -> intent => match intent {
                                Ok(intent) => {
                                    deliver(intent);
                                    true
                                }
                                Err(_) => false,
                            },
                            recv(stop_rx) -> _ => {
                                // Unregistered: nothing new can be queued, so
                                // flush what was already delivered.
                                receiver.try_iter().for_each(&deliver);
                                false
                            }
                        };
                        if !running {
                            break;
                        }
                    }
                    tracing::debug!("notification bridge worker stopped");
                })?
        };

        Ok(Self {
            subscription: Some(subscription),
            worker: Some(worker),
            stop: Some(stop_tx),
            closed,
            abandoned,
            stats,
        })
    }

    /// Module name reported to the scripting layer.
    pub fn name(&self) -> &'static str {
        module_names::NOTIFICATION_BRIDGE
    }

    /// Diagnostic hook: logs that the module is reachable.
    pub fn test_module(&self) {
        tracing::debug!(active = self.is_active(), "testModule() called, bridge is loaded");
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    pub fn is_active(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    /// Release the receiver and stop relaying.
    ///
    /// Intents already delivered to the receiver are emitted before this
    /// returns; nothing is emitted afterwards. Idempotent. A new bridge may
    /// register on the same channel once this returns.
    pub fn teardown(&mut self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(mut subscription) = self.subscription.take() {
            subscription.unregister();
        }
        drop(self.stop.take());

        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == std::thread::current().id() {
                // Called from an emission on the worker itself; it exits on
                // its own once the current event returns.
                self.abandoned.store(true, Ordering::Release);
                tracing::debug!("bridge torn down from its own worker");
            } else if worker.join().is_err() {
                tracing::error!("notification bridge worker panicked");
            }
        }

        tracing::info!(
            emitted = self.stats.emitted(),
            failed = self.stats.failed(),
            "notification bridge torn down"
        );
    }
}

impl Drop for NotificationBridge {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn relay(intent: &Intent, event_name: &str, bus: &dyn EventBus, stats: &BridgeStats) {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let (event, payload) = match to_script_payload(intent, now_ms) {
        Ok(converted) => converted,
        Err(e) => {
            stats.failed.fetch_add(1, Ordering::AcqRel);
            tracing::error!(error = %e, "error in notification receiver");
            return;
        }
    };

    tracing::debug!(
        package = event.source_package(),
        title = event.title(),
        "received notification broadcast"
    );

    match catch_unwind(AssertUnwindSafe(|| bus.emit(event_name, payload))) {
        Ok(Ok(())) => {
            stats.emitted.fetch_add(1, Ordering::AcqRel);
            tracing::debug!("emitted to scripting layer");
        }
        Ok(Err(e)) => {
            stats.failed.fetch_add(1, Ordering::AcqRel);
            tracing::error!(error = %e, "failed to emit notification");
        }
        Err(_) => {
            stats.failed.fetch_add(1, Ordering::AcqRel);
            tracing::error!("event bus panicked while emitting notification");
        }
    }
}
