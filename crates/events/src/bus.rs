//! Scripting-layer event emission.
//!
//! The scripting layer's subscription API is reached only through the
//! [`EventBus`] trait, so the bridge can run without a webview in tests and
//! in the headless relay.

use std::sync::{Arc, Mutex};

/// Error raised by an [`EventBus`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// The scripting layer is gone (webview closed, stdout broken, ...).
    #[error("event sink unavailable: {0}")]
    Unavailable(String),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Sink for events destined to scripting-layer subscribers.
pub trait EventBus: Send + Sync {
    /// Emit `payload` under the event name `topic`.
    fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EmitError>;
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// A captured event from [`InMemoryEventBus`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Event bus that records everything it is given.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.lock().clone()
    }

    /// Events recorded under `topic`, in emission order.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.lock()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
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

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<EmittedEvent>> {
        // A panicking test thread must not hide the events from the others.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EmitError> {
        self.lock().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }
}

/// Event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) -> Result<(), EmitError> {
        Ok(())
    }
}
