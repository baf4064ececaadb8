//! Same-device broadcast transport for captured notifications.
//!
//! The listener service sends one [`Intent`] per notification; the bridge
//! holds a [`Subscription`] and drains it. Delivery is fire-and-forget:
//! an intent that matches no live receiver is dropped, and nothing is
//! replayed to receivers that register later.

mod error;
mod intent;
mod local;
mod subscription;

use std::sync::Arc;

pub use error::{Result, TransportError};
pub use intent::{Intent, IntentFilter, ReceiverFlags, ReceiverRegistration, SDK_TIRAMISU};
pub use local::LocalBroadcastChannel;
pub use subscription::Subscription;

/// A broadcast delivery path.
///
/// Implementations must be callable from any thread.
pub trait Channel: Send + Sync {
    /// Deliver `intent` to every receiver that accepts it.
    ///
    /// Returns how many receivers it was queued for. Zero is not an error.
    fn send(&self, intent: Intent) -> Result<usize>;

    /// Register a receiver.
    fn register(&self, registration: ReceiverRegistration) -> Result<Subscription>;
}

/// Type alias for shared channel reference.
pub type ChannelRef = Arc<dyn Channel>;

impl<C: Channel + ?Sized> Channel for Arc<C> {
    fn send(&self, intent: Intent) -> Result<usize> {
        (**self).send(intent)
    }

    fn register(&self, registration: ReceiverRegistration) -> Result<Subscription> {
        (**self).register(registration)
    }
}
