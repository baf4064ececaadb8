use crossbeam_channel::Receiver;

use crate::Intent;

type Release = Box<dyn FnOnce() + Send>;

/// A live receiver registration.
///
/// Intents accepted by the registration queue up on [`Subscription::receiver`]
/// in delivery order. The registration is released exactly once, either by
/// [`Subscription::unregister`] or on drop.
pub struct Subscription {
    id: u64,
    receiver: Receiver<Intent>,
    release: Option<Release>,
}

impl Subscription {
    /// Build a subscription; `release` runs once when it is unregistered.
    pub fn new(id: u64, receiver: Receiver<Intent>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            receiver,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue of intents delivered to this registration.
    pub fn receiver(&self) -> &Receiver<Intent> {
        &self.receiver
    }

    pub fn is_registered(&self) -> bool {
        self.release.is_some()
    }

    /// Release the registration. Further intents are no longer queued.
    pub fn unregister(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            tracing::debug!(subscription = self.id, "receiver unregistered");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("registered", &self.is_registered())
            .field("queued", &self.receiver.len())
            .finish()
    }
}
