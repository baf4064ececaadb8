//! The notification listener service callback.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Deserialize;

use screenmind_events::{event_names, DEFAULT_HOST_PACKAGE};
use screenmind_transport::{ChannelRef, Intent};

use crate::clock::{ClockRef, SystemClock};
use crate::extract::{capture, DEFAULT_TITLE_EXTRA};
use crate::handle::NotificationHandle;

/// Listener service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListenerConfig {
    /// Package that sends and receives the relay intents.
    pub host_package: String,
    pub channel_action: String,
    /// Extras key the title is read from.
    pub title_extra_key: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host_package: DEFAULT_HOST_PACKAGE.to_string(),
            channel_action: event_names::NOTIFICATION.to_string(),
            title_extra_key: DEFAULT_TITLE_EXTRA.to_string(),
        }
    }
}

/// What happened to one posted notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// Sent; the number of receivers it was queued for (possibly zero).
    Delivered(usize),
    /// The handle was malformed; nothing was sent.
    Skipped,
    /// Extraction succeeded but the channel refused the intent.
    Failed,
}

/// Receives every posted system notification and relays it to the host
/// application over the transport.
pub struct ListenerService {
    channel: ChannelRef,
    clock: ClockRef,
    config: ListenerConfig,
}

impl ListenerService {
    pub fn new(channel: ChannelRef, config: ListenerConfig) -> Self {
        Self::with_clock(channel, config, Arc::new(SystemClock))
    }

    pub fn with_clock(channel: ChannelRef, config: ListenerConfig, clock: ClockRef) -> Self {
        Self {
            channel,
            clock,
            config,
        }
    }

    /// OS callback for a newly posted notification.
    ///
    /// May run on any thread. Never panics and never returns an error: a
    /// bad notification is logged and dropped so the next one still gets
    /// through.
    pub fn on_notification_posted(&self, handle: &dyn NotificationHandle) -> PostOutcome {
        match catch_unwind(AssertUnwindSafe(|| self.relay(handle))) {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(%reason, "panic while processing notification");
                PostOutcome::Skipped
            }
        }
    }

    fn relay(&self, handle: &dyn NotificationHandle) -> PostOutcome {
        let Some(event) = capture(handle, &self.config.title_extra_key, self.clock.as_ref()) else {
            return PostOutcome::Skipped;
        };

        tracing::debug!(
            package = event.source_package(),
            title = event.title(),
            ts = event.timestamp_millis(),
            "notification received"
        );

        let intent = Intent::new(&self.config.channel_action, &self.config.host_package)
            .with_package(&self.config.host_package)
            .with_extras(event.into_extras());

        match self.channel.send(intent) {
            Ok(delivered) => {
                tracing::debug!(delivered, "notification broadcast sent");
                PostOutcome::Delivered(delivered)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to broadcast notification");
                PostOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::handle::{Extras, HandleError, StatusBarNotification};
    use screenmind_events::NotificationEvent;
    use screenmind_transport::{
        Channel, IntentFilter, LocalBroadcastChannel, ReceiverFlags, ReceiverRegistration,
    };

    struct PanickingHandle;

    impl NotificationHandle for PanickingHandle {
        fn package_name(&self) -> Result<Option<String>, HandleError> {
            panic!("binder died");
        }

        fn extras(&self) -> Result<Option<Extras>, HandleError> {
            Ok(None)
        }
    }

    fn setup() -> (Arc<LocalBroadcastChannel>, ListenerService) {
        let channel = Arc::new(LocalBroadcastChannel::new());
        let service = ListenerService::with_clock(
            channel.clone(),
            ListenerConfig::default(),
            Arc::new(FixedClock(1_700_000_000_000)),
        );
        (channel, service)
    }

    fn register(channel: &LocalBroadcastChannel, package: &str) -> screenmind_transport::Subscription {
        channel
            .register(ReceiverRegistration::new(
                "test",
                package,
                IntentFilter::new(event_names::NOTIFICATION),
                ReceiverFlags::Legacy,
            ))
            .unwrap()
    }

    #[test]
    fn test_posted_notification_reaches_host_receiver() {
        let (channel, service) = setup();
        let sub = register(&channel, DEFAULT_HOST_PACKAGE);

        let sbn = StatusBarNotification::new("com.bank.app")
            .with_extra("android.title", "Payment received");
        assert_eq!(service.on_notification_posted(&sbn), PostOutcome::Delivered(1));

        let intent = sub.receiver().try_recv().unwrap();
        assert_eq!(intent.package.as_deref(), Some(DEFAULT_HOST_PACKAGE));
        assert_eq!(intent.sender_package, DEFAULT_HOST_PACKAGE);
        let event = NotificationEvent::from_extras(&intent.extras, 0).unwrap();
        assert_eq!(
            event,
            NotificationEvent::new("com.bank.app", "Payment received", 1_700_000_000_000)
        );
        assert!(sub.receiver().try_recv().is_err());
    }

    #[test]
    fn test_intent_is_not_visible_to_other_packages() {
        let (channel, service) = setup();
        let foreign = register(&channel, "com.spy");

        let outcome = service.on_notification_posted(&StatusBarNotification::new("com.chat"));
        assert_eq!(outcome, PostOutcome::Delivered(0));
        assert!(foreign.receiver().is_empty());
    }

    #[test]
    fn test_malformed_notification_sends_nothing() {
        let (channel, service) = setup();
        let sub = register(&channel, DEFAULT_HOST_PACKAGE);

        let outcome = service.on_notification_posted(&StatusBarNotification::default());
        assert_eq!(outcome, PostOutcome::Skipped);
        assert!(sub.receiver().is_empty());
        assert_eq!(channel.sent_count(), 0);
    }

    #[test]
    fn test_panicking_handle_is_contained() {
        let (channel, service) = setup();
        let sub = register(&channel, DEFAULT_HOST_PACKAGE);

        assert_eq!(service.on_notification_posted(&PanickingHandle), PostOutcome::Skipped);

        // The next notification still goes through.
        let outcome = service.on_notification_posted(&StatusBarNotification::new("com.next"));
        assert_eq!(outcome, PostOutcome::Delivered(1));
        assert_eq!(sub.receiver().len(), 1);
    }

    #[test]
    fn test_closed_channel_reports_failure() {
        let (channel, service) = setup();
        channel.close();

        let outcome = service.on_notification_posted(&StatusBarNotification::new("com.chat"));
        assert_eq!(outcome, PostOutcome::Failed);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ListenerConfig =
            serde_json::from_str(r#"{"hostPackage": "com.example"}"#).unwrap();
        assert_eq!(config.host_package, "com.example");
        assert_eq!(config.channel_action, event_names::NOTIFICATION);
        assert_eq!(config.title_extra_key, DEFAULT_TITLE_EXTRA);
    }
}
