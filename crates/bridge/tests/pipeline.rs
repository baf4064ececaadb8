//! End-to-end tests: listener service -> broadcast channel -> bridge -> event bus.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use screenmind_bridge::{BridgeConfig, NotificationBridge};
use screenmind_events::{
    event_names, EmitError, EventBus, InMemoryEventBus, NotificationPayload,
};
use screenmind_listener::{
    FixedClock, ListenerConfig, ListenerService, PostOutcome, StatusBarNotification,
    DEFAULT_TITLE_EXTRA,
};
use screenmind_transport::LocalBroadcastChannel;

const T: i64 = 1_718_000_000_000;

fn setup() -> (Arc<LocalBroadcastChannel>, ListenerService, Arc<InMemoryEventBus>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("screenmind=debug")
        .with_test_writer()
        .try_init();

    let channel = Arc::new(LocalBroadcastChannel::new());
    let listener = ListenerService::with_clock(
        channel.clone(),
        ListenerConfig::default(),
        Arc::new(FixedClock(T)),
    );
    (channel, listener, Arc::new(InMemoryEventBus::new()))
}

fn notification(package: &str, title: &str) -> StatusBarNotification {
    StatusBarNotification::new(package).with_extra(DEFAULT_TITLE_EXTRA, title)
}

fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for bridge");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn payloads(bus: &InMemoryEventBus) -> Vec<NotificationPayload> {
    bus.events_for(event_names::NOTIFICATION)
        .into_iter()
        .map(|e| serde_json::from_value(e.payload).expect("payload shape"))
        .collect()
}

// =============================================================================
// Delivery
// =============================================================================

mod delivery {
    use super::*;

    #[test]
    fn test_bank_notification_reaches_scripting_layer_once() {
        let (channel, listener, bus) = setup();
        let bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();

        let outcome = listener.on_notification_posted(&notification("com.bank.app", "Payment received"));
        assert_eq!(outcome, PostOutcome::Delivered(1));

        wait_for(|| bridge.stats().emitted() == 1);
        assert_eq!(
            payloads(&bus),
            vec![NotificationPayload {
                package_name: "com.bank.app".into(),
                title: "Payment received".into(),
                ts: T as f64,
            }]
        );
    }

    #[test]
    fn test_order_preserved_for_bursts() {
        let (channel, listener, bus) = setup();
        let bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();

        for n in 0..50 {
            listener.on_notification_posted(&notification("com.chat", &format!("msg {n}")));
        }

        wait_for(|| bridge.stats().emitted() == 50);
        let titles: Vec<String> = payloads(&bus).into_iter().map(|p| p.title).collect();
        let expected: Vec<String> = (0..50).map(|n| format!("msg {n}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn test_missing_title_arrives_as_empty_string() {
        let (channel, listener, bus) = setup();
        let bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();

        listener.on_notification_posted(&StatusBarNotification::new("com.silent"));

        wait_for(|| bridge.stats().emitted() == 1);
        assert_eq!(payloads(&bus)[0].title, "");
    }

    #[test]
    fn test_posts_from_many_threads_are_all_emitted() {
        let (channel, listener, bus) = setup();
        let listener = Arc::new(listener);
        let bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let listener = Arc::clone(&listener);
                std::thread::spawn(move || {
                    for n in 0..10 {
                        listener.on_notification_posted(&notification(&format!("com.app{t}"), &n.to_string()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        wait_for(|| bridge.stats().emitted() == 40);
        assert_eq!(bus.len(), 40);
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_no_replay_of_notifications_before_init() {
        let (channel, listener, bus) = setup();

        for n in 0..5 {
            let outcome = listener.on_notification_posted(&notification("com.early", &n.to_string()));
            assert_eq!(outcome, PostOutcome::Delivered(0));
        }

        let bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();
        listener.on_notification_posted(&notification("com.late", "after init"));

        wait_for(|| bridge.stats().emitted() == 1);
        let received = payloads(&bus);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].package_name, "com.late");
    }

    #[test]
    fn test_nothing_emitted_after_teardown() {
        let (channel, listener, bus) = setup();
        let mut bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();

        listener.on_notification_posted(&notification("com.a", "before"));
        wait_for(|| bridge.stats().emitted() == 1);

        bridge.teardown();
        let outcome = listener.on_notification_posted(&notification("com.a", "after"));
        assert_eq!(outcome, PostOutcome::Delivered(0));

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(bus.len(), 1);
    }

    /// Records events, taking a while for each.
    struct SlowBus(InMemoryEventBus);

    impl EventBus for SlowBus {
        fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EmitError> {
            std::thread::sleep(Duration::from_millis(5));
            self.0.emit(topic, payload)
        }
    }

    #[test]
    fn test_teardown_flushes_delivered_notifications() {
        let (channel, listener, _) = setup();
        let bus = Arc::new(SlowBus(InMemoryEventBus::new()));
        let mut bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();

        for n in 0..20 {
            let outcome = listener.on_notification_posted(&notification("com.queue", &n.to_string()));
            assert_eq!(outcome, PostOutcome::Delivered(1));
        }
        bridge.teardown();

        assert_eq!(bridge.stats().emitted(), 20);
        let titles: Vec<String> = payloads(&bus.0).into_iter().map(|p| p.title).collect();
        let expected: Vec<String> = (0..20).map(|n| n.to_string()).collect();
        assert_eq!(titles, expected);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(bus.0.len(), 20);
    }

    /// Tears its bridge down from inside the first emission.
    struct TeardownOnEmit {
        bridge: std::sync::Mutex<Option<NotificationBridge>>,
        inner: InMemoryEventBus,
    }

    impl EventBus for TeardownOnEmit {
        fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EmitError> {
            self.inner.emit(topic, payload)?;
            if let Some(mut bridge) = self.bridge.lock().unwrap().take() {
                bridge.teardown();
            }
            Ok(())
        }
    }

    #[test]
    fn test_teardown_from_emission_discards_rest_of_queue() {
        let (channel, listener, _) = setup();
        let bus = Arc::new(TeardownOnEmit {
            bridge: std::sync::Mutex::new(None),
            inner: InMemoryEventBus::new(),
        });

        // Queue everything before the bridge can take its lock.
        let mut slot = bus.bridge.lock().unwrap();
        let bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();
        for n in 0..5 {
            listener.on_notification_posted(&notification("com.queue", &n.to_string()));
        }
        *slot = Some(bridge);
        drop(slot);

        wait_for(|| channel.receiver_count(event_names::NOTIFICATION) == 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(bus.inner.len(), 1);
    }

    #[test]
    fn test_reinit_after_teardown() {
        let (channel, listener, bus) = setup();
        let mut first =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();
        first.teardown();

        let second =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();
        listener.on_notification_posted(&notification("com.b", "again"));

        wait_for(|| second.stats().emitted() == 1);
        assert_eq!(bus.len(), 1);
    }
}

// =============================================================================
// Failure isolation
// =============================================================================

mod failures {
    use super::*;

    /// Fails every other emission.
    struct FlakyBus {
        calls: AtomicUsize,
        inner: InMemoryEventBus,
    }

    impl EventBus for FlakyBus {
        fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EmitError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                return Err(EmitError::Unavailable("webview reloading".into()));
            }
            self.inner.emit(topic, payload)
        }
    }

    struct PanickingBus;

    impl EventBus for PanickingBus {
        fn emit(&self, _topic: &str, _payload: serde_json::Value) -> Result<(), EmitError> {
            panic!("scripting runtime crashed");
        }
    }

    #[test]
    fn test_emission_failures_do_not_block_later_events() {
        let (channel, listener, _) = setup();
        let bus = Arc::new(FlakyBus {
            calls: AtomicUsize::new(0),
            inner: InMemoryEventBus::new(),
        });
        let bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();

        for n in 0..4 {
            listener.on_notification_posted(&notification("com.x", &n.to_string()));
        }

        wait_for(|| bridge.stats().emitted() + bridge.stats().failed() == 4);
        assert_eq!(bridge.stats().emitted(), 2);
        assert_eq!(bridge.stats().failed(), 2);
        assert_eq!(payloads(&bus.inner).len(), 2);
    }

    #[test]
    fn test_panicking_bus_does_not_kill_bridge() {
        let (channel, listener, _) = setup();
        let mut bridge = NotificationBridge::init(
            &*channel,
            Arc::new(PanickingBus),
            BridgeConfig::default(),
        )
        .unwrap();

        listener.on_notification_posted(&notification("com.x", "1"));
        listener.on_notification_posted(&notification("com.x", "2"));

        wait_for(|| bridge.stats().failed() == 2);
        assert!(bridge.is_active());
        bridge.teardown();
    }

    #[test]
    fn test_malformed_handle_sends_nothing() {
        let (channel, listener, bus) = setup();
        let _bridge =
            NotificationBridge::init(&*channel, bus.clone(), BridgeConfig::default())
                .unwrap();

        let outcome = listener.on_notification_posted(&StatusBarNotification::default());
        assert_eq!(outcome, PostOutcome::Skipped);
        assert_eq!(channel.sent_count(), 0);
    }
}
