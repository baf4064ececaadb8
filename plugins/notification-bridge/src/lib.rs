//! Tauri plugin exposing the `NotificationBridge` module.
//!
//! On setup the plugin registers a [`NotificationBridge`] on the shared
//! notification channel and relays every captured notification to the
//! webview as a `SCREENMIND_NOTIFICATION` event. The bridge is torn down
//! when the plugin is dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

use screenmind_bridge::{BridgeConfig, NotificationBridge};
use screenmind_listener::{ListenerConfig, ListenerService};
use screenmind_transport::{ChannelRef, LocalBroadcastChannel};

mod adapters;
mod commands;

pub use adapters::TauriEventBus;

const PLUGIN_NAME: &str = "screenmind-notifications";

/// Plugin state: the bridge plus the listener service feeding its channel.
pub struct NotificationState {
    bridge: Mutex<Option<NotificationBridge>>,
    listener: ListenerService,
}

impl NotificationState {
    /// Listener service to hand OS notification callbacks to.
    pub fn listener(&self) -> &ListenerService {
        &self.listener
    }

    fn lock_bridge(&self) -> MutexGuard<'_, Option<NotificationBridge>> {
        self.bridge.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn teardown(&self) {
        if let Some(mut bridge) = self.lock_bridge().take() {
            bridge.teardown();
        }
    }
}

/// Access to the notification plugin from any Tauri manager.
pub trait NotificationsExt<R: Runtime> {
    fn notifications(&self) -> &NotificationState;
}

impl<R: Runtime, T: Manager<R>> NotificationsExt<R> for T {
    fn notifications(&self) -> &NotificationState {
        self.state::<NotificationState>().inner()
    }
}

/// Plugin with an in-process channel and default settings.
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    init_with(
        Arc::new(LocalBroadcastChannel::new()),
        ListenerConfig::default(),
        BridgeConfig::default(),
    )
}

/// Plugin on a caller-provided channel.
pub fn init_with<R: Runtime>(
    channel: ChannelRef,
    listener_config: ListenerConfig,
    bridge_config: BridgeConfig,
) -> TauriPlugin<R> {
    Builder::new(PLUGIN_NAME)
        .invoke_handler(tauri::generate_handler![
            commands::get_name,
            commands::test_module,
            commands::bridge_stats,
        ])
        .setup(move |app, _api| {
            let bus = Arc::new(TauriEventBus::new(app.clone()));

            // A failed registration leaves the app running without relay.
            let bridge = match NotificationBridge::init(channel.as_ref(), bus, bridge_config) {
                Ok(bridge) => Some(bridge),
                Err(e) => {
                    tracing::error!(error = %e, "failed to start notification bridge");
                    None
                }
            };

            app.manage(NotificationState {
                bridge: Mutex::new(bridge),
                listener: ListenerService::new(channel, listener_config),
            });

            Ok(())
        })
        .on_drop(|app| {
            if let Some(state) = app.try_state::<NotificationState>() {
                state.teardown();
            }
        })
        .build()
}
