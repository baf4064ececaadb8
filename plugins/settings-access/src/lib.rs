//! Tauri plugin exposing the `SettingsAccess` module.
//!
//! Commands answer whether usage-stats, notification-listener and DND
//! policy access are granted, and open the matching settings screens.
//! Failed queries reject with `{ code, message }`.

use std::sync::Arc;

use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

use screenmind_capabilities::{CapabilityPlatform, CapabilityProber, UnsupportedPlatform};

mod commands;

const PLUGIN_NAME: &str = "screenmind-settings";

/// Plugin for hosts without these capabilities; every query reports
/// not granted.
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    init_with_platform(Arc::new(UnsupportedPlatform::default()))
}

/// Plugin backed by a host-provided platform.
pub fn init_with_platform<R: Runtime>(platform: Arc<dyn CapabilityPlatform>) -> TauriPlugin<R> {
    Builder::new(PLUGIN_NAME)
        .invoke_handler(tauri::generate_handler![
            commands::get_name,
            commands::has_usage_stats_access,
            commands::has_notification_listener_access,
            commands::has_dnd_access,
            commands::capability_status,
            commands::open_usage_access_settings,
            commands::open_notification_access_settings,
            commands::open_dnd_access_settings,
        ])
        .setup(move |app, _api| {
            tracing::debug!(sdk_int = platform.sdk_int(), "settings access plugin ready");
            app.manage(CapabilityProber::new(platform));
            Ok(())
        })
        .build()
}
