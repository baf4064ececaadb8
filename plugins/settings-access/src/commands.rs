use tauri::{command, State};

use screenmind_capabilities::{CapabilityError, CapabilityProber, CapabilityStatus};
use screenmind_events::module_names;

#[command]
pub fn get_name() -> String {
    module_names::SETTINGS_ACCESS.to_string()
}

#[command]
pub async fn has_usage_stats_access(
    prober: State<'_, CapabilityProber>,
) -> Result<bool, CapabilityError> {
    prober.has_usage_stats_access()
}

#[command]
pub async fn has_notification_listener_access(
    prober: State<'_, CapabilityProber>,
) -> Result<bool, CapabilityError> {
    prober.has_notification_listener_access()
}

#[command]
pub async fn has_dnd_access(prober: State<'_, CapabilityProber>) -> Result<bool, CapabilityError> {
    prober.has_dnd_access()
}

#[command]
pub async fn capability_status(
    prober: State<'_, CapabilityProber>,
) -> Result<CapabilityStatus, CapabilityError> {
    prober.status()
}

#[command]
pub fn open_usage_access_settings(prober: State<'_, CapabilityProber>) {
    prober.open_usage_access_settings();
}

#[command]
pub fn open_notification_access_settings(prober: State<'_, CapabilityProber>) {
    prober.open_notification_access_settings();
}

#[command]
pub fn open_dnd_access_settings(prober: State<'_, CapabilityProber>) {
    prober.open_dnd_access_settings();
}
