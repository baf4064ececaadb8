use serde_json::json;
use tauri::{command, State};

use screenmind_events::module_names;

use crate::NotificationState;

#[command]
pub fn get_name() -> String {
    module_names::NOTIFICATION_BRIDGE.to_string()
}

#[command]
pub fn test_module(state: State<'_, NotificationState>) {
    match state.lock_bridge().as_ref() {
        Some(bridge) => bridge.test_module(),
        None => tracing::warn!("testModule() called but bridge is not registered"),
    }
}

#[command]
pub fn bridge_stats(state: State<'_, NotificationState>) -> serde_json::Value {
    match state.lock_bridge().as_ref() {
        Some(bridge) => json!({
            "active": bridge.is_active(),
            "emitted": bridge.stats().emitted(),
            "failed": bridge.stats().failed(),
        }),
        None => json!({"active": false, "emitted": 0, "failed": 0}),
    }
}
