fn main() {
    tauri_plugin::Builder::new(&[
        "get_name",
        "has_usage_stats_access",
        "has_notification_listener_access",
        "has_dnd_access",
        "capability_status",
        "open_usage_access_settings",
        "open_notification_access_settings",
        "open_dnd_access_settings",
    ])
    .build();
}
