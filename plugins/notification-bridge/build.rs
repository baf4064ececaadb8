fn main() {
    tauri_plugin::Builder::new(&["get_name", "test_module", "bridge_stats"]).build();
}
