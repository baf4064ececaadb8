//! Tauri event bus adapter.

use screenmind_events::{EmitError, EventBus};
use tauri::{AppHandle, Emitter, Runtime};

/// EventBus implementation that emits to every webview via Tauri.
pub struct TauriEventBus<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriEventBus<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> EventBus for TauriEventBus<R> {
    fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EmitError> {
        // Tauri hands the payload to the webview's event loop, which is the
        // scripting layer's own thread.
        self.app
            .emit(topic, payload)
            .map_err(|e| EmitError::Unavailable(e.to_string()))
    }
}
