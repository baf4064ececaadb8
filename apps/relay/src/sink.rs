//! Event bus writing one JSON object per line.

use std::io::Write;
use std::sync::Mutex;

use serde_json::json;

use screenmind_events::{EmitError, EventBus};

pub struct LineEventBus<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> LineEventBus<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> EventBus for LineEventBus<W> {
    fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EmitError> {
        let line = serde_json::to_string(&json!({"event": topic, "payload": payload}))?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| EmitError::Unavailable("output lock poisoned".into()))?;
        writeln!(out, "{line}")
            .and_then(|_| out.flush())
            .map_err(|e| EmitError::Unavailable(e.to_string()))
    }
}
