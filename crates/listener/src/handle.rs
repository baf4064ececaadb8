//! The opaque notification handle handed over by the OS.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Failure reading from a notification handle.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("notification handle accessor failed: {0}")]
pub struct HandleError(pub String);

/// Extras bundle attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extras(Map<String, Value>);

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Text stored under `key`. Values of any other type read as absent.
    pub fn char_sequence(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                tracing::warn!(key, found = %other, "extra is not a char sequence");
                None
            }
            None => None,
        }
    }
}

impl From<Map<String, Value>> for Extras {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Read access to a posted notification.
///
/// Both accessors may fail; the listener treats failures as a malformed
/// notification and moves on.
pub trait NotificationHandle {
    /// Package of the posting application. `None` when the handle has none.
    fn package_name(&self) -> Result<Option<String>, HandleError>;

    /// The notification's extras bundle, if it carries one.
    fn extras(&self) -> Result<Option<Extras>, HandleError>;
}

/// Plain-data notification handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBarNotification {
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub extras: Option<Extras>,
}

impl StatusBarNotification {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: Some(package_name.into()),
            extras: None,
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.get_or_insert_with(Extras::new).insert(key, value);
        self
    }
}

impl NotificationHandle for StatusBarNotification {
    fn package_name(&self) -> Result<Option<String>, HandleError> {
        Ok(self.package_name.clone())
    }

    fn extras(&self) -> Result<Option<Extras>, HandleError> {
        Ok(self.extras.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_char_sequence_ignores_non_text() {
        let mut extras = Extras::new();
        extras.insert("android.title", "Hello");
        extras.insert("android.progress", 40);

        assert_eq!(extras.char_sequence("android.title"), Some("Hello"));
        assert_eq!(extras.char_sequence("android.progress"), None);
        assert_eq!(extras.char_sequence("android.text"), None);
    }

    #[test]
    fn test_status_bar_notification_deserializes() {
        let sbn: StatusBarNotification = serde_json::from_value(json!({
            "packageName": "com.bank.app",
            "extras": {"android.title": "Payment received"}
        }))
        .unwrap();

        assert_eq!(sbn.package_name().unwrap().as_deref(), Some("com.bank.app"));
        let extras = sbn.extras().unwrap().unwrap();
        assert_eq!(extras.char_sequence("android.title"), Some("Payment received"));
    }

    #[test]
    fn test_status_bar_notification_defaults_missing_fields() {
        let sbn: StatusBarNotification = serde_json::from_value(json!({})).unwrap();
        assert_eq!(sbn, StatusBarNotification::default());
    }
}
