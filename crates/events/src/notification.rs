//! Notification event model.
//!
//! A [`NotificationEvent`] is built once per posted system notification and
//! never mutated afterwards. It travels between processes as a flat set of
//! intent extras and reaches the scripting layer as a [`NotificationPayload`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Intent extra carrying the posting application's package.
pub const EXTRA_PACKAGE_NAME: &str = "packageName";
/// Intent extra carrying the notification title.
pub const EXTRA_TITLE: &str = "title";
/// Intent extra carrying the capture time in epoch milliseconds.
pub const EXTRA_TS: &str = "ts";

/// Errors decoding a notification from intent extras.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing extra: {0}")]
    MissingExtra(&'static str),

    #[error("extra {key} has wrong type, expected {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}

/// A single captured system notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    source_package: String,
    title: String,
    timestamp_millis: i64,
}

impl NotificationEvent {
    pub fn new(
        source_package: impl Into<String>,
        title: impl Into<String>,
        timestamp_millis: i64,
    ) -> Self {
        Self {
            source_package: source_package.into(),
            title: title.into(),
            timestamp_millis,
        }
    }

    /// Package of the application that posted the notification. May be empty.
    pub fn source_package(&self) -> &str {
        &self.source_package
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Wall-clock capture time in milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }

    /// Encode as intent extras (`packageName`, `title`, `ts`).
    pub fn into_extras(self) -> Map<String, Value> {
        let mut extras = Map::with_capacity(3);
        extras.insert(
            EXTRA_PACKAGE_NAME.to_string(),
            Value::String(self.source_package),
        );
        extras.insert(EXTRA_TITLE.to_string(), Value::String(self.title));
        extras.insert(EXTRA_TS.to_string(), Value::from(self.timestamp_millis));
        extras
    }

    /// Decode from intent extras.
    ///
    /// A missing `title` decodes as an empty string and a missing `ts` falls
    /// back to `fallback_ts`. `packageName` is required.
    pub fn from_extras(extras: &Map<String, Value>, fallback_ts: i64) -> Result<Self, DecodeError> {
        let source_package = match extras.get(EXTRA_PACKAGE_NAME) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(DecodeError::WrongType {
                    key: EXTRA_PACKAGE_NAME,
                    expected: "string",
                })
            }
            None => return Err(DecodeError::MissingExtra(EXTRA_PACKAGE_NAME)),
        };

        let title = match extras.get(EXTRA_TITLE) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(_) => {
                return Err(DecodeError::WrongType {
                    key: EXTRA_TITLE,
                    expected: "string",
                })
            }
        };

        let timestamp_millis = match extras.get(EXTRA_TS) {
            Some(v) => v.as_i64().ok_or(DecodeError::WrongType {
                key: EXTRA_TS,
                expected: "64-bit integer",
            })?,
            None => fallback_ts,
        };

        Ok(Self {
            source_package,
            title,
            timestamp_millis,
        })
    }

    /// Convert to the representation emitted to the scripting layer.
    pub fn to_payload(&self) -> NotificationPayload {
        NotificationPayload {
            package_name: self.source_package.clone(),
            title: self.title.clone(),
            ts: self.timestamp_millis as f64,
        }
    }
}

/// Event payload seen by scripting-layer subscribers.
///
/// `ts` is a double because the scripting layer has no native 64-bit
/// integer; it is exact for any timestamp within ±2^53 ms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub package_name: String,
    pub title: String,
    pub ts: f64,
}
