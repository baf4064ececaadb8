use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::platform::PlatformError;

/// The three OS-granted capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    UsageStats,
    NotificationListener,
    DndPolicy,
}

impl Capability {
    /// Error code reported to the scripting layer when a query fails.
    pub fn error_code(self) -> &'static str {
        match self {
            Self::UsageStats => "USAGE_ACCESS_ERROR",
            Self::NotificationListener => "NOTIF_ACCESS_ERROR",
            Self::DndPolicy => "DND_ACCESS_ERROR",
        }
    }
}

/// A capability query that could not be answered.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{}: {source}", .capability.error_code())]
pub struct CapabilityError {
    pub capability: Capability,
    #[source]
    pub source: PlatformError,
}

impl CapabilityError {
    pub fn new(capability: Capability, source: PlatformError) -> Self {
        Self { capability, source }
    }

    pub fn code(&self) -> &'static str {
        self.capability.error_code()
    }
}

impl Serialize for CapabilityError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CapabilityError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.source.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, CapabilityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Capability::UsageStats.error_code(), "USAGE_ACCESS_ERROR");
        assert_eq!(Capability::NotificationListener.error_code(), "NOTIF_ACCESS_ERROR");
        assert_eq!(Capability::DndPolicy.error_code(), "DND_ACCESS_ERROR");
    }

    #[test]
    fn test_error_serializes_code_and_message() {
        let err = CapabilityError::new(
            Capability::DndPolicy,
            PlatformError::Os("SecurityException".into()),
        );
        assert_eq!(err.to_string(), "DND_ACCESS_ERROR: SecurityException");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"code": "DND_ACCESS_ERROR", "message": "SecurityException"})
        );
    }
}
