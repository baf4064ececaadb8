//! OS services the prober depends on.
//!
//! These traits abstract the platform so the access checks stay testable
//! off-device.

use serde::Serialize;

use screenmind_events::DEFAULT_HOST_PACKAGE;

/// First SDK level with `unsafeCheckOpNoThrow`.
pub const SDK_Q: u32 = 29;

/// Secure-settings key listing enabled notification listeners.
pub const ENABLED_NOTIFICATION_LISTENERS: &str = "enabled_notification_listeners";

/// App-op guarding usage stats queries.
pub const OPSTR_GET_USAGE_STATS: &str = "android:get_usage_stats";

/// Error reported by a platform call.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("system service unavailable: {0}")]
    ServiceUnavailable(&'static str),

    #[error("not supported on this platform")]
    Unsupported,

    #[error("{0}")]
    Os(String),
}

/// Mode returned by an app-op check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    Allowed,
    Ignored,
    Errored,
    Default,
    Foreground,
}

/// Which app-op check entry point to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCheckApi {
    /// `unsafeCheckOpNoThrow`, SDK 29 and up.
    Unsafe,
    /// `checkOpNoThrow`, deprecated from SDK 29.
    Legacy,
}

impl OpCheckApi {
    pub fn for_sdk(sdk_int: u32) -> Self {
        if sdk_int >= SDK_Q {
            Self::Unsafe
        } else {
            Self::Legacy
        }
    }
}

/// A settings screen the user can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SettingsIntent {
    UsageAccess,
    NotificationListener,
    NotificationPolicy,
}

impl SettingsIntent {
    pub fn action(self) -> &'static str {
        match self {
            Self::UsageAccess => "android.settings.USAGE_ACCESS_SETTINGS",
            Self::NotificationListener => "android.settings.ACTION_NOTIFICATION_LISTENER_SETTINGS",
            Self::NotificationPolicy => "android.settings.NOTIFICATION_POLICY_ACCESS_SETTINGS",
        }
    }
}

/// Platform services used to answer capability queries.
pub trait CapabilityPlatform: Send + Sync {
    /// SDK level of the running OS.
    fn sdk_int(&self) -> u32;

    /// Package identifier of the host application.
    fn package_name(&self) -> String;

    /// Check `op` for the calling uid and package.
    fn check_op_no_throw(&self, op: &str, api: OpCheckApi) -> Result<OpMode, PlatformError>;

    /// Read a secure-settings string. `None` when unset.
    fn secure_setting(&self, key: &str) -> Result<Option<String>, PlatformError>;

    /// Whether DND policy access is granted. `None` when the notification
    /// manager is unavailable.
    fn notification_policy_access_granted(&self) -> Result<Option<bool>, PlatformError>;

    /// Ask the OS to show a settings screen. The screen is started outside
    /// any activity, in a new task.
    fn start_activity(&self, intent: SettingsIntent) -> Result<(), PlatformError>;
}

/// Platform without any of these capabilities (desktop hosts).
#[derive(Debug, Clone)]
pub struct UnsupportedPlatform {
    package: String,
}

impl Default for UnsupportedPlatform {
    fn default() -> Self {
        Self {
            package: DEFAULT_HOST_PACKAGE.to_string(),
        }
    }
}

impl UnsupportedPlatform {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

impl CapabilityPlatform for UnsupportedPlatform {
    fn sdk_int(&self) -> u32 {
        0
    }

    fn package_name(&self) -> String {
        self.package.clone()
    }

    fn check_op_no_throw(&self, _op: &str, _api: OpCheckApi) -> Result<OpMode, PlatformError> {
        Ok(OpMode::Ignored)
    }

    fn secure_setting(&self, _key: &str) -> Result<Option<String>, PlatformError> {
        Ok(None)
    }

    fn notification_policy_access_granted(&self) -> Result<Option<bool>, PlatformError> {
        Ok(None)
    }

    fn start_activity(&self, _intent: SettingsIntent) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }
}
