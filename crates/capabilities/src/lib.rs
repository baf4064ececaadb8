//! Capability introspection for the notification relay.
//!
//! Three OS-granted capabilities gate the relay:
//! - usage-stats access (app-op `android:get_usage_stats`)
//! - notification-listener access (enabled-listeners secure setting)
//! - do-not-disturb policy access (notification manager)
//!
//! [`CapabilityProber`] answers each on demand and can send the user to
//! the settings screen that grants it. Platform access goes through
//! [`CapabilityPlatform`].

mod error;
mod listeners;
mod platform;
mod prober;

pub use error::{Capability, CapabilityError, Result};
pub use listeners::{is_listener_enabled, parse_enabled_listeners};
pub use platform::{
    CapabilityPlatform, OpCheckApi, OpMode, PlatformError, SettingsIntent, UnsupportedPlatform,
    ENABLED_NOTIFICATION_LISTENERS, OPSTR_GET_USAGE_STATS, SDK_Q,
};
pub use prober::{CapabilityProber, CapabilityStatus};
