//! Shared event contracts for the notification relay.
//!
//! Defines the [`NotificationEvent`] that flows from the listener service to
//! the bridge, its intent-extras encoding, the payload handed to the
//! scripting layer, and the [`EventBus`] seam the bridge emits through.

mod bus;
mod notification;

pub use bus::{EmitError, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};
pub use notification::{
    DecodeError, NotificationEvent, NotificationPayload, EXTRA_PACKAGE_NAME, EXTRA_TITLE,
    EXTRA_TS,
};

/// Event and channel names as constants to prevent typos.
pub mod event_names {
    /// Transport action and scripting-layer event name for captured notifications.
    pub const NOTIFICATION: &str = "SCREENMIND_NOTIFICATION";
}

/// Names each module reports to the scripting layer.
pub mod module_names {
    pub const NOTIFICATION_BRIDGE: &str = "NotificationBridge";
    pub const SETTINGS_ACCESS: &str = "SettingsAccess";
}

/// Package identifier of the host application.
pub const DEFAULT_HOST_PACKAGE: &str = "com.screenmindapp";
