use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// First SDK level on which dynamically registered receivers must declare
/// their export state.
pub const SDK_TIRAMISU: u32 = 33;

/// A broadcast message: an action name, optional explicit target package,
/// and a flat bag of extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub action: String,
    /// Explicit target. When set, only receivers registered by this package
    /// see the intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Package of the component that sent the intent.
    pub sender_package: String,
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl Intent {
    pub fn new(action: impl Into<String>, sender_package: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            package: None,
            sender_package: sender_package.into(),
            extras: Map::new(),
        }
    }

    /// Restrict delivery to receivers of `package`.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras = extras;
        self
    }
}

/// Which intents a receiver is interested in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentFilter {
    pub action: String,
}

impl IntentFilter {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
        }
    }

    pub fn matches(&self, intent: &Intent) -> bool {
        self.action == intent.action
    }
}

/// Export state declared at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverFlags {
    /// Only intents sent from the receiver's own package are delivered.
    NotExported,
    /// Registered without flags; older platforms treat this as exported.
    Legacy,
}

impl ReceiverFlags {
    /// Flags to use on a platform at `sdk_int`.
    pub fn for_sdk(sdk_int: u32) -> Self {
        if sdk_int >= SDK_TIRAMISU {
            Self::NotExported
        } else {
            Self::Legacy
        }
    }
}

/// Everything needed to register a receiver on a [`crate::Channel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverRegistration {
    /// Receiver identity; at most one live registration per name and action.
    pub name: String,
    /// Package that owns the receiver.
    pub package: String,
    pub filter: IntentFilter,
    pub flags: ReceiverFlags,
}

impl ReceiverRegistration {
    pub fn new(
        name: impl Into<String>,
        package: impl Into<String>,
        filter: IntentFilter,
        flags: ReceiverFlags,
    ) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            filter,
            flags,
        }
    }

    /// Registration with flags chosen for the platform at `sdk_int`.
    pub fn for_sdk(
        name: impl Into<String>,
        package: impl Into<String>,
        filter: IntentFilter,
        sdk_int: u32,
    ) -> Self {
        Self::new(name, package, filter, ReceiverFlags::for_sdk(sdk_int))
    }

    /// Whether this receiver may observe `intent`.
    pub fn accepts(&self, intent: &Intent) -> bool {
        if !self.filter.matches(intent) {
            return false;
        }
        if let Some(target) = &intent.package {
            if target != &self.package {
                return false;
            }
        }
        match self.flags {
            ReceiverFlags::Legacy => true,
            ReceiverFlags::NotExported => intent.sender_package == self.package,
        }
    }
}
