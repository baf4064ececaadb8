//! Relay configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use screenmind_bridge::BridgeConfig;
use screenmind_events::{event_names, DEFAULT_HOST_PACKAGE};
use screenmind_listener::{ListenerConfig, DEFAULT_TITLE_EXTRA};
use screenmind_transport::SDK_TIRAMISU;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "SCREENMIND_RELAY_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelayConfig {
    pub host_package: String,
    pub channel_action: String,
    pub event_name: String,
    pub title_extra_key: String,
    pub sdk_int: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host_package: DEFAULT_HOST_PACKAGE.to_string(),
            channel_action: event_names::NOTIFICATION.to_string(),
            event_name: event_names::NOTIFICATION.to_string(),
            title_extra_key: DEFAULT_TITLE_EXTRA.to_string(),
            sdk_int: SDK_TIRAMISU,
        }
    }
}

impl RelayConfig {
    /// Load from `$SCREENMIND_RELAY_CONFIG`, else the user config file,
    /// else defaults.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        match default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("no relay config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded relay config");
        Ok(config)
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            host_package: self.host_package.clone(),
            channel_action: self.channel_action.clone(),
            title_extra_key: self.title_extra_key.clone(),
        }
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            host_package: self.host_package.clone(),
            channel_action: self.channel_action.clone(),
            event_name: self.event_name.clone(),
            sdk_int: self.sdk_int,
        }
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("screenmind").join("relay.json"))
}
