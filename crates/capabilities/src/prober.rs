//! Capability queries and settings navigation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Capability, CapabilityError, Result};
use crate::listeners::is_listener_enabled;
use crate::platform::{
    CapabilityPlatform, OpCheckApi, OpMode, PlatformError, SettingsIntent,
    ENABLED_NOTIFICATION_LISTENERS, OPSTR_GET_USAGE_STATS,
};

/// Snapshot of all three capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatus {
    pub usage_stats: bool,
    pub notification_listener: bool,
    pub dnd_policy: bool,
}

impl CapabilityStatus {
    pub fn all_granted(&self) -> bool {
        self.usage_stats && self.notification_listener && self.dnd_policy
    }
}

/// Answers capability queries against the live OS state.
///
/// Stateless: every call asks the platform again.
#[derive(Clone)]
pub struct CapabilityProber {
    platform: Arc<dyn CapabilityPlatform>,
}

impl CapabilityProber {
    pub fn new(platform: Arc<dyn CapabilityPlatform>) -> Self {
        Self { platform }
    }

    pub fn has_usage_stats_access(&self) -> Result<bool> {
        guarded(Capability::UsageStats, || {
            let api = OpCheckApi::for_sdk(self.platform.sdk_int());
            let mode = self.platform.check_op_no_throw(OPSTR_GET_USAGE_STATS, api)?;
            Ok(mode == OpMode::Allowed)
        })
    }

    pub fn has_notification_listener_access(&self) -> Result<bool> {
        guarded(Capability::NotificationListener, || {
            let package = self.platform.package_name();
            let flat = self.platform.secure_setting(ENABLED_NOTIFICATION_LISTENERS)?;
            Ok(is_listener_enabled(flat.as_deref(), &package))
        })
    }

    pub fn has_dnd_access(&self) -> Result<bool> {
        guarded(Capability::DndPolicy, || {
            Ok(self
                .platform
                .notification_policy_access_granted()?
                .unwrap_or(false))
        })
    }

    /// Query all three capabilities. Fails on the first query that fails.
    pub fn status(&self) -> Result<CapabilityStatus> {
        Ok(CapabilityStatus {
            usage_stats: self.has_usage_stats_access()?,
            notification_listener: self.has_notification_listener_access()?,
            dnd_policy: self.has_dnd_access()?,
        })
    }

    pub fn open_usage_access_settings(&self) {
        self.open(SettingsIntent::UsageAccess);
    }

    pub fn open_notification_access_settings(&self) {
        self.open(SettingsIntent::NotificationListener);
    }

    pub fn open_dnd_access_settings(&self) {
        self.open(SettingsIntent::NotificationPolicy);
    }

    fn open(&self, intent: SettingsIntent) {
        let result = catch_unwind(AssertUnwindSafe(|| self.platform.start_activity(intent)));
        match result {
            Ok(Ok(())) => tracing::debug!(action = intent.action(), "opened settings"),
            Ok(Err(e)) => tracing::warn!(action = intent.action(), error = %e, "failed to open settings"),
            Err(_) => tracing::error!(action = intent.action(), "panic while opening settings"),
        }
    }
}

fn guarded<F>(capability: Capability, query: F) -> Result<bool>
where
    F: FnOnce() -> std::result::Result<bool, PlatformError>,
{
    let outcome = catch_unwind(AssertUnwindSafe(query))
        .unwrap_or_else(|_| Err(PlatformError::Os("platform call panicked".to_string())));

    outcome.map_err(|source| {
        let err = CapabilityError::new(capability, source);
        tracing::warn!(code = err.code(), error = %err.source, "capability query failed");
        err
    })
}
