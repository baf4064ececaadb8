//! Pure conversion from a notification handle to a [`NotificationEvent`].

use screenmind_events::NotificationEvent;

use crate::clock::Clock;
use crate::handle::{HandleError, NotificationHandle};

/// Extras key holding the notification title.
pub const DEFAULT_TITLE_EXTRA: &str = "android.title";

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("notification has no package name")]
    MissingPackage,

    #[error(transparent)]
    Handle(#[from] HandleError),
}

/// Build the event for one posted notification.
///
/// The handle is only read, never retained. An absent extras bundle or
/// title yields an empty title; a missing package name or a failing
/// accessor is an error.
pub fn extract_event(
    handle: &dyn NotificationHandle,
    title_key: &str,
    clock: &dyn Clock,
) -> Result<NotificationEvent, ExtractError> {
    let package = handle.package_name()?.ok_or(ExtractError::MissingPackage)?;
    let timestamp_millis = clock.now_millis();

    let title = handle
        .extras()?
        .and_then(|extras| extras.char_sequence(title_key).map(str::to_owned))
        .unwrap_or_default();

    Ok(NotificationEvent::new(package, title, timestamp_millis))
}

/// [`extract_event`] that logs failures instead of returning them.
pub fn capture(
    handle: &dyn NotificationHandle,
    title_key: &str,
    clock: &dyn Clock,
) -> Option<NotificationEvent> {
    match extract_event(handle, title_key, clock) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed notification");
            None
        }
    }
}
