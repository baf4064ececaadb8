//! Intent to scripting-layer payload conversion.

use screenmind_events::{DecodeError, NotificationEvent};
use screenmind_transport::Intent;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("malformed notification intent: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Decode `intent` and build the JSON payload for the scripting layer.
///
/// `now_ms` stands in for a missing timestamp.
pub fn to_script_payload(
    intent: &Intent,
    now_ms: i64,
) -> Result<(NotificationEvent, serde_json::Value), ConversionError> {
    let event = NotificationEvent::from_extras(&intent.extras, now_ms)?;
    let payload = serde_json::to_value(event.to_payload())?;
    Ok((event, payload))
}
