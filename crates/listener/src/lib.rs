//! Notification listener service.
//!
//! The OS calls [`ListenerService::on_notification_posted`] for every
//! notification posted on the device. The service reads the posting
//! package and title from the opaque handle, stamps the capture time, and
//! broadcasts the result to the host application only.
//!
//! Extraction is split out as [`extract_event`] so it can be exercised
//! without a transport or an OS.

mod clock;
mod extract;
mod handle;
mod service;

pub use clock::{Clock, ClockRef, FixedClock, SystemClock};
pub use extract::{capture, extract_event, ExtractError, DEFAULT_TITLE_EXTRA};
pub use handle::{Extras, HandleError, NotificationHandle, StatusBarNotification};
pub use service::{ListenerConfig, ListenerService, PostOutcome};
