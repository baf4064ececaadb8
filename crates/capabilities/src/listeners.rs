//! Parsing of the enabled-notification-listeners secure setting.

use std::collections::BTreeSet;

/// Packages that own an enabled notification listener.
///
/// `raw` is a `:`-separated list of flattened component names
/// (`package/class`); bare package tokens are accepted too. Blank tokens are
/// skipped.
pub fn parse_enabled_listeners(raw: &str) -> BTreeSet<String> {
    raw.split(':')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let package = token.split('/').next().unwrap_or(token).trim();
            (!package.is_empty()).then(|| package.to_string())
        })
        .collect()
}

/// Whether `package` has an enabled listener in `raw`.
///
/// Matches whole package names only, so `com.app` is not granted by a
/// listener belonging to `com.app.extra`. An absent or empty list means
/// not granted.
pub fn is_listener_enabled(raw: Option<&str>, package: &str) -> bool {
    match raw {
        Some(raw) if !raw.is_empty() => parse_enabled_listeners(raw).contains(package),
        _ => false,
    }
}
