//! Central configuration constants for registration limits and defaults.

/// Directory qualifier passed to `ProjectDirs`.
pub const PROJECT_QUALIFIER: &str = "com";

/// Organization name passed to `ProjectDirs`.
pub const PROJECT_ORG: &str = "spectator";

/// Application name passed to `ProjectDirs`.
pub const PROJECT_APP: &str = "recorder";

/// File name of the persisted form settings inside the config directory.
pub const SETTINGS_FILENAME: &str = "settings.json";

/// File name of the endpoint store inside its root directory.
pub const ENDPOINT_STORE_FILENAME: &str = "endpoints.redb";

/// Minimum allowed dispatch timeout in seconds.
pub const MIN_DISPATCH_TIMEOUT_SECS: u64 = 1;

/// Maximum allowed dispatch timeout in seconds.
pub const MAX_DISPATCH_TIMEOUT_SECS: u64 = 300;

/// Capacity of the session event channel.
pub const SESSION_EVENT_CAPACITY: usize = 100;

/// Convenience function to clamp a timeout value into allowed range.
pub fn clamp_timeout_secs(v: u64) -> u64 {
    v.clamp(MIN_DISPATCH_TIMEOUT_SECS, MAX_DISPATCH_TIMEOUT_SECS)
}
