//! Sync configuration parsed from environment variables.

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SYNC_ATTEMPTS: usize = 3;
pub const DEFAULT_SYNC_RETRY_BASE_MS: u64 = 200;

/// Tuning knobs for the HTTP persistence gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Total save attempts per sync, including the first. Zero is treated as one.
    pub attempts: usize,
    /// Base delay for linear retry back-off, in milliseconds.
    pub retry_base_ms: u64,
}

impl SyncConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `STORYFORM_REQUEST_TIMEOUT_SECS`: default 30
    /// - `STORYFORM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STORYFORM_SYNC_ATTEMPTS`: default 3
    /// - `STORYFORM_SYNC_RETRY_BASE_MS`: default 200
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_timeout_secs: env_parse("STORYFORM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse("STORYFORM_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            attempts: env_parse("STORYFORM_SYNC_ATTEMPTS", DEFAULT_SYNC_ATTEMPTS),
            retry_base_ms: env_parse("STORYFORM_SYNC_RETRY_BASE_MS", DEFAULT_SYNC_RETRY_BASE_MS),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            attempts: DEFAULT_SYNC_ATTEMPTS,
            retry_base_ms: DEFAULT_SYNC_RETRY_BASE_MS,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
