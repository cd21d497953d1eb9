//! Default values for config fields.

pub(crate) fn default_retry_interval_ms() -> u64 {
    10
}
pub(crate) fn default_timeout_ms() -> i64 {
    -1
}
pub(crate) fn default_stale_minutes() -> u32 {
    120
}
pub(crate) fn default_true() -> bool {
    true
}

/// Upper bound for `retry_interval_ms`.
pub const MAX_RETRY_INTERVAL_MS: u64 = 60_000;
