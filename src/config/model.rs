//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for interlock.
///
/// This struct represents the contents of `config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding lock files (default: the per-user lock directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_dir: Option<PathBuf>,

    /// Pause between attempts while a lock is contended.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Timeout used by `interlock run` when `--timeout` is not given.
    /// Negative waits forever, zero fails at once if the lock is held.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: i64,

    /// Whether lock lifecycle events are appended to `events.ndjson`.
    #[serde(default = "default_true")]
    pub events_enabled: bool,

    /// Held locks older than this are flagged as stale by `status`/`list`.
    #[serde(default = "default_stale_minutes")]
    pub stale_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_dir: None,
            retry_interval_ms: default_retry_interval_ms(),
            default_timeout_ms: default_timeout_ms(),
            events_enabled: default_true(),
            stale_minutes: default_stale_minutes(),
        }
    }
}
