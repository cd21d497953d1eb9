//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::MAX_RETRY_INTERVAL_MS;
use crate::clock::Timeout;
use crate::error::{InterlockError, Result};
use crate::fs::{atomic_write_file, default_lock_dir};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file to use.
pub const CONFIG_ENV_VAR: &str = "INTERLOCK_CONFIG";

/// File name of the NDJSON event log inside the lock directory.
const EVENTS_FILE: &str = "events.ndjson";

/// `$XDG_CONFIG_HOME/interlock/config.yaml`, falling back to
/// `~/.config/interlock/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;

    Some(base.join("interlock").join("config.yaml"))
}

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(InterlockError::UserError)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            InterlockError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            InterlockError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            InterlockError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Write the config atomically to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        atomic_write_file(path, &self.to_yaml()?)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `retry_interval_ms` must be between 1 and 60000
    /// - `stale_minutes` must be positive
    /// - `lock_dir`, when set, must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.retry_interval_ms == 0 || self.retry_interval_ms > MAX_RETRY_INTERVAL_MS {
            return Err(InterlockError::UserError(format!(
                "config validation failed: retry_interval_ms must be between 1 and {} (found {})",
                MAX_RETRY_INTERVAL_MS, self.retry_interval_ms
            )));
        }

        if self.stale_minutes == 0 {
            return Err(InterlockError::UserError(
                "config validation failed: stale_minutes must be greater than 0".to_string(),
            ));
        }

        if let Some(dir) = &self.lock_dir
            && dir.as_os_str().is_empty()
        {
            return Err(InterlockError::UserError(
                "config validation failed: lock_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The config file that [`Config::resolve`] would read: the explicit
    /// path, else `$INTERLOCK_CONFIG`, else the default location.
    pub fn source_path(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| {
                env::var_os(CONFIG_ENV_VAR)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(default_config_path)
    }

    /// Load the effective configuration.
    ///
    /// An explicitly named file (argument or `$INTERLOCK_CONFIG`) must exist;
    /// a missing file at the default location just means "use defaults".
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit.is_some() || env::var_os(CONFIG_ENV_VAR).is_some_and(|v| !v.is_empty());

        match Self::source_path(explicit) {
            Some(path) if named || path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Effective lock directory.
    pub fn lock_dir(&self) -> PathBuf {
        self.lock_dir.clone().unwrap_or_else(default_lock_dir)
    }

    /// Pause between attempts while a lock is contended.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Timeout for `interlock run` without `--timeout`.
    pub fn default_timeout(&self) -> Timeout {
        Timeout::from_millis(self.default_timeout_ms)
    }

    /// Path of the NDJSON event log.
    pub fn events_path(&self) -> PathBuf {
        self.lock_dir().join(EVENTS_FILE)
    }
}
