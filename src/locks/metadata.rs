//! Holder metadata written into lock files.
//!
//! The content of a lock file is never consulted for locking decisions; the
//! OS record lock alone decides. The metadata only tells a human (or
//! `interlock status`) who holds the lock. It is written right after the lock
//! is obtained and truncated away right before it is released, so a
//! non-empty file that nobody has locked was left behind by a crashed holder.

use crate::error::{InterlockError, Result};
use crate::fs::current_user;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Lock metadata stored in lock files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lock holder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Timestamp when the lock was acquired (RFC3339).
    pub created_at: DateTime<Utc>,

    /// What the holder is doing, if it said.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl LockMetadata {
    /// Metadata describing the current process, timestamped now.
    pub fn new(purpose: Option<&str>) -> Self {
        Self {
            owner: owner_string(),
            pid: Some(std::process::id()),
            created_at: Utc::now(),
            purpose: purpose.map(str::to_string),
        }
    }

    /// Parse lock metadata from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            InterlockError::UserError(format!(
                "failed to read lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            InterlockError::UserError(format!(
                "failed to parse lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Metadata in the file at `path`, or `None` when it is missing, empty,
    /// or unreadable.
    pub fn read_optional<P: AsRef<Path>>(path: P) -> Option<Self> {
        let content = fs::read_to_string(path.as_ref()).ok()?;
        Self::parse_optional(&content)
    }

    /// Metadata in an already open lock file, read from the start.
    ///
    /// Reading through the handle keeps this process's other descriptors
    /// for the file untouched.
    pub(crate) fn read_from(file: &mut File) -> Option<Self> {
        let mut content = String::new();
        file.seek(SeekFrom::Start(0)).ok()?;
        file.read_to_string(&mut content).ok()?;
        Self::parse_optional(&content)
    }

    fn parse_optional(content: &str) -> Option<Self> {
        if content.trim().is_empty() {
            return None;
        }
        serde_json::from_str(content).ok()
    }

    /// Serialize lock metadata to JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            InterlockError::UserError(format!("failed to serialize lock metadata: {}", e))
        })
    }

    /// Replace the content of an open lock file with this metadata.
    pub(crate) fn write_to(&self, file: &mut File) -> Result<()> {
        let json = self.to_json()?;
        let io_err = |e: std::io::Error| {
            InterlockError::UserError(format!("failed to write lock metadata: {}", e))
        };

        file.set_len(0).map_err(io_err)?;
        file.seek(SeekFrom::Start(0)).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.sync_data().map_err(io_err)
    }

    /// Calculate the age of the lock.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }

    /// Check if the lock is stale based on the given threshold in minutes.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.age().num_minutes() > stale_minutes as i64
    }
}

/// `user@host` for the current process.
pub(crate) fn owner_string() -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", current_user(), host)
}
