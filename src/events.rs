//! Append-only audit log of lock lifecycle events.
//!
//! Events are stored in NDJSON format (one JSON object per line) in
//! `<lock_dir>/events.ndjson`. Only the CLI writes events; the library
//! primitives never touch the log.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The action performed (init, acquire, release, timeout, clear)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `lock`: Optional lock name for lock-specific events
//! - `details`: Freeform object with action-specific details
//!
//! ```no_run
//! use interlock::events::{Event, EventAction, append_event};
//! use serde_json::json;
//! use std::path::Path;
//!
//! let event = Event::new(EventAction::Acquire)
//!     .with_lock("db")
//!     .with_details(json!({"waited_ms": 12}));
//! append_event(Path::new("/tmp/interlock-me/events.ndjson"), &event)?;
//! # Ok::<(), interlock::error::InterlockError>(())
//! ```

use crate::error::{InterlockError, Result};
use crate::locks::owner_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Config file written
    Init,
    /// Lock obtained
    Acquire,
    /// Lock given back
    Release,
    /// Gave up waiting for a lock
    Timeout,
    /// Lock file removed manually
    Clear,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::Acquire => write!(f, "acquire"),
            EventAction::Release => write!(f, "release"),
            EventAction::Timeout => write!(f, "timeout"),
            EventAction::Clear => write!(f, "clear"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// When the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// Who performed it (e.g., `user@HOST`).
    pub actor: String,

    /// Lock name for lock-specific events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<String>,

    /// Action-specific details.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action, timestamped now and
    /// attributed to the current user and host.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: owner_string(),
            lock: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the lock name for this event.
    pub fn with_lock(mut self, name: impl Into<String>) -> Self {
        self.lock = Some(name.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            InterlockError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Append an event to the log at `events_file`.
///
/// The file and its parent directory are created if missing. Each append
/// writes exactly one line with a trailing newline and syncs it to disk.
pub fn append_event(events_file: &Path, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    if let Some(dir) = events_file.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|e| {
            InterlockError::UserError(format!(
                "failed to create events directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(events_file)
        .map_err(|e| {
            InterlockError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        InterlockError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        InterlockError::UserError(format!(
            "failed to sync events file '{}': {}",
            events_file.display(),
            e
        ))
    })
}

/// Read every event in the log. A missing file is an empty log.
pub fn read_events(events_file: &Path) -> Result<Vec<Event>> {
    let content = match fs::read_to_string(events_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(InterlockError::UserError(format!(
                "failed to read events file '{}': {}",
                events_file.display(),
                e
            )));
        }
    };

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                InterlockError::UserError(format!(
                    "malformed event on line {} of '{}': {}",
                    index + 1,
                    events_file.display(),
                    e
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::Init);

        assert_eq!(event.action, EventAction::Init);
        assert!(event.actor.contains('@'));
        assert!(event.lock.is_none());
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_with_lock_and_details() {
        let event = Event::new(EventAction::Acquire)
            .with_lock("db")
            .with_details(json!({"waited_ms": 30, "purpose": "migrate"}));

        assert_eq!(event.lock.as_deref(), Some("db"));
        assert_eq!(event.details["waited_ms"], 30);
        assert_eq!(event.details["purpose"], "migrate");
    }

    #[test]
    fn test_event_serialization_is_single_line() {
        let event = Event::new(EventAction::Timeout)
            .with_lock("db")
            .with_details(json!({"timeout_ms": 0}));

        let json_line = event.to_ndjson_line().unwrap();
        assert!(!json_line.contains('\n'));
        assert!(json_line.contains("\"timeout\""));

        let parsed: Event = serde_json::from_str(&json_line).unwrap();
        assert_eq!(parsed.action, EventAction::Timeout);
        assert_eq!(parsed.lock.as_deref(), Some("db"));
    }

    #[test]
    fn test_event_without_lock_omits_field() {
        let json_line = Event::new(EventAction::Init).to_ndjson_line().unwrap();
        let parsed: Value = serde_json::from_str(&json_line).unwrap();
        assert!(parsed.get("lock").is_none());
    }

    #[test]
    fn test_append_creates_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let events_file = temp_dir.path().join("locks").join("events.ndjson");

        append_event(&events_file, &Event::new(EventAction::Init)).unwrap();

        let content = fs::read_to_string(&events_file).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_append_multiple_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let events_file = temp_dir.path().join("events.ndjson");

        append_event(&events_file, &Event::new(EventAction::Acquire).with_lock("a")).unwrap();
        append_event(&events_file, &Event::new(EventAction::Release).with_lock("a")).unwrap();
        append_event(&events_file, &Event::new(EventAction::Clear).with_lock("b")).unwrap();

        let events = read_events(&events_file).unwrap();
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            [EventAction::Acquire, EventAction::Release, EventAction::Clear]
        );
        assert_eq!(events[2].lock.as_deref(), Some("b"));
    }

    #[test]
    fn test_read_missing_log_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let events = read_events(&temp_dir.path().join("events.ndjson")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_read_reports_malformed_line() {
        let temp_dir = TempDir::new().unwrap();
        let events_file = temp_dir.path().join("events.ndjson");
        append_event(&events_file, &Event::new(EventAction::Init)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&events_file).unwrap();
        writeln!(file, "{{not json").unwrap();

        let err = read_events(&events_file).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_event_action_display() {
        assert_eq!(EventAction::Init.to_string(), "init");
        assert_eq!(EventAction::Acquire.to_string(), "acquire");
        assert_eq!(EventAction::Release.to_string(), "release");
        assert_eq!(EventAction::Timeout.to_string(), "timeout");
        assert_eq!(EventAction::Clear.to_string(), "clear");
    }
}
