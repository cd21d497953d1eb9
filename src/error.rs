//! Error types for interlock.
//!
//! Uses thiserror for derive macros and keeps messages user-actionable.
//! Interrupted syscalls and spurious condition-variable wake-ups are retried
//! inside the primitives and never show up here.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for interlock operations.
#[derive(Error, Debug)]
pub enum InterlockError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// Lock name cannot be mapped onto a lock file.
    #[error("invalid lock name '{0}': names must be non-empty and must not contain path separators")]
    InvalidLockName(String),

    /// The lock stayed contended for the whole timeout.
    #[error("timed out after {}ms waiting for lock '{name}'", waited.as_millis())]
    AcquisitionTimeout { name: String, waited: Duration },

    /// The lock file could not be created or opened.
    #[error("lock file '{}' is unavailable: {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The lock is currently held by another holder.
    #[error("lock is held: {0}")]
    LockHeld(String),

    /// An external command could not be run.
    #[error("Command failed: {0}")]
    CommandError(String),
}

impl InterlockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            InterlockError::UserError(_) => exit_codes::USER_ERROR,
            InterlockError::InvalidLockName(_) => exit_codes::USER_ERROR,
            InterlockError::ResourceUnavailable { .. } => exit_codes::USER_ERROR,
            InterlockError::CommandError(_) => exit_codes::COMMAND_FAILURE,
            InterlockError::AcquisitionTimeout { .. } => exit_codes::LOCK_FAILURE,
            InterlockError::LockHeld(_) => exit_codes::LOCK_FAILURE,
        }
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            InterlockError::AcquisitionTimeout { .. } | InterlockError::LockHeld(_)
        )
    }
}

/// Result type alias for interlock operations.
pub type Result<T> = std::result::Result<T, InterlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = InterlockError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn timeout_maps_to_lock_failure() {
        let err = InterlockError::AcquisitionTimeout {
            name: "db".to_string(),
            waited: Duration::from_millis(250),
        };
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
        assert!(err.is_contention());
        assert_eq!(err.to_string(), "timed out after 250ms waiting for lock 'db'");
    }

    #[test]
    fn resource_unavailable_is_not_contention() {
        let err = InterlockError::ResourceUnavailable {
            path: PathBuf::from("/nope/db.lock"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(!err.is_contention());
        assert!(err.to_string().contains("/nope/db.lock"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn command_error_has_correct_exit_code() {
        let err = InterlockError::CommandError("spawn failed".to_string());
        assert_eq!(err.exit_code(), exit_codes::COMMAND_FAILURE);
        assert_eq!(err.to_string(), "Command failed: spawn failed");
    }

    #[test]
    fn held_lock_maps_to_lock_failure() {
        let err = InterlockError::LockHeld("db".to_string());
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
        assert!(err.is_contention());
    }

    #[test]
    fn invalid_name_message_mentions_name() {
        let err = InterlockError::InvalidLockName("../etc".to_string());
        assert!(err.to_string().contains("'../etc'"));
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }
}
