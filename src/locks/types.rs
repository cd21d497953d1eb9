//! Lock inspection results.

use super::metadata::LockMetadata;
use std::fmt;
use std::path::PathBuf;

/// What the OS says about a lock file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// The lock file does not exist.
    Missing,
    /// The file exists and nobody holds a record lock on it.
    Free,
    /// Another holder has the file locked.
    Held,
}

impl LockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockState::Missing => "missing",
            LockState::Free => "free",
            LockState::Held => "held",
        }
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about a lock file.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The lock file path.
    pub path: PathBuf,

    /// The lock name (file name without `.lock`).
    pub name: String,

    /// Current OS-level state.
    pub state: LockState,

    /// Holder metadata found in the file, if any.
    pub metadata: Option<LockMetadata>,

    /// Held for longer than the configured stale threshold.
    pub is_stale: bool,
}

impl LockInfo {
    /// The file still names a holder although nobody holds the lock, which
    /// means the holder exited without releasing.
    pub fn is_leftover(&self) -> bool {
        self.state == LockState::Free && self.metadata.is_some()
    }
}

impl fmt::Display for LockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.name, self.state)?;

        if let Some(meta) = &self.metadata {
            write!(f, ", owner: {}", meta.owner)?;
            if let Some(pid) = meta.pid {
                write!(f, ", pid: {}", pid)?;
            }
            write!(f, ", age: {}", meta.age_string())?;
            if let Some(purpose) = &meta.purpose {
                write!(f, ", purpose: {}", purpose)?;
            }
        }

        if self.is_stale {
            write!(f, ", STALE")?;
        }
        if self.is_leftover() {
            write!(f, ", LEFTOVER")?;
        }
        write!(f, ")")
    }
}
