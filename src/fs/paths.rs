//! Lock name to lock file path mapping.
//!
//! Every name maps onto exactly one file, `<lock_dir>/<name>.lock`, so
//! unrelated processes that use the same name contend on the same inode.

use crate::error::{InterlockError, Result};
use std::path::{Path, PathBuf};

/// File extension of lock files.
pub const LOCK_EXTENSION: &str = "lock";

/// Name of the current user, from `USER` or `USERNAME`.
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Default per-user lock directory.
///
/// macOS uses `~/Library/Caches/interlock` so every application of the same
/// user agrees on it; elsewhere it is `<temp>/interlock-<user>`.
#[cfg(target_os = "macos")]
pub fn default_lock_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join("Library/Caches/interlock"),
        None => std::env::temp_dir().join(format!("interlock-{}", current_user())),
    }
}

/// Default per-user lock directory.
///
/// macOS uses `~/Library/Caches/interlock` so every application of the same
/// user agrees on it; elsewhere it is `<temp>/interlock-<user>`.
#[cfg(not(target_os = "macos"))]
pub fn default_lock_dir() -> PathBuf {
    std::env::temp_dir().join(format!("interlock-{}", current_user()))
}

/// Check that a lock name can be used as a single file name.
pub fn validate_lock_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(InterlockError::InvalidLockName(name.to_string()));
    }
    Ok(())
}

/// Path of the lock file for `name` inside `lock_dir`.
pub fn lock_file_path(lock_dir: &Path, name: &str) -> Result<PathBuf> {
    validate_lock_name(name)?;
    Ok(lock_dir.join(format!("{}.{}", name, LOCK_EXTENSION)))
}

/// Lock name encoded in a lock file path, if it is one.
pub fn lock_name_from_path(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(LOCK_EXTENSION) {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
