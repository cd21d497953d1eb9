//! Lock inspection, listing, and clearing.
//!
//! Status and listing never acquire a lock: the OS is asked whether an
//! exclusive lock would conflict, which leaves the lock file untouched.
//! Clearing briefly takes the lock itself so it never unlinks a file
//! somebody is about to hold.

use super::metadata::LockMetadata;
use super::retry::retry_with_deadline;
use super::sys;
use super::types::{LockInfo, LockState};
use crate::clock::{SystemClock, Timeout};
use crate::error::{InterlockError, Result};
use crate::fs::{FileSystem, lock_file_path, lock_name_from_path};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Ask the OS whether the lock file at `path` is currently held.
///
/// Never creates the file and never takes the lock. Off Linux, closing any
/// descriptor of a file drops the classic record locks this process holds
/// on it, so do not query a lock held by the calling process there.
pub fn query_lock(fs: &dyn FileSystem, path: &Path) -> Result<LockState> {
    if !fs.exists(path) {
        return Ok(LockState::Missing);
    }

    let file = match fs.open_read_write(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LockState::Missing),
        Err(source) => {
            return Err(InterlockError::ResourceUnavailable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    match sys::is_locked_elsewhere(&file) {
        Ok(true) => Ok(LockState::Held),
        Ok(false) => Ok(LockState::Free),
        Err(source) => Err(InterlockError::ResourceUnavailable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn inspect(fs: &dyn FileSystem, path: &Path, name: &str, stale_minutes: u32) -> Result<LockInfo> {
    let state = query_lock(fs, path)?;
    let metadata = match state {
        LockState::Missing => None,
        LockState::Free | LockState::Held => LockMetadata::read_optional(path),
    };
    let is_stale = state == LockState::Held
        && metadata
            .as_ref()
            .is_some_and(|meta| meta.is_stale(stale_minutes));

    Ok(LockInfo {
        path: path.to_path_buf(),
        name: name.to_string(),
        state,
        metadata,
        is_stale,
    })
}

/// Current state and holder of the lock `name` in `lock_dir`.
pub fn lock_status(
    fs: &dyn FileSystem,
    lock_dir: &Path,
    name: &str,
    stale_minutes: u32,
) -> Result<LockInfo> {
    let path = lock_file_path(lock_dir, name)?;
    inspect(fs, &path, name, stale_minutes)
}

/// Every lock file in `lock_dir`, sorted by name.
///
/// A missing directory has no locks.
pub fn list_locks(fs: &dyn FileSystem, lock_dir: &Path, stale_minutes: u32) -> Result<Vec<LockInfo>> {
    let mut locks = Vec::new();

    if !fs.exists(lock_dir) {
        return Ok(locks);
    }

    let entries = fs::read_dir(lock_dir).map_err(|e| {
        InterlockError::UserError(format!(
            "failed to read lock directory '{}': {}",
            lock_dir.display(),
            e
        ))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            InterlockError::UserError(format!("failed to read lock directory entry: {}", e))
        })?;

        let path = entry.path();
        let Some(name) = lock_name_from_path(&path) else {
            continue;
        };

        match inspect(fs, &path, &name, stale_minutes) {
            Ok(info) if info.state != LockState::Missing => locks.push(info),
            Ok(_) => {}
            // Unreadable entries are reported, not fatal for the whole listing.
            Err(e) => eprintln!("Warning: skipping '{}': {}", path.display(), e),
        }
    }

    locks.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(locks)
}

/// Delete the lock file for `name`.
///
/// The record lock is taken first and the file is unlinked while it is
/// held, so a concurrent acquirer either sees the lock as held by the
/// clearer or notices afterwards that its file was unlinked and reopens.
///
/// # Returns
///
/// * `Ok(LockInfo)` - What the file contained before it was removed
/// * `Err(InterlockError::LockHeld)` - The lock is currently held
/// * `Err(InterlockError::UserError)` - No such lock file, or it was
///   replaced while clearing
pub fn clear_lock(
    fs: &dyn FileSystem,
    lock_dir: &Path,
    name: &str,
    stale_minutes: u32,
) -> Result<LockInfo> {
    let path = lock_file_path(lock_dir, name)?;
    let missing = || {
        InterlockError::UserError(format!(
            "lock '{}' does not exist at: {}",
            name,
            path.display()
        ))
    };
    let unavailable = |source: io::Error| InterlockError::ResourceUnavailable {
        path: path.clone(),
        source,
    };

    let mut file = match fs.open_read_write(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(missing()),
        Err(e) => return Err(unavailable(e)),
    };

    let mut info = LockInfo {
        path: path.clone(),
        name: name.to_string(),
        state: LockState::Free,
        metadata: LockMetadata::read_from(&mut file),
        is_stale: false,
    };

    // Dropping `file` on any early return closes it and releases the lock.
    let locked = retry_with_deadline(&SystemClock, Timeout::ZERO, Duration::ZERO, || {
        sys::try_lock_exclusive(&file)
    });
    if let Err(e) = locked {
        if !sys::is_contention(&e) {
            return Err(unavailable(e));
        }
        info.state = LockState::Held;
        info.is_stale = info
            .metadata
            .as_ref()
            .is_some_and(|meta| meta.is_stale(stale_minutes));
        return Err(InterlockError::LockHeld(info.to_string()));
    }

    if !sys::is_linked_at(fs, &file, &path).map_err(unavailable)? {
        return Err(InterlockError::UserError(format!(
            "lock '{}' was replaced while clearing; run clear again",
            name
        )));
    }

    fs.delete(&path).map_err(|e| {
        InterlockError::UserError(format!(
            "failed to clear lock '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(info)
}
