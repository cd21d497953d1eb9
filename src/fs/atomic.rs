//! Crash-safe replacement of small text files such as the config.
//!
//! Content goes to `.<name>.<pid>.tmp` next to the target, is synced, then
//! renamed over the target, so a reader sees either the old file or the new
//! one. The pid keeps two concurrent `interlock init` runs out of each
//! other's temporary file.

use super::local::{FileSystem, LocalFs};
use crate::error::{InterlockError, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file removed on drop unless it was renamed into place.
struct Pending {
    path: PathBuf,
    committed: bool,
}

impl Drop for Pending {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Replace `path` with `content`, creating missing parent directories.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let target = path.as_ref();
    let failed = |step: &str, e: io::Error| {
        InterlockError::UserError(format!(
            "failed to write '{}': {}: {}",
            target.display(),
            step,
            e
        ))
    };

    let file_name = target.file_name().ok_or_else(|| {
        InterlockError::UserError(format!("invalid file path '{}'", target.display()))
    })?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    LocalFs
        .create_dir_all(dir)
        .map_err(|e| failed("cannot create directory", e))?;

    let mut pending = Pending {
        path: dir.join(format!(
            ".{}.{}.tmp",
            file_name.to_string_lossy(),
            std::process::id()
        )),
        committed: false,
    };

    let mut file =
        File::create(&pending.path).map_err(|e| failed("cannot create temporary file", e))?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| failed("cannot write temporary file", e))?;
    drop(file);

    fs::rename(&pending.path, target).map_err(|e| failed("cannot replace", e))?;
    pending.committed = true;

    // The new directory entry survives a crash only once the directory is synced.
    if let Ok(dir) = File::open(dir) {
        let _ = dir.sync_all();
    }

    Ok(())
}
