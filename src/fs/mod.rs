//! Filesystem services for interlock.
//!
//! - [`FileSystem`] / [`LocalFs`]: the file operations the process lock needs
//! - lock directory and lock file path resolution
//! - atomic writes, used for configuration files

mod atomic;
mod local;
mod paths;

pub use atomic::atomic_write_file;
pub use local::{FileSystem, LocalFs};
pub use paths::{
    LOCK_EXTENSION, current_user, default_lock_dir, lock_file_path, lock_name_from_path,
    validate_lock_name,
};
