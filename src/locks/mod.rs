//! Named inter-process locks.
//!
//! A [`ProcessLock`] excludes other processes through an OS record lock on a
//! lock file, and is reentrant for the instance that holds it.
//!
//! # Lock Files
//!
//! Lock files live in a per-user directory (see
//! [`default_lock_dir`](crate::fs::default_lock_dir)) as `<name>.lock`. They
//! are created on first use and never removed by locking itself; only
//! [`clear_lock`] deletes them.
//!
//! # Lock Metadata
//!
//! While a lock is held its file contains JSON metadata:
//! - `owner`: The owner of the lock (e.g., `user@HOST`)
//! - `pid`: The process ID
//! - `created_at`: RFC3339 timestamp
//! - `purpose`: Optional free text given by the holder
//!
//! # RAII Guards
//!
//! [`ProcessLock::guard`] returns a guard that releases one acquisition when
//! dropped; dropping the [`ProcessLock`] itself releases the OS lock.

mod guard;
mod metadata;
mod operations;
mod process_lock;
mod retry;
mod sys;
mod types;


// Re-export public API
pub use guard::ProcessLockGuard;
pub use metadata::LockMetadata;
pub(crate) use metadata::owner_string;
pub use operations::{clear_lock, list_locks, lock_status, query_lock};
pub use process_lock::{DEFAULT_RETRY_INTERVAL, LockSettings, ProcessLock};
pub use types::{LockInfo, LockState};
