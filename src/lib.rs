//! Interlock: locking primitives for threads and processes.
//!
//! - [`RecursiveMutex`]: a mutex the owning thread may lock repeatedly
//! - [`Event`]: a waitable signal with manual- or auto-reset behaviour
//! - [`ProcessLock`]: a named lock shared between processes through a lock
//!   file, reentrant within the instance that holds it
//!
//! ```no_run
//! use interlock::{ProcessLock, Timeout};
//! use std::time::Duration;
//!
//! let lock = ProcessLock::new("nightly-backup")?;
//! let _guard = lock.guard(Timeout::After(Duration::from_secs(5)))?;
//! // ... only one process gets here at a time ...
//! # Ok::<(), interlock::error::InterlockError>(())
//! ```

#[cfg(not(unix))]
compile_error!("interlock relies on POSIX record locks and only supports Unix targets");

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod process;
pub mod sync;

pub use clock::{Clock, SystemClock, Timeout};
pub use error::{InterlockError, Result};
pub use locks::{LockSettings, ProcessLock, ProcessLockGuard};
pub use sync::{Event, RecursiveMutex, RecursiveMutexGuard, ResetMode};
