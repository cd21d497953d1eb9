//! Named inter-process lock with reentrancy inside the owning instance.

use super::guard::ProcessLockGuard;
use super::metadata::LockMetadata;
use super::retry::retry_with_deadline;
use super::sys;
use crate::clock::{Clock, Deadline, SystemClock, Timeout};
use crate::config::Config;
use crate::error::{InterlockError, Result};
use crate::fs::{FileSystem, LocalFs, default_lock_dir, lock_file_path};
use crate::sync::RecursiveMutex;
use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Pause between attempts while a lock is contended.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Where lock files live and which collaborators a [`ProcessLock`] uses.
#[derive(Clone)]
pub struct LockSettings {
    /// Directory holding `<name>.lock` files.
    pub lock_dir: PathBuf,
    /// Pause between attempts while the lock is contended.
    pub retry_interval: Duration,
    /// File service used to materialize and open lock files.
    pub fs: Arc<dyn FileSystem>,
    /// Time source for deadlines and retry pauses.
    pub clock: Arc<dyn Clock>,
}

impl LockSettings {
    /// Default settings rooted at `lock_dir`.
    pub fn in_dir(lock_dir: impl Into<PathBuf>) -> Self {
        Self {
            lock_dir: lock_dir.into(),
            ..Self::default()
        }
    }

    /// Settings derived from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            lock_dir: config.lock_dir(),
            retry_interval: config.retry_interval(),
            ..Self::default()
        }
    }
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            lock_dir: default_lock_dir(),
            retry_interval: DEFAULT_RETRY_INTERVAL,
            fs: Arc::new(LocalFs),
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for LockSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockSettings")
            .field("lock_dir", &self.lock_dir)
            .field("retry_interval", &self.retry_interval)
            .finish_non_exhaustive()
    }
}

/// An open lock file on which this process holds the OS record lock.
///
/// Dropping it clears the holder metadata, unlocks, and closes the file.
struct LockedFile {
    file: File,
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = self.file.set_len(0) {
            eprintln!(
                "Warning: failed to clear holder metadata in '{}': {}",
                self.path.display(),
                e
            );
        }

        // Must not stay locked after release: interruptions are retried forever.
        let unlocked = retry_with_deadline(&*self.clock, Timeout::ZERO, Duration::ZERO, || {
            sys::unlock(&self.file)
        });
        if let Err(e) = unlocked {
            eprintln!(
                "Warning: failed to unlock '{}': {} (closing the file releases it)",
                self.path.display(),
                e
            );
        }
    }
}

#[derive(Default)]
struct Holding {
    file: Option<LockedFile>,
    ref_count: usize,
    purpose: Option<String>,
}

/// An exclusive lock shared between processes through a lock file.
///
/// Each name maps onto one file in the lock directory; every process that
/// opens a `ProcessLock` with the same name and directory contends on it.
/// Within one instance the lock is reentrant: the OS lock is taken on the
/// first successful acquisition and released when the matching number of
/// [`release`](Self::release) calls has been made. Concurrent calls from
/// several threads on one instance are serialized internally, so an instance
/// can be shared through an `Arc`.
///
/// The lock is advisory. Dropping the instance releases the OS lock no
/// matter how many acquisitions are outstanding.
///
/// On Linux, two separate instances for the same name conflict even inside
/// one process. Elsewhere, POSIX record locks only arbitrate between
/// processes, so separate instances in one process do not exclude each other.
pub struct ProcessLock {
    name: String,
    path: PathBuf,
    retry_interval: Duration,
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    state: RecursiveMutex<RefCell<Holding>>,
}

impl ProcessLock {
    /// A lock named `name` in the default per-user lock directory.
    pub fn new(name: &str) -> Result<Self> {
        Self::with_settings(name, LockSettings::default())
    }

    /// A lock named `name` using explicit settings.
    ///
    /// Nothing touches the filesystem until the first acquisition.
    pub fn with_settings(name: &str, settings: LockSettings) -> Result<Self> {
        let path = lock_file_path(&settings.lock_dir, name)?;
        Ok(Self {
            name: name.to_string(),
            path,
            retry_interval: settings.retry_interval,
            fs: settings.fs,
            clock: settings.clock,
            state: RecursiveMutex::new(RefCell::new(Holding::default())),
        })
    }

    /// The lock name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lock file backing this lock.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Outstanding acquisitions on this instance.
    pub fn ref_count(&self) -> usize {
        self.state.lock().borrow().ref_count
    }

    /// Whether this instance currently holds the OS lock.
    pub fn is_held(&self) -> bool {
        self.state.lock().borrow().file.is_some()
    }

    /// Purpose recorded in the lock file on the next OS-level acquisition.
    pub fn set_purpose(&self, purpose: Option<String>) {
        self.state.lock().borrow_mut().purpose = purpose;
    }

    /// Acquire the lock, waiting at most `timeout`.
    ///
    /// Returns at once when this instance already holds it. Otherwise the
    /// lock file is created if needed and an exclusive record lock is
    /// attempted, retried every retry interval until the timeout runs out.
    ///
    /// # Errors
    ///
    /// * [`InterlockError::AcquisitionTimeout`] - still contended at the deadline
    /// * [`InterlockError::ResourceUnavailable`] - the lock file could not be
    ///   created or opened, or the OS refused the lock for a reason other
    ///   than contention
    ///
    /// Either way the instance is left unheld and may be retried.
    pub fn lock(&self, timeout: Timeout) -> Result<()> {
        let guard = self.state.lock();
        let mut holding = guard.borrow_mut();

        if holding.ref_count > 0 {
            holding.ref_count += 1;
            return Ok(());
        }

        let file = self.lock_file(timeout, holding.purpose.as_deref())?;
        holding.file = Some(file);
        holding.ref_count = 1;
        Ok(())
    }

    /// [`lock`](Self::lock) reduced to success or failure.
    pub fn acquire(&self, timeout: Timeout) -> bool {
        self.lock(timeout).is_ok()
    }

    /// Acquire the lock and return a guard that releases it when dropped.
    pub fn guard(&self, timeout: Timeout) -> Result<ProcessLockGuard<'_>> {
        self.lock(timeout)?;
        Ok(ProcessLockGuard::new(self))
    }

    /// Give back one acquisition. The OS lock is released and the file
    /// closed when the count reaches zero. Does nothing when not held.
    pub fn release(&self) {
        let guard = self.state.lock();
        let mut holding = guard.borrow_mut();

        if holding.ref_count == 0 {
            return;
        }

        holding.ref_count -= 1;
        if holding.ref_count == 0 {
            holding.file = None;
        }
    }

    fn lock_file(&self, timeout: Timeout, purpose: Option<&str>) -> Result<LockedFile> {
        let unavailable = |source: io::Error| InterlockError::ResourceUnavailable {
            path: self.path.clone(),
            source,
        };

        let started = self.clock.now();
        let deadline = Deadline::after(started, timeout);
        let mut remaining = timeout;

        let file = loop {
            if !self.fs.exists(&self.path) {
                self.fs.create(&self.path).map_err(unavailable)?;
            }
            let file = self.fs.open_read_write(&self.path).map_err(unavailable)?;

            let locked = retry_with_deadline(&*self.clock, remaining, self.retry_interval, || {
                sys::try_lock_exclusive(&file)
            });

            // On failure `file` is dropped here, closing the descriptor.
            if let Err(e) = locked {
                return Err(if sys::is_contention(&e) {
                    InterlockError::AcquisitionTimeout {
                        name: self.name.clone(),
                        waited: self.clock.now().saturating_duration_since(started),
                    }
                } else {
                    unavailable(e)
                });
            }

            if sys::is_linked_at(&*self.fs, &file, &self.path).map_err(unavailable)? {
                break file;
            }

            // The file was cleared between open and lock. Dropping it releases
            // the lock on the orphan; start over on whatever the path names now.
            remaining = match deadline.instant() {
                Some(at) => Timeout::After(at.saturating_duration_since(self.clock.now())),
                None => Timeout::Infinite,
            };
        };

        let mut locked = LockedFile {
            file,
            path: self.path.clone(),
            clock: Arc::clone(&self.clock),
        };

        if let Err(e) = LockMetadata::new(purpose).write_to(&mut locked.file) {
            eprintln!("Warning: lock '{}' acquired but {}", self.name, e);
        }

        Ok(locked)
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        let holding = self.state.get_mut().get_mut();
        holding.ref_count = 0;
        holding.file = None;
    }
}

impl fmt::Debug for ProcessLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessLock")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("ref_count", &self.ref_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use tempfile::TempDir;

    fn locked_file(path: &Path, file: File) -> LockedFile {
        LockedFile {
            file,
            path: path.to_path_buf(),
            clock: Arc::new(SystemClock),
        }
    }

    #[test]
    fn test_locked_file_drop_clears_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.lock");
        fs::write(&path, "holder").unwrap();
        let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
        sys::try_lock_exclusive(&file).unwrap();

        drop(locked_file(&path, file));

        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_locked_file_drop_survives_failed_truncate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.lock");
        fs::write(&path, "holder").unwrap();
        // Truncating through a read-only handle fails.
        let file = File::open(&path).unwrap();

        drop(locked_file(&path, file));

        assert_eq!(fs::read_to_string(&path).unwrap(), "holder");
    }
}
