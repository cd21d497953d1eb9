//! RAII guard for a process lock acquisition.

use super::process_lock::ProcessLock;

/// One acquisition of a [`ProcessLock`], released when dropped.
///
/// Guards nest: each guard accounts for exactly one level of the lock's
/// reference count.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ProcessLockGuard<'a> {
    lock: &'a ProcessLock,
    released: bool,
}

impl<'a> ProcessLockGuard<'a> {
    pub(super) fn new(lock: &'a ProcessLock) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// The lock this guard belongs to.
    pub fn lock(&self) -> &ProcessLock {
        self.lock
    }

    /// Release the acquisition before the guard goes out of scope.
    pub fn release(mut self) {
        self.released = true;
        self.lock.release();
    }
}

impl Drop for ProcessLockGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.lock.release();
        }
    }
}
