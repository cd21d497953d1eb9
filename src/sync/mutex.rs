//! Recursive mutual exclusion.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::fmt;

/// RAII guard for a [`RecursiveMutex`]; dropping it releases one level of
/// ownership. Guards are not `Send`, so a level is always released by the
/// thread that took it.
pub type RecursiveMutexGuard<'a, T> = ReentrantMutexGuard<'a, T>;

/// A mutex that the thread currently holding it may lock again without
/// blocking itself.
///
/// The lock becomes available to other threads only once every guard taken
/// by the owner has been dropped. Acquisition is not fair. The guard gives
/// shared access only; wrap the data in a `Cell`/`RefCell` when it has to
/// be mutated under the lock.
///
/// A mutex cannot be dropped while locked: every guard borrows it.
pub struct RecursiveMutex<T> {
    inner: ReentrantMutex<T>,
}

impl<T> RecursiveMutex<T> {
    /// Create an unlocked mutex protecting `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: ReentrantMutex::new(value),
        }
    }

    /// Block until the calling thread owns the lock.
    ///
    /// Returns immediately when the calling thread already owns it.
    pub fn lock(&self) -> RecursiveMutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Take the lock only if that can be done without blocking.
    ///
    /// Always succeeds when uncontended or when the calling thread is the
    /// owner; always fails, immediately, when another thread holds it.
    pub fn try_lock(&self) -> Option<RecursiveMutexGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// Whether any thread currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Whether the calling thread currently holds the lock.
    pub fn is_owned_by_current_thread(&self) -> bool {
        self.inner.is_owned_by_current_thread()
    }

    /// Mutable access without locking; the borrow proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Consume the mutex and return the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: Default> Default for RecursiveMutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for RecursiveMutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveMutex")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}
