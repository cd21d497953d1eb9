//! Waitable event.
//!
//! An [`Event`] is a boolean flag paired with a condition variable. Every
//! read or write of the flag happens under the same lock the waiters use to
//! check it, so a `signal()` can never slip in between a waiter's check and
//! its sleep.

use crate::clock::{Deadline, Timeout};
use parking_lot::{Condvar, Mutex};
use std::time::Instant;

/// What happens to the flag once a waiter has observed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// The flag stays set until [`Event::reset`] is called.
    Manual,
    /// The first waiter to observe the flag clears it.
    Auto,
}

/// A binary signal threads can block on.
///
/// `signal()` wakes every blocked waiter. In [`ResetMode::Auto`] exactly one
/// of them consumes the signal and the rest go back to sleep; in
/// [`ResetMode::Manual`] all current and later waiters pass until `reset()`.
///
/// Dropping an event while a thread is blocked in `wait` cannot happen in
/// safe Rust: waiters hold a borrow (usually through an `Arc`).
#[derive(Debug)]
pub struct Event {
    signaled: Mutex<bool>,
    condition: Condvar,
    mode: ResetMode,
}

impl Event {
    /// Create an unsignaled event.
    pub fn new(mode: ResetMode) -> Self {
        Self {
            signaled: Mutex::new(false),
            condition: Condvar::new(),
            mode,
        }
    }

    /// Create an unsignaled manual-reset event.
    pub fn manual_reset() -> Self {
        Self::new(ResetMode::Manual)
    }

    /// Create an unsignaled auto-reset event.
    pub fn auto_reset() -> Self {
        Self::new(ResetMode::Auto)
    }

    /// The reset mode fixed at construction.
    pub fn mode(&self) -> ResetMode {
        self.mode
    }

    /// Block until the event is signaled or the timeout elapses.
    ///
    /// Returns `true` when the signal was observed, `false` on timeout.
    /// [`Timeout::ZERO`] checks the flag once and never blocks. Spurious
    /// wake-ups are absorbed: the call only returns `true` once the flag is
    /// actually set.
    pub fn wait(&self, timeout: Timeout) -> bool {
        let mut signaled = self.signaled.lock();

        if !*signaled {
            if timeout.is_zero() {
                return false;
            }

            let deadline = Deadline::after(Instant::now(), timeout);
            while !*signaled {
                match deadline.instant() {
                    None => self.condition.wait(&mut signaled),
                    Some(at) => {
                        if self.condition.wait_until(&mut signaled, at).timed_out() && !*signaled {
                            return false;
                        }
                    }
                }
            }
        }

        if self.mode == ResetMode::Auto {
            *signaled = false;
        }
        true
    }

    /// [`Event::wait`] with the millisecond convention: negative blocks
    /// forever, zero polls.
    pub fn wait_millis(&self, timeout_millis: i64) -> bool {
        self.wait(Timeout::from_millis(timeout_millis))
    }

    /// Set the flag and wake every thread blocked in `wait`.
    pub fn signal(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.condition.notify_all();
    }

    /// Clear the flag regardless of its current state.
    pub fn reset(&self) {
        *self.signaled.lock() = false;
    }

    /// Snapshot of the flag. Stale as soon as it returns.
    pub fn is_signaled(&self) -> bool {
        *self.signaled.lock()
    }
}

impl Default for Event {
    /// An auto-reset event.
    fn default() -> Self {
        Self::auto_reset()
    }
}
