//! Time source and timeout arithmetic shared by the blocking primitives.
//!
//! Waits are expressed with [`Timeout`]. The integer convention used by the
//! CLI and by [`Timeout::from_millis`] is: negative means "block forever",
//! zero means "poll once", positive means "give up after that many
//! milliseconds".

use std::time::{Duration, Instant};

/// How long a blocking call may wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Block until the condition holds.
    Infinite,
    /// Give up once this much time has elapsed. `Duration::ZERO` polls once.
    After(Duration),
}

impl Timeout {
    /// Poll once without blocking.
    pub const ZERO: Timeout = Timeout::After(Duration::ZERO);

    /// Convert from milliseconds; any negative value means [`Timeout::Infinite`].
    pub fn from_millis(millis: i64) -> Self {
        if millis < 0 {
            Timeout::Infinite
        } else {
            Timeout::After(Duration::from_millis(millis as u64))
        }
    }

    /// Whether this timeout forbids blocking at all.
    pub fn is_zero(&self) -> bool {
        matches!(self, Timeout::After(d) if d.is_zero())
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Timeout::After(duration)
    }
}

/// Source of monotonic time, and the way blocked retry loops pause.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the calling thread.
    fn sleep(&self, duration: Duration);
}

/// The real monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Absolute point in time after which a timed wait gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Never expires.
    Never,
    /// Expires at this instant.
    At(Instant),
}

impl Deadline {
    /// Compute the deadline `timeout` past `now`.
    ///
    /// A timeout too large to be represented as an `Instant` is treated as
    /// infinite rather than wrapping around into the past.
    pub fn after(now: Instant, timeout: Timeout) -> Self {
        match timeout {
            Timeout::Infinite => Deadline::Never,
            Timeout::After(duration) => match now.checked_add(duration) {
                Some(at) => Deadline::At(at),
                None => Deadline::Never,
            },
        }
    }

    /// Whether `now` is at or past the deadline.
    pub fn has_passed(&self, now: Instant) -> bool {
        match self {
            Deadline::Never => false,
            Deadline::At(at) => now >= *at,
        }
    }

    /// The expiry instant, if any.
    pub fn instant(&self) -> Option<Instant> {
        match self {
            Deadline::Never => None,
            Deadline::At(at) => Some(*at),
        }
    }
}
