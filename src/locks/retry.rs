//! The retry loop shared by lock acquisition and unlocking.
//!
//! - `Interrupted`: try again at once; the attempt does not count against
//!   the timeout
//! - any other error: give up when the timeout is zero or the deadline has
//!   passed, otherwise pause for `interval` and try again
//! - `Timeout::Infinite`: never give up
//!
//! Unlocking runs this with `Timeout::ZERO`, so it retries interruptions
//! indefinitely but reports any other failure at once.

use crate::clock::{Clock, Deadline, Timeout};
use std::io;
use std::time::Duration;

/// Run `attempt` until it succeeds or the timeout is exhausted.
///
/// On exhaustion the last non-interrupt error is returned.
pub(crate) fn retry_with_deadline<T, F>(
    clock: &dyn Clock,
    timeout: Timeout,
    interval: Duration,
    mut attempt: F,
) -> io::Result<T>
where
    F: FnMut() -> io::Result<T>,
{
    let deadline = Deadline::after(clock.now(), timeout);

    loop {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                if timeout.is_zero() || deadline.has_passed(clock.now()) {
                    return Err(e);
                }
                clock.sleep(interval);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::ManualClock;

    const INTERVAL: Duration = Duration::from_millis(10);

    fn busy() -> io::Error {
        io::Error::from(io::ErrorKind::WouldBlock)
    }

    fn interrupted() -> io::Error {
        io::Error::from(io::ErrorKind::Interrupted)
    }

    #[test]
    fn test_immediate_success() {
        let clock = ManualClock::new();
        let value = retry_with_deadline(&clock, Timeout::ZERO, INTERVAL, || Ok(7)).unwrap();

        assert_eq!(value, 7);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_zero_timeout_gives_up_after_one_attempt() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        let err = retry_with_deadline(&clock, Timeout::ZERO, INTERVAL, || {
            attempts += 1;
            Err::<(), _>(busy())
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert_eq!(attempts, 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_interruptions_do_not_consume_budget() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        retry_with_deadline(&clock, Timeout::ZERO, INTERVAL, || {
            attempts += 1;
            if attempts < 50 {
                Err(interrupted())
            } else {
                Ok(())
            }
        })
        .unwrap();

        assert_eq!(attempts, 50);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_interruption_then_failure_with_zero_timeout() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        let err = retry_with_deadline(&clock, Timeout::ZERO, INTERVAL, || {
            attempts += 1;
            if attempts < 3 {
                Err::<(), _>(interrupted())
            } else {
                Err(io::Error::from(io::ErrorKind::InvalidInput))
            }
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_bounded_timeout_sleeps_between_attempts() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        let err = retry_with_deadline(&clock, Timeout::from_millis(35), INTERVAL, || {
            attempts += 1;
            Err::<(), _>(busy())
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        // Attempts at t = 0, 10, 20, 30, 40; the deadline is noticed after the last.
        assert_eq!(attempts, 5);
        assert_eq!(clock.sleeps(), vec![INTERVAL; 4]);
    }

    #[test]
    fn test_bounded_timeout_succeeds_before_deadline() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        retry_with_deadline(&clock, Timeout::from_millis(1_000), INTERVAL, || {
            attempts += 1;
            if attempts == 4 { Ok(()) } else { Err(busy()) }
        })
        .unwrap();

        assert_eq!(attempts, 4);
        assert_eq!(clock.sleeps().len(), 3);
    }

    #[test]
    fn test_infinite_timeout_keeps_trying() {
        let clock = ManualClock::new();
        let mut attempts = 0;

        retry_with_deadline(&clock, Timeout::Infinite, INTERVAL, || {
            attempts += 1;
            if attempts == 500 { Ok(()) } else { Err(busy()) }
        })
        .unwrap();

        assert_eq!(attempts, 500);
        assert_eq!(clock.sleeps().len(), 499);
    }
}
