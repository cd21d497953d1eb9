//! Implementation of the `interlock run` command.
//!
//! Holds a named lock for exactly as long as the child command runs.

use super::record_event;
use crate::cli::RunArgs;
use interlock::clock::Timeout;
use interlock::config::Config;
use interlock::error::{InterlockError, Result};
use interlock::events::{Event, EventAction};
use interlock::exit_codes;
use interlock::locks::{LockSettings, ProcessLock};
use interlock::process::run_inherited;
use serde_json::json;
use std::time::Instant;

/// Acquire `args.name`, run the command, release.
///
/// # Returns
///
/// * `Ok(code)` - The command ran; `code` is its exit code, or
///   [`exit_codes::COMMAND_FAILURE`] if it was killed by a signal
/// * `Err(InterlockError::AcquisitionTimeout)` - The lock stayed busy
/// * `Err(InterlockError::CommandError)` - The command could not be started
pub fn cmd_run(config: &Config, args: RunArgs) -> Result<i32> {
    let timeout = args
        .timeout
        .map(Timeout::from_millis)
        .unwrap_or_else(|| config.default_timeout());

    let lock = ProcessLock::with_settings(&args.name, LockSettings::from_config(config))?;
    lock.set_purpose(args.purpose.clone());

    let started = Instant::now();
    if let Err(e) = lock.lock(timeout) {
        if let InterlockError::AcquisitionTimeout { waited, .. } = &e {
            record_event(
                config,
                Event::new(EventAction::Timeout)
                    .with_lock(&args.name)
                    .with_details(json!({
                        "timeout_ms": timeout_millis(timeout),
                        "waited_ms": waited.as_millis() as u64,
                    })),
            );
        }
        return Err(e);
    }

    let waited = started.elapsed();
    record_event(
        config,
        Event::new(EventAction::Acquire)
            .with_lock(&args.name)
            .with_details(json!({
                "pid": std::process::id(),
                "purpose": args.purpose,
                "waited_ms": waited.as_millis() as u64,
                "command": args.command,
            })),
    );

    let held_since = Instant::now();
    let outcome = run_inherited(&args.command);
    lock.release();

    let exit_code = outcome.as_ref().ok().copied().flatten();
    record_event(
        config,
        Event::new(EventAction::Release)
            .with_lock(&args.name)
            .with_details(json!({
                "held_ms": held_since.elapsed().as_millis() as u64,
                "exit_code": exit_code,
                "started": outcome.is_ok(),
            })),
    );

    Ok(outcome?.unwrap_or(exit_codes::COMMAND_FAILURE))
}

fn timeout_millis(timeout: Timeout) -> i64 {
    match timeout {
        Timeout::Infinite => -1,
        Timeout::After(duration) => duration.as_millis().try_into().unwrap_or(i64::MAX),
    }
}
