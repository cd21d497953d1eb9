//! Implementation of the `interlock clear` command.

use super::{record_event, require_force};
use crate::cli::ClearArgs;
use interlock::config::Config;
use interlock::error::Result;
use interlock::events::{Event, EventAction};
use interlock::exit_codes;
use interlock::fs::LocalFs;
use interlock::locks::clear_lock;
use serde_json::json;

/// Remove the lock file of a lock nobody holds.
///
/// Held locks are never cleared; the OS lock is authoritative, so there is
/// no way to break a live holder's lock.
pub fn cmd_clear(config: &Config, args: &ClearArgs) -> Result<i32> {
    require_force(
        args.force,
        &format!("clear lock '{}'", args.name),
        &format!("interlock clear {} --force", args.name),
    )?;

    let cleared = clear_lock(&LocalFs, &config.lock_dir(), &args.name, config.stale_minutes)?;

    let previous = cleared.metadata.as_ref();
    record_event(
        config,
        Event::new(EventAction::Clear)
            .with_lock(&cleared.name)
            .with_details(json!({
                "path": cleared.path.display().to_string(),
                "leftover": cleared.is_leftover(),
                "previous_owner": previous.map(|m| m.owner.clone()),
                "previous_pid": previous.and_then(|m| m.pid),
                "force": args.force,
            })),
    );

    println!("Cleared lock: {}", cleared.name);
    if let Some(meta) = previous {
        println!("  Last holder: {}", meta.owner);
        println!("  Age:         {}", meta.age_string());
    }
    println!("  Path:        {}", cleared.path.display());

    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::temp_config;
    use super::*;
    use interlock::clock::Timeout;
    use interlock::events::read_events;
    use interlock::locks::{LockSettings, ProcessLock};

    fn clear_args(name: &str, force: bool) -> ClearArgs {
        ClearArgs {
            name: name.to_string(),
            force,
        }
    }

    #[test]
    fn clear_requires_force() {
        let (_temp_dir, config) = temp_config();
        let err = cmd_clear(&config, &clear_args("db", false)).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn clear_missing_lock_fails() {
        let (_temp_dir, config) = temp_config();
        let err = cmd_clear(&config, &clear_args("db", true)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn clear_removes_free_lock_file_and_logs() {
        let (_temp_dir, config) = temp_config();
        let lock = ProcessLock::with_settings("db", LockSettings::from_config(&config)).unwrap();
        assert!(lock.acquire(Timeout::ZERO));
        lock.release();
        assert!(lock.path().exists());

        cmd_clear(&config, &clear_args("db", true)).unwrap();

        assert!(!lock.path().exists());
        let events = read_events(&config.events_path()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, EventAction::Clear);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn clear_refuses_held_lock() {
        let (_temp_dir, config) = temp_config();
        let lock = ProcessLock::with_settings("db", LockSettings::from_config(&config)).unwrap();
        assert!(lock.acquire(Timeout::ZERO));

        let err = cmd_clear(&config, &clear_args("db", true)).unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
        assert!(lock.path().exists());
    }
}
