//! Command implementations for interlock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command returns the process exit code on success;
//! failures are reported by `main` through [`InterlockError::exit_code`].

mod clear;
mod init;
mod list;
mod path;
mod run;
mod status;

use crate::cli::{Cli, Command};
use interlock::config::Config;
use interlock::error::{InterlockError, Result};
use interlock::events::{Event, append_event};

/// Dispatch a command to its implementation.
///
/// `init` never loads the existing config, so it can replace a broken file;
/// every other command works from the resolved config.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let config = || Config::resolve(cli.config.as_deref());

    match cli.command {
        Command::Init(args) => init::cmd_init(cli.config.as_deref(), &args),
        Command::Run(args) => run::cmd_run(&config()?, args),
        Command::Status(args) => status::cmd_status(&config()?, &args.name),
        Command::List => list::cmd_list(&config()?),
        Command::Clear(args) => clear::cmd_clear(&config()?, &args),
        Command::Path(args) => path::cmd_path(&config()?, &args.name),
    }
}

/// Append `event` to the audit log when events are enabled.
///
/// Logging is best-effort: a failure is reported as a warning and never
/// fails the command.
fn record_event(config: &Config, event: Event) {
    if !config.events_enabled {
        return;
    }

    if let Err(e) = append_event(&config.events_path(), &event) {
        eprintln!("Warning: failed to log {} event: {}", event.action, e);
    }
}

/// Refuse to go on without `--force`.
fn require_force(force: bool, what: &str, retry: &str) -> Result<()> {
    if force {
        return Ok(());
    }

    Err(InterlockError::UserError(format!(
        "refusing to {} without --force flag.\n\n\
         To proceed, run:\n  {}",
        what, retry
    )))
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_config;
    use super::*;
    use interlock::events::{EventAction, read_events};

    #[test]
    fn record_event_appends_when_enabled() {
        let (_temp_dir, config) = temp_config();

        record_event(&config, Event::new(EventAction::Acquire).with_lock("db"));

        let events = read_events(&config.events_path()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].lock.as_deref(), Some("db"));
    }

    #[test]
    fn record_event_skipped_when_disabled() {
        let (_temp_dir, mut config) = temp_config();
        config.events_enabled = false;

        record_event(&config, Event::new(EventAction::Acquire));

        assert!(!config.events_path().exists());
    }

    #[test]
    fn require_force_refuses_without_flag() {
        let err = require_force(false, "clear lock 'db'", "interlock clear db --force")
            .unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(require_force(true, "clear lock 'db'", "").is_ok());
    }
}
