//! Implementation of the `interlock init` command.

use super::{record_event, require_force};
use crate::cli::InitArgs;
use interlock::config::Config;
use interlock::error::{InterlockError, Result};
use interlock::events::{Event, EventAction};
use interlock::exit_codes;
use serde_json::json;
use std::path::Path;

/// Write the default config to the file `interlock` would read.
///
/// An existing file is only replaced with `--force`.
pub fn cmd_init(explicit: Option<&Path>, args: &InitArgs) -> Result<i32> {
    let path = Config::source_path(explicit).ok_or_else(|| {
        InterlockError::UserError(
            "cannot determine a config location: HOME is not set.\n\
             Fix: pass --config <path> or set INTERLOCK_CONFIG."
                .to_string(),
        )
    })?;

    if path.exists() {
        require_force(
            args.force,
            &format!("overwrite existing config '{}'", path.display()),
            &format!("interlock --config {} init --force", path.display()),
        )?;
    }

    let config = Config::default();
    config.save(&path)?;

    record_event(
        &config,
        Event::new(EventAction::Init).with_details(json!({
            "config_path": path.display().to_string(),
            "force": args.force,
        })),
    );

    println!("Wrote default config: {}", path.display());
    println!("Lock directory:       {}", config.lock_dir().display());

    Ok(exit_codes::SUCCESS)
}
