//! Implementation of the `interlock path` command.

use interlock::config::Config;
use interlock::error::Result;
use interlock::exit_codes;
use interlock::fs::lock_file_path;

/// Print where the lock file for `name` lives. Nothing is created.
pub fn cmd_path(config: &Config, name: &str) -> Result<i32> {
    let path = lock_file_path(&config.lock_dir(), name)?;
    println!("{}", path.display());
    Ok(exit_codes::SUCCESS)
}
