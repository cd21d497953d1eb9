//! Implementation of the `interlock list` command.

use super::status::print_info;
use interlock::config::Config;
use interlock::error::Result;
use interlock::exit_codes;
use interlock::fs::LocalFs;
use interlock::locks::{LockState, list_locks};

pub fn cmd_list(config: &Config) -> Result<i32> {
    let lock_dir = config.lock_dir();
    let locks = list_locks(&LocalFs, &lock_dir, config.stale_minutes)?;

    if locks.is_empty() {
        println!("No lock files in {}.", lock_dir.display());
        return Ok(exit_codes::SUCCESS);
    }

    let held = locks.iter().filter(|l| l.state == LockState::Held).count();
    println!("Lock files ({}, {} held):", locks.len(), held);
    println!();

    for lock in &locks {
        print_info(lock, config.stale_minutes);
        println!();
    }

    let leftovers = locks.iter().filter(|l| l.is_leftover()).count();
    if leftovers > 0 {
        println!(
            "Note: {} lock file(s) were left behind by holders that exited. \
             Use `interlock clear <name> --force` to remove them.",
            leftovers
        );
    }

    Ok(exit_codes::SUCCESS)
}
