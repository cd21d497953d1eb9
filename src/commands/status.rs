//! Implementation of the `interlock status` command.

use interlock::config::Config;
use interlock::error::Result;
use interlock::exit_codes;
use interlock::fs::LocalFs;
use interlock::locks::{LockInfo, LockState, lock_status};

/// Print the state of one lock.
///
/// Exits [`exit_codes::LOCK_FAILURE`] while somebody holds it, so scripts
/// can test `interlock status <name>` directly.
pub fn cmd_status(config: &Config, name: &str) -> Result<i32> {
    let info = lock_status(&LocalFs, &config.lock_dir(), name, config.stale_minutes)?;

    print_info(&info, config.stale_minutes);

    Ok(match info.state {
        LockState::Held => exit_codes::LOCK_FAILURE,
        LockState::Free | LockState::Missing => exit_codes::SUCCESS,
    })
}

pub(super) fn print_info(info: &LockInfo, stale_minutes: u32) {
    println!("Lock:       {}", info.name);
    println!("State:      {}", info.state);

    if let Some(meta) = &info.metadata {
        let label = if info.state == LockState::Held {
            "Holder"
        } else {
            "Last holder"
        };
        println!("{:<11} {}", format!("{}:", label), meta.owner);
        if let Some(pid) = meta.pid {
            println!("PID:        {}", pid);
        }
        println!(
            "Created:    {}",
            meta.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("Age:        {}", meta.age_string());
        if let Some(purpose) = &meta.purpose {
            println!("Purpose:    {}", purpose);
        }
    }

    if info.is_stale {
        println!("Status:     STALE (exceeds {} min threshold)", stale_minutes);
    }
    if info.is_leftover() {
        println!("Status:     LEFTOVER (holder exited without releasing)");
    }
    println!("Path:       {}", info.path.display());
}
