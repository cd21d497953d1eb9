//! CLI argument parsing for interlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Interlock: named inter-process locks backed by lock files.
///
/// A lock is identified by a name and lives as `<name>.lock` in the lock
/// directory. Holding it excludes every other process that asks for the
/// same name.
#[derive(Parser, Debug)]
#[command(name = "interlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file to use instead of $INTERLOCK_CONFIG or the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for interlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a config file with default settings.
    Init(InitArgs),

    /// Run a command while holding a named lock.
    ///
    /// Exits with the command's own exit code, or 4 if the lock could not
    /// be obtained in time.
    Run(RunArgs),

    /// Show whether a lock is free or held, and by whom.
    ///
    /// Exits 0 when the lock is free or missing, 4 when it is held.
    Status(NameArgs),

    /// List every lock file in the lock directory.
    List,

    /// Remove a lock file that nobody holds.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(ClearArgs),

    /// Print the lock file path for a name.
    Path(NameArgs),
}

/// Arguments for the `init` command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Name of the lock to hold.
    pub name: String,

    /// Milliseconds to wait for the lock: 0 tries once, negative waits forever.
    ///
    /// Defaults to `default_timeout_ms` from the config.
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// What the lock is held for, recorded in the lock file.
    #[arg(long)]
    pub purpose: Option<String>,

    /// The command to run, after `--`.
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// A lock name.
#[derive(Parser, Debug)]
pub struct NameArgs {
    /// Name of the lock.
    pub name: String,
}

/// Arguments for the `clear` command.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Name of the lock whose file should be removed.
    pub name: String,

    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["interlock", "init"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert!(!args.force);
        } else {
            panic!("Expected Init command");
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["interlock", "list", "--config", "/tmp/il.yaml"]).unwrap();
        assert!(matches!(cli.command, Command::List));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/il.yaml")));
    }

    #[test]
    fn parse_run_minimal() {
        let cli = Cli::try_parse_from(["interlock", "run", "db", "--", "pg_dump", "-f", "x.sql"])
            .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.name, "db");
            assert_eq!(args.timeout, None);
            assert_eq!(args.purpose, None);
            assert_eq!(args.command, ["pg_dump", "-f", "x.sql"]);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_with_options() {
        let cli = Cli::try_parse_from([
            "interlock",
            "run",
            "db",
            "--timeout",
            "-1",
            "--purpose",
            "nightly backup",
            "--",
            "sleep",
            "1",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.timeout, Some(-1));
            assert_eq!(args.purpose.as_deref(), Some("nightly backup"));
            assert_eq!(args.command, ["sleep", "1"]);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_requires_command() {
        assert!(Cli::try_parse_from(["interlock", "run", "db"]).is_err());
    }

    #[test]
    fn parse_status_and_path() {
        let cli = Cli::try_parse_from(["interlock", "status", "db"]).unwrap();
        assert!(matches!(cli.command, Command::Status(ref args) if args.name == "db"));

        let cli = Cli::try_parse_from(["interlock", "path", "db"]).unwrap();
        assert!(matches!(cli.command, Command::Path(ref args) if args.name == "db"));
    }

    #[test]
    fn parse_clear() {
        let cli = Cli::try_parse_from(["interlock", "clear", "db", "--force"]).unwrap();
        if let Command::Clear(args) = cli.command {
            assert_eq!(args.name, "db");
            assert!(args.force);
        } else {
            panic!("Expected Clear command");
        }
    }

    #[test]
    fn parse_clear_without_force() {
        let cli = Cli::try_parse_from(["interlock", "clear", "db"]).unwrap();
        if let Command::Clear(args) = cli.command {
            assert!(!args.force);
        } else {
            panic!("Expected Clear command");
        }
    }
}
