//! Running external commands.
//!
//! Command lines are split with shell-words and executed directly, never
//! through a shell.

use crate::error::{InterlockError, Result};
use std::process::{Command, Stdio};

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code of the process (None if it was killed by a signal).
    pub exit_code: Option<i32>,
    /// Everything the command wrote to stdout.
    pub stdout: String,
    /// Everything the command wrote to stderr.
    pub stderr: String,
}

impl CommandOutput {
    /// Check if the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Split `command_line` into program and arguments.
pub fn parse_command_line(command_line: &str) -> Result<Vec<String>> {
    let args = shell_words::split(command_line).map_err(|e| {
        InterlockError::UserError(format!(
            "failed to parse command '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            command_line, e
        ))
    })?;

    if args.is_empty() {
        return Err(InterlockError::UserError(format!(
            "command is empty after parsing: '{}'",
            command_line
        )));
    }

    Ok(args)
}

/// Run `command_line` to completion and capture its output.
///
/// Output is decoded lossily, so binary output never fails the call.
pub fn run_command(command_line: &str) -> Result<CommandOutput> {
    let args = parse_command_line(command_line)?;
    let (program, rest) = split_program(&args)?;

    let output = Command::new(program)
        .args(rest)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(program, e))?;

    Ok(CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run `argv` with the caller's stdin, stdout, and stderr and wait for it.
///
/// # Returns
///
/// * `Ok(Some(code))` - The command exited with `code`
/// * `Ok(None)` - The command was terminated by a signal
/// * `Err(InterlockError::CommandError)` - The command could not be started
pub fn run_inherited(argv: &[String]) -> Result<Option<i32>> {
    let (program, rest) = split_program(argv)?;

    let status = Command::new(program)
        .args(rest)
        .status()
        .map_err(|e| spawn_error(program, e))?;

    Ok(status.code())
}

fn split_program(argv: &[String]) -> Result<(&String, &[String])> {
    argv.split_first()
        .ok_or_else(|| InterlockError::UserError("no command given".to_string()))
}

fn spawn_error(program: &str, e: std::io::Error) -> InterlockError {
    InterlockError::CommandError(format!(
        "failed to execute '{}': {}\n\
         Fix: ensure the command is installed and in PATH.",
        program, e
    ))
}
