//! Exit code constants for the interlock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid lock name, unusable lock directory)
//! - 3: The wrapped command could not be run
//! - 4: Lock acquisition failure (timeout or held)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid state, or an unusable lock file.
pub const USER_ERROR: i32 = 1;

/// The command passed to `interlock run` could not be spawned.
pub const COMMAND_FAILURE: i32 = 3;

/// Lock acquisition failure: the named lock could not be acquired in time.
pub const LOCK_FAILURE: i32 = 4;
