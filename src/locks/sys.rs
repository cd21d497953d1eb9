//! OS record locks on whole files.
//!
//! Linux uses open-file-description locks: they belong to the open file
//! rather than to the process, so two independently opened handles conflict
//! even inside one process, and closing an unrelated descriptor for the same
//! file does not silently drop the lock. Other Unix systems fall back to
//! classic POSIX `fcntl` locks, which only arbitrate between processes.
//!
//! All locks are advisory: they only exclude other users of this mechanism.

use crate::fs::FileSystem;
use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

#[cfg(target_os = "linux")]
mod cmd {
    pub(super) const SET: libc::c_int = libc::F_OFD_SETLK;
    pub(super) const SET_WAIT: libc::c_int = libc::F_OFD_SETLKW;
    pub(super) const GET: libc::c_int = libc::F_OFD_GETLK;
}

#[cfg(not(target_os = "linux"))]
mod cmd {
    pub(super) const SET: libc::c_int = libc::F_SETLK;
    pub(super) const SET_WAIT: libc::c_int = libc::F_SETLKW;
    pub(super) const GET: libc::c_int = libc::F_GETLK;
}

fn whole_file(lock_type: libc::c_short) -> libc::flock {
    // SAFETY: `flock` is plain old data; all-zero is a valid value and
    // open-file-description locks require `l_pid == 0`.
    let mut fl: libc::flock = unsafe { std::mem::zeroed() };
    fl.l_type = lock_type;
    fl.l_whence = libc::SEEK_SET as libc::c_short;
    fl.l_start = 0;
    fl.l_len = 0;
    fl
}

fn fcntl_lock(file: &File, command: libc::c_int, fl: &mut libc::flock) -> io::Result<()> {
    // SAFETY: the descriptor is owned by `file` and stays open for the call;
    // `fl` is a valid, exclusively borrowed `flock`.
    let rc = unsafe { libc::fcntl(file.as_raw_fd(), command, fl as *mut libc::flock) };
    if rc == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Try once to place an exclusive lock over the whole file.
///
/// Fails with `WouldBlock` or `PermissionDenied` when another holder has it,
/// and with `Interrupted` when a signal arrived first.
pub(crate) fn try_lock_exclusive(file: &File) -> io::Result<()> {
    let mut fl = whole_file(libc::F_WRLCK as libc::c_short);
    fcntl_lock(file, cmd::SET, &mut fl)
}

/// Remove this handle's lock from the file.
pub(crate) fn unlock(file: &File) -> io::Result<()> {
    let mut fl = whole_file(libc::F_UNLCK as libc::c_short);
    fcntl_lock(file, cmd::SET_WAIT, &mut fl)
}

/// Whether an exclusive lock through this handle would conflict with a lock
/// somebody else holds. Never acquires anything.
pub(crate) fn is_locked_elsewhere(file: &File) -> io::Result<bool> {
    let mut fl = whole_file(libc::F_WRLCK as libc::c_short);
    loop {
        match fcntl_lock(file, cmd::GET, &mut fl) {
            Ok(()) => return Ok(fl.l_type != libc::F_UNLCK as libc::c_short),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Whether an error from [`try_lock_exclusive`] means "somebody else holds it".
pub(crate) fn is_contention(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::PermissionDenied
    )
}

/// Whether `path` still names the file behind `file`.
///
/// A lock taken on a file that was unlinked after it was opened guards
/// nothing: the next opener of `path` gets a different inode.
pub(crate) fn is_linked_at(fs: &dyn FileSystem, file: &File, path: &Path) -> io::Result<bool> {
    let open = file.metadata()?;
    match fs.metadata(path) {
        Ok(named) => Ok(open.dev() == named.dev() && open.ino() == named.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
