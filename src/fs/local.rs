//! The filesystem collaborator used by the process lock.
//!
//! Lock acquisition only needs a handful of operations: make sure the lock
//! file exists, open it, and delete it when a user clears a leftover lock.
//! They sit behind a trait so tests can inject failures.

use std::fs::{self, File, Metadata, OpenOptions};
use std::io;
use std::path::Path;

/// Minimal file service.
pub trait FileSystem: Send + Sync {
    /// Whether something exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Create an empty file at `path`, creating missing parent directories.
    ///
    /// Succeeds without touching the content when the file already exists.
    fn create(&self, path: &Path) -> io::Result<()>;

    /// Delete the file at `path`.
    fn delete(&self, path: &Path) -> io::Result<()>;

    /// Open an existing file for reading and writing.
    fn open_read_write(&self, path: &Path) -> io::Result<File>;

    /// Metadata of whatever `path` currently names, following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Create a directory and all of its parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !self.exists(parent)
        {
            self.create_dir_all(parent)?;
        }

        // No truncate: another process may hold a lock on this very file.
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map(drop)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn open_read_write(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        fs::metadata(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom, Write};
    use tempfile::TempDir;

    #[test]
    fn test_create_makes_empty_file_and_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("db.lock");

        LocalFs.create(&path).unwrap();

        assert!(LocalFs.exists(&path));
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_create_reports_parent_that_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        assert!(LocalFs.create(&blocker.join("sub").join("db.lock")).is_err());
        assert!(LocalFs.create_dir_all(&blocker.join("sub")).is_err());
    }

    #[test]
    fn test_metadata_follows_replacement_of_path() {
        use std::os::unix::fs::MetadataExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.lock");
        LocalFs.create(&path).unwrap();
        let open = LocalFs.open_read_write(&path).unwrap();
        let before = LocalFs.metadata(&path).unwrap();
        assert_eq!(open.metadata().unwrap().ino(), before.ino());

        LocalFs.delete(&path).unwrap();
        assert_eq!(
            LocalFs.metadata(&path).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );

        LocalFs.create(&path).unwrap();
        let after = LocalFs.metadata(&path).unwrap();
        assert_ne!(open.metadata().unwrap().ino(), after.ino());
    }

    #[test]
    fn test_create_is_idempotent_and_preserves_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.lock");
        fs::write(&path, "holder").unwrap();

        LocalFs.create(&path).unwrap();
        LocalFs.create(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "holder");
    }

    #[test]
    fn test_open_read_write_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = LocalFs
            .open_read_write(&temp_dir.path().join("missing.lock"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_open_read_write_allows_read_write_and_seek() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data");
        LocalFs.create(&path).unwrap();

        let mut file = LocalFs.open_read_write(&path).unwrap();
        file.write_all(b"hello").unwrap();
        file.seek(SeekFrom::Start(1)).unwrap();
        let mut rest = String::new();
        file.read_to_string(&mut rest).unwrap();

        assert_eq!(rest, "ello");
    }

    #[test]
    fn test_delete_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.lock");
        LocalFs.create(&path).unwrap();

        LocalFs.delete(&path).unwrap();

        assert!(!LocalFs.exists(&path));
        assert!(LocalFs.delete(&path).is_err());
    }
}
