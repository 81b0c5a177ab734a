//! Filesystem access used by the archiver

use std::io;
use std::path::Path;

/// The kind of an existing filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// The filesystem operations the archiver relies on.
///
/// Nothing is cached between calls; every operation asks the filesystem again.
pub trait FileSystem: Send + Sync {
    /// The kind of the entry at `path`, or `None` if nothing exists there
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Remove the file at `path`. Returns whether a file was removed.
    fn remove_file_if_exists(&self, path: &Path) -> io::Result<bool>;
}

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        match fs_err::metadata(path) {
            Ok(metadata) if metadata.is_file() => Ok(Some(EntryKind::File)),
            Ok(metadata) if metadata.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(_) => Ok(Some(EntryKind::Other)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn remove_file_if_exists(&self, path: &Path) -> io::Result<bool> {
        match fs_err::remove_file(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs_err::write(&file, "hello").unwrap();

        let fs = LocalFileSystem;
        assert_eq!(fs.entry_kind(dir.path()).unwrap(), Some(EntryKind::Directory));
        assert_eq!(fs.entry_kind(&file).unwrap(), Some(EntryKind::File));
        assert_eq!(fs.entry_kind(&dir.path().join("missing")).unwrap(), None);
    }

    #[test]
    fn test_remove_file_if_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("stale.zip");
        fs_err::write(&file, "old").unwrap();

        let fs = LocalFileSystem;
        assert!(fs.remove_file_if_exists(&file).unwrap());
        assert!(!file.exists());
        assert!(!fs.remove_file_if_exists(&file).unwrap());
    }

    #[test]
    fn test_remove_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sample-dir.zip");
        fs_err::create_dir(&nested).unwrap();

        assert!(LocalFileSystem.remove_file_if_exists(&nested).is_err());
    }
}
