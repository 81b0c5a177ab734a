//! The path being packed and the facts derived from it

use crate::error::{PackError, Result};
use crate::fs::{EntryKind, FileSystem};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// A path about to be packed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    path: PathBuf,
    base_name: OsString,
    parent: Option<PathBuf>,
    kind: EntryKind,
}

impl ArchiveTarget {
    /// Inspect `path` on the filesystem.
    ///
    /// Trailing separators and `.` components are dropped so that `dir/` and
    /// `dir` name the same archive.
    pub fn inspect(path: &Path, fs: &dyn FileSystem) -> Result<Self> {
        let path = normalize(path);
        let kind = fs
            .entry_kind(&path)?
            .ok_or_else(|| PackError::not_found(&path))?;
        let base_name = path
            .file_name()
            .ok_or_else(|| PackError::invalid_path(&path))?
            .to_owned();
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf);

        Ok(Self {
            path,
            base_name,
            parent,
            kind,
        })
    }

    /// The normalized path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The final component of the path
    pub fn base_name(&self) -> &OsString {
        &self.base_name
    }

    /// The parent directory, if the path has one
    pub fn parent(&self) -> Option<&Path> {
        self.parent.as_deref()
    }

    /// Whether the path is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFileSystem;
    use assert_matches::assert_matches;

    #[test]
    fn test_inspect_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("sample-dir");
        fs_err::create_dir(&sample).unwrap();

        let with_slash = PathBuf::from(format!("{}/", sample.display()));
        let target = ArchiveTarget::inspect(&with_slash, &LocalFileSystem).unwrap();
        assert_eq!(target.path(), sample);
        assert_eq!(target.base_name(), "sample-dir");
        assert_eq!(target.parent(), Some(dir.path()));
        assert!(target.is_dir());
    }

    #[test]
    fn test_inspect_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert_matches!(
            ArchiveTarget::inspect(&missing, &LocalFileSystem),
            Err(PackError::NotFound { path }) if path == missing
        );
    }

    #[test]
    fn test_current_dir_has_no_base_name() {
        assert_matches!(
            ArchiveTarget::inspect(Path::new("./"), &LocalFileSystem),
            Err(PackError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("./a/./b/")), PathBuf::from("a/b"));
        assert_eq!(normalize(Path::new("file.txt")), PathBuf::from("file.txt"));
        assert_eq!(normalize(Path::new(".")), PathBuf::from("."));
    }
}
