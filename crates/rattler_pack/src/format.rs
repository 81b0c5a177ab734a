//! Archive format detection and selection

use crate::platform::HostPlatform;
use regex::Regex;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// macOS disk image created with `hdiutil` (.dmg)
    DiskImage,
    /// ZIP archive
    Zip,
}

impl ArchiveFormat {
    /// Detect archive format from filename
    pub fn detect_from_filename(filename: &str) -> Option<Self> {
        let filename = filename.to_lowercase();

        if filename.ends_with(".zip") {
            return Some(Self::Zip);
        }
        if filename.ends_with(".dmg") {
            return Some(Self::DiskImage);
        }

        None
    }

    /// Detect archive format from file path
    pub fn detect_from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .file_name()
            .and_then(OsStr::to_str)
            .and_then(Self::detect_from_filename)
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::DiskImage => "DMG",
            Self::Zip => "ZIP",
        }
    }

    /// The suffix appended to a source path to name its archive
    pub fn extension(&self) -> &'static str {
        match self {
            Self::DiskImage => ".dmg",
            Self::Zip => ".zip",
        }
    }

    /// The archive path produced for `source`: the source path with the
    /// format suffix appended, so `app` becomes `app.zip` and `app.tar`
    /// becomes `app.tar.zip`.
    pub fn archive_path_for(&self, source: &Path) -> PathBuf {
        let mut name = OsString::from(source.as_os_str());
        name.push(self.extension());
        PathBuf::from(name)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decides which paths are packed as disk images
#[derive(Debug, Clone)]
pub enum DiskImagePreference {
    /// Every path becomes a disk image
    Always,
    /// Disk images are disabled
    Never,
    /// Paths matching the pattern become disk images
    MatchesPattern(Regex),
}

impl DiskImagePreference {
    /// Whether this preference selects a disk image for `path`, ignoring the
    /// platform.
    pub fn selects(&self, path: &Path) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::MatchesPattern(pattern) => pattern.is_match(&path.to_string_lossy()),
        }
    }
}

impl Default for DiskImagePreference {
    fn default() -> Self {
        Self::MatchesPattern(Regex::clone(lazy_regex::regex!("darwin")))
    }
}

impl PartialEq for DiskImagePreference {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Always, Self::Always) | (Self::Never, Self::Never) => true,
            (Self::MatchesPattern(a), Self::MatchesPattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl From<bool> for DiskImagePreference {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Always
        } else {
            Self::Never
        }
    }
}

impl From<Regex> for DiskImagePreference {
    fn from(pattern: Regex) -> Self {
        Self::MatchesPattern(pattern)
    }
}

/// Decide whether `path` should be packed as a disk image.
///
/// Always false on platforms that cannot create disk images.
pub fn should_use_disk_image(
    platform: HostPlatform,
    preference: &DiskImagePreference,
    path: &Path,
) -> bool {
    platform.supports_disk_images() && preference.selects(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_detect_formats() {
        assert_eq!(
            ArchiveFormat::detect_from_filename("file.zip"),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::detect_from_filename("file.dmg"),
            Some(ArchiveFormat::DiskImage)
        );
        assert_eq!(ArchiveFormat::detect_from_filename("file.tar.gz"), None);
        assert_eq!(ArchiveFormat::detect_from_filename("zip"), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            ArchiveFormat::detect_from_filename("File.Zip"),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::detect_from_path("dist/App.DMG"),
            Some(ArchiveFormat::DiskImage)
        );
    }

    #[test]
    fn test_archive_path_appends_suffix() {
        assert_eq!(
            ArchiveFormat::Zip.archive_path_for(Path::new("fixtures/sample-dir")),
            PathBuf::from("fixtures/sample-dir.zip")
        );
        assert_eq!(
            ArchiveFormat::DiskImage.archive_path_for(Path::new("build/App.app")),
            PathBuf::from("build/App.app.dmg")
        );
    }

    #[rstest]
    #[case(DiskImagePreference::Always)]
    #[case(DiskImagePreference::Never)]
    #[case(DiskImagePreference::default())]
    #[case(DiskImagePreference::MatchesPattern(Regex::new(".*").unwrap()))]
    fn test_never_disk_image_without_platform_support(#[case] preference: DiskImagePreference) {
        for platform in [HostPlatform::Windows, HostPlatform::Unix] {
            for path in ["darwin", "tests/test-osx", "", "a b/c"] {
                assert!(!should_use_disk_image(platform, &preference, Path::new(path)));
            }
        }
    }

    #[test]
    fn test_disabled_preference_never_selects() {
        for path in ["darwin", "tests/test-osx", "anything"] {
            assert!(!should_use_disk_image(
                HostPlatform::MacOs,
                &DiskImagePreference::Never,
                Path::new(path)
            ));
        }
    }

    #[rstest]
    #[case("tests/test-osx", true)]
    #[case("tests/test-dir", false)]
    #[case("build/osx/App.app", true)]
    fn test_pattern_preference_follows_match(#[case] path: &str, #[case] expected: bool) {
        let preference = DiskImagePreference::MatchesPattern(Regex::new("osx").unwrap());
        assert_eq!(
            should_use_disk_image(HostPlatform::MacOs, &preference, Path::new(path)),
            expected
        );
    }

    #[test]
    fn test_always_preference_on_macos() {
        assert!(should_use_disk_image(
            HostPlatform::MacOs,
            &DiskImagePreference::Always,
            Path::new("whatever")
        ));
    }

    #[test]
    fn test_preference_from_bool() {
        assert_eq!(DiskImagePreference::from(true), DiskImagePreference::Always);
        assert_eq!(DiskImagePreference::from(false), DiskImagePreference::Never);
    }
}
