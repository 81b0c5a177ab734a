//! Host platform detection

/// The platform family the archiving tools are invoked on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    /// macOS, the only platform able to produce disk images
    MacOs,
    /// Windows, where tools are started directly with an argument array
    Windows,
    /// Any other unix-like platform with a POSIX shell
    Unix,
}

impl HostPlatform {
    /// The platform this crate was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Whether `hdiutil` disk images can be produced on this platform
    pub fn supports_disk_images(self) -> bool {
        matches!(self, Self::MacOs)
    }

    /// Whether commands are run as a single shell line instead of a program
    /// with an argument array
    pub fn uses_shell(self) -> bool {
        !matches!(self, Self::Windows)
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::current()
    }
}
