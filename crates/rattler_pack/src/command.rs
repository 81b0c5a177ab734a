//! Construction of the archiving tool invocations

use crate::escape::escape_arg;
use crate::format::ArchiveFormat;
use crate::options::Options;
use crate::platform::HostPlatform;
use crate::target::ArchiveTarget;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// How an [`Invocation`] is handed to the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationShape {
    /// The program and its escaped arguments joined into one shell line
    Shell,
    /// The program started directly with an argument array
    Direct,
}

/// A fully escaped tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub shape: InvocationShape,
}

impl Invocation {
    fn new(platform: HostPlatform, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
            shape: if platform.uses_shell() {
                InvocationShape::Shell
            } else {
                InvocationShape::Direct
            },
        }
    }

    fn in_dir(mut self, working_dir: Option<PathBuf>) -> Self {
        self.working_dir = working_dir;
        self
    }

    /// The invocation rendered as a single command line
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The output a tool run will produce together with the invocation producing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackPlan {
    /// The archive (pack) or directory (extract) the invocation writes
    pub output: PathBuf,
    pub invocation: Invocation,
}

/// Builds tool invocations for a platform and a set of options
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    platform: HostPlatform,
    options: &'a Options,
}

impl<'a> CommandBuilder<'a> {
    /// Create a new command builder
    pub fn new(platform: HostPlatform, options: &'a Options) -> Self {
        Self { platform, options }
    }

    fn escape(&self, arg: impl AsRef<OsStr>) -> String {
        escape_arg(&arg.as_ref().to_string_lossy(), self.platform).into_owned()
    }

    /// `hdiutil create -format <subformat> -srcfolder <source> <source>.dmg`
    pub fn disk_image(&self, target: &ArchiveTarget) -> PackPlan {
        let output = ArchiveFormat::DiskImage.archive_path_for(target.path());
        let args = vec![
            "create".to_string(),
            "-format".to_string(),
            self.escape(&self.options.disk_image_subformat),
            "-srcfolder".to_string(),
            self.escape(target.path()),
            self.escape(&output),
        ];

        PackPlan {
            invocation: Invocation::new(self.platform, "hdiutil", args),
            output,
        }
    }

    /// Pack `target` into `<source>.zip` next to it.
    ///
    /// Directories are stored without their own name as prefix when
    /// `skip_container_directory` is set: the tool runs inside the directory,
    /// packs `*` and writes the archive one level up.
    pub fn zip(&self, target: &ArchiveTarget) -> PackPlan {
        let output = ArchiveFormat::Zip.archive_path_for(target.path());
        let archive_name = ArchiveFormat::Zip.archive_path_for(Path::new(target.base_name()));

        // The wildcard is left for the shell (or 7-Zip) to expand.
        let (working_dir, archive_arg, members) =
            if self.options.skip_container_directory && target.is_dir() {
                (
                    Some(target.path().to_path_buf()),
                    Path::new("..").join(archive_name),
                    "*".to_string(),
                )
            } else {
                (
                    target.parent().map(Path::to_path_buf),
                    archive_name,
                    self.escape(target.base_name()),
                )
            };

        let (program, mut args) = match self.platform {
            HostPlatform::Windows => (
                self.options.seven_zip_executable.to_string_lossy().into_owned(),
                vec!["a".to_string(), "-tzip".to_string()],
            ),
            HostPlatform::MacOs | HostPlatform::Unix => ("zip".to_string(), vec!["-r".to_string()]),
        };
        args.push(self.escape(archive_arg));
        args.push(members);

        PackPlan {
            invocation: Invocation::new(self.platform, program, args).in_dir(working_dir),
            output,
        }
    }

    /// Extract the ZIP archive at `archive` into `destination`, or next to the
    /// archive when no destination is given. Existing files are overwritten.
    pub fn unzip(&self, archive: &Path, destination: Option<&Path>) -> PackPlan {
        let output = destination
            .map(Path::to_path_buf)
            .or_else(|| {
                archive
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let source = self.escape(archive);
        let target = self.escape(&output);

        let invocation = match self.platform {
            HostPlatform::Windows => Invocation::new(
                self.platform,
                self.options.seven_zip_executable.to_string_lossy(),
                vec!["x".to_string(), source, format!("-o{target}"), "-r".to_string()],
            ),
            HostPlatform::MacOs | HostPlatform::Unix => Invocation::new(
                self.platform,
                "unzip",
                vec!["-o".to_string(), source, "-d".to_string(), target],
            ),
        };

        PackPlan { output, invocation }
    }
}
