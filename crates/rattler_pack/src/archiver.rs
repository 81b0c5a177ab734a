//! The archiver: format selection, cleanup and execution of pack and extract
//! operations

use crate::{
    command::{CommandBuilder, Invocation},
    error::{ExtractError, OptionError, PackError, Result},
    exec::{ExecOptions, Executor, ProcessExecutor, ProcessOutput},
    format::{should_use_disk_image, ArchiveFormat, DiskImagePreference},
    fs::{EntryKind, FileSystem, LocalFileSystem},
    options::{ExecutionMode, OptionValue, Options},
    platform::HostPlatform,
    progress::{NoProgressReporter, ProgressReporter},
    target::ArchiveTarget,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[cfg(feature = "tokio")]
use crate::r#async::BackgroundRun;

/// Builder for configuring an [`Archiver`]
pub struct ArchiverBuilder<P: ProgressReporter = NoProgressReporter> {
    options: Options,
    platform: HostPlatform,
    executor: Arc<dyn Executor>,
    file_system: Arc<dyn FileSystem>,
    progress_reporter: P,
}

impl ArchiverBuilder<NoProgressReporter> {
    /// Create a new archiver builder with default options for the current
    /// platform
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            platform: HostPlatform::current(),
            executor: Arc::new(ProcessExecutor),
            file_system: Arc::new(LocalFileSystem),
            progress_reporter: NoProgressReporter,
        }
    }
}

impl Default for ArchiverBuilder<NoProgressReporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ProgressReporter> ArchiverBuilder<P> {
    /// Replace all options at once
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Which paths are packed as disk images
    pub fn with_disk_image(mut self, preference: impl Into<DiskImagePreference>) -> Self {
        self.options.disk_image = preference.into();
        self
    }

    /// The `hdiutil` image format
    pub fn with_disk_image_subformat(mut self, subformat: impl Into<String>) -> Self {
        self.options.disk_image_subformat = subformat.into();
        self
    }

    /// Suppress log output
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.options.silent = silent;
        self
    }

    /// Run tools blocking or in the background
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.options.execution = mode;
        self
    }

    /// Whether directories are stored without their own name as prefix
    pub fn with_skip_container_directory(mut self, skip: bool) -> Self {
        self.options.skip_container_directory = skip;
        self
    }

    /// Maximum number of bytes captured from the tool's stdout or stderr
    pub fn with_max_output_buffer_size(mut self, size: usize) -> Self {
        self.options.max_output_buffer_size = size;
        self
    }

    /// The 7-Zip executable used on Windows
    pub fn with_seven_zip_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.seven_zip_executable = path.into();
        self
    }

    /// Build commands for another platform than the current one
    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Set a custom executor
    pub fn with_executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Arc::new(executor);
        self
    }

    /// Set a custom filesystem
    pub fn with_file_system(mut self, file_system: impl FileSystem + 'static) -> Self {
        self.file_system = Arc::new(file_system);
        self
    }

    /// Set a custom progress reporter
    pub fn with_progress_reporter<R: ProgressReporter>(self, reporter: R) -> ArchiverBuilder<R> {
        ArchiverBuilder {
            options: self.options,
            platform: self.platform,
            executor: self.executor,
            file_system: self.file_system,
            progress_reporter: reporter,
        }
    }

    /// Build the archiver
    pub fn build(self) -> Archiver<P> {
        Archiver {
            options: self.options,
            platform: self.platform,
            executor: self.executor,
            file_system: self.file_system,
            progress_reporter: self.progress_reporter,
        }
    }
}

/// How far a tool run has come when a pack or extract call returns
#[derive(Debug)]
pub enum Completion {
    /// The tool ran to completion
    Finished(ProcessOutput),
    /// The tool is still running in the background
    #[cfg(feature = "tokio")]
    Running(BackgroundRun),
}

impl Completion {
    /// Wait for the tool to finish
    pub async fn wait(self) -> Result<ProcessOutput> {
        match self {
            Self::Finished(output) => Ok(output),
            #[cfg(feature = "tokio")]
            Self::Running(run) => run.await,
        }
    }
}

/// A successfully started or finished pack operation
#[derive(Debug)]
pub struct Packed {
    /// The archive being written
    pub archive: PathBuf,
    pub format: ArchiveFormat,
    pub completion: Completion,
}

/// A successfully started or finished extraction
#[derive(Debug)]
pub struct Extracted {
    /// The directory the archive is extracted into
    pub destination: PathBuf,
    pub completion: Completion,
}

/// Packs paths into ZIP archives or disk images and extracts ZIP archives.
///
/// Failures of single operations are logged together with the offending path
/// and returned; they never abort other operations of the same batch.
pub struct Archiver<P: ProgressReporter = NoProgressReporter> {
    options: Options,
    platform: HostPlatform,
    executor: Arc<dyn Executor>,
    file_system: Arc<dyn FileSystem>,
    progress_reporter: P,
}

impl Default for Archiver<NoProgressReporter> {
    fn default() -> Self {
        ArchiverBuilder::new().build()
    }
}

impl<P: ProgressReporter> Archiver<P> {
    /// The current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The platform commands are built for
    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// Read an option by name
    pub fn get_option(&self, name: &str) -> std::result::Result<OptionValue, OptionError> {
        self.options.get(name)
    }

    /// Write an option by name and return its previous value
    pub fn set_option(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> std::result::Result<OptionValue, OptionError> {
        self.options.set(name, value)
    }

    /// Whether `path` would be packed as a disk image
    pub fn should_use_disk_image(&self, path: &Path) -> bool {
        should_use_disk_image(self.platform, &self.options.disk_image, path)
    }

    /// Log `message` unless the archiver is silent. Returns whether the
    /// message was written.
    pub fn log(&self, message: &str) -> bool {
        if self.options.silent {
            return false;
        }

        tracing::info!("{message}");
        true
    }

    /// Pack a single file or directory next to itself.
    ///
    /// Any file left at the archive path by an earlier run is removed first.
    /// In background mode the returned [`Packed::completion`] tracks the
    /// running tool.
    pub fn pack_one(&self, path: impl AsRef<Path>) -> Result<Packed> {
        let path = path.as_ref();
        self.try_pack(path)
            .inspect_err(|err| self.log_failure("packaging", path, err))
    }

    fn try_pack(&self, path: &Path) -> Result<Packed> {
        let target = ArchiveTarget::inspect(path, self.file_system.as_ref())?;
        let builder = CommandBuilder::new(self.platform, &self.options);

        let (format, plan) = if self.should_use_disk_image(path) {
            (ArchiveFormat::DiskImage, builder.disk_image(&target))
        } else {
            (ArchiveFormat::Zip, builder.zip(&target))
        };

        if self.file_system.remove_file_if_exists(&plan.output)? {
            tracing::debug!("removed stale archive {}", plan.output.display());
        }

        let created = match format {
            ArchiveFormat::DiskImage => format!("DMG file created: \"{}\"", plan.output.display()),
            ArchiveFormat::Zip => format!("ZIP archive created: \"{}\"", plan.output.display()),
        };
        let completion = self.run(plan.invocation, created, "packaging", path)?;

        Ok(Packed {
            archive: plan.output,
            format,
            completion,
        })
    }

    /// Pack every path in order. One failing path does not affect the others.
    pub fn pack_many<I>(&self, paths: I) -> Vec<Result<Packed>>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let paths: Vec<I::Item> = paths.into_iter().collect();
        self.progress_reporter.on_start(Some(paths.len() as u64));

        let results: Vec<Result<Packed>> = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let result = self.pack_one(path);
                self.progress_reporter.on_progress(index as u64 + 1);
                result
            })
            .collect();

        let packed = results.iter().filter(|result| result.is_ok()).count();
        self.progress_reporter
            .on_finish(&format!("Packed {packed} of {} paths", results.len()));
        results
    }

    /// Extract a ZIP archive into `destination`, or into the directory
    /// containing the archive.
    ///
    /// The archive must be an existing regular file ending in `.zip`; disk
    /// images are never extracted.
    pub fn extract(
        &self,
        archive: impl AsRef<Path>,
        destination: Option<&Path>,
    ) -> std::result::Result<Extracted, ExtractError> {
        let archive = archive.as_ref();
        if archive.as_os_str().is_empty() {
            return Err(ExtractError::MissingPath);
        }

        match self.file_system.entry_kind(archive) {
            Ok(Some(EntryKind::File)) => {}
            Ok(Some(_)) => {
                self.log(&format!("Not a file: \"{}\".", archive.display()));
                return Err(ExtractError::NotAFile {
                    path: archive.to_path_buf(),
                });
            }
            Ok(None) => {
                self.log(&format!("Archive does not exist: \"{}\".", archive.display()));
                return Err(ExtractError::NotFound {
                    path: archive.to_path_buf(),
                });
            }
            Err(err) => {
                let err = PackError::from(err);
                self.log_failure("extracting", archive, &err);
                return Err(ExtractError::Failed(err));
            }
        }

        if ArchiveFormat::detect_from_path(archive) != Some(ArchiveFormat::Zip) {
            self.log(&format!(
                "Only ZIP files can be extracted. Provided path: \"{}\".",
                archive.display()
            ));
            return Err(ExtractError::NotZip {
                path: archive.to_path_buf(),
            });
        }

        let plan = CommandBuilder::new(self.platform, &self.options).unzip(archive, destination);
        let extracted = format!("ZIP archive extracted to \"{}\"", plan.output.display());
        let completion = self
            .run(plan.invocation, extracted, "extracting", archive)
            .inspect_err(|err| self.log_failure("extracting", archive, err))?;

        Ok(Extracted {
            destination: plan.output,
            completion,
        })
    }

    /// Run `invocation` according to the execution mode. `success` is logged
    /// once the tool has finished successfully.
    fn run(
        &self,
        invocation: Invocation,
        success: String,
        action: &'static str,
        subject: &Path,
    ) -> Result<Completion> {
        let exec_options = ExecOptions {
            max_output_buffer_size: self.options.max_output_buffer_size,
        };

        match self.options.execution {
            ExecutionMode::Blocking => {
                let output = self.executor.run_blocking(&invocation, &exec_options)?;
                self.log(&success);
                Ok(Completion::Finished(output))
            }
            #[cfg(feature = "tokio")]
            ExecutionMode::Background => {
                let task = self.executor.run_background(invocation, exec_options);
                let silent = self.options.silent;
                let subject = subject.to_path_buf();
                let run = BackgroundRun::spawn(async move {
                    let result = task.await;
                    if !silent {
                        match &result {
                            Ok(_) => tracing::info!("{success}"),
                            Err(err) => write_failure(action, &subject, err),
                        }
                    }
                    result
                })?;
                Ok(Completion::Running(run))
            }
            #[cfg(not(feature = "tokio"))]
            ExecutionMode::Background => {
                let _ = (invocation, success, action, subject);
                Err(PackError::BackgroundUnavailable)
            }
        }
    }

    fn log_failure(&self, action: &str, path: &Path, err: &PackError) {
        if !self.options.silent {
            write_failure(action, path, err);
        }
    }
}

fn write_failure(action: &str, path: &Path, err: &PackError) {
    match err {
        PackError::NotFound { .. } => tracing::error!("{err}"),
        _ => tracing::error!(
            "Error while {action} \"{}\": {}",
            path.display(),
            err.to_string().trim()
        ),
    }
}
