//! Pack files and directories into distributable archives
//!
//! This crate packs a path into a ZIP archive, or into a disk image on macOS,
//! by driving the archiving tools of the platform (`zip`, `unzip`, `hdiutil`,
//! or a bundled 7-Zip executable on Windows). It can also extract ZIP archives
//! again. The crate decides on the format, escapes paths for the shell, cleans
//! up stale archives and runs the tools; it does not compress anything itself.
//!
//! # Features
//!
//! - ZIP archives everywhere, disk images on macOS
//! - Pattern based selection of the disk image format
//! - Blocking and background (tokio) execution
//! - Progress reporting via `indicatif`
//!
//! # Examples
//!
//! ## Packing a directory
//!
//! ```no_run
//! use rattler_pack::ArchiverBuilder;
//!
//! let archiver = ArchiverBuilder::new()
//!     .with_skip_container_directory(true)
//!     .build();
//!
//! let packed = archiver.pack_one("dist/my-app")?;
//! println!("created {}", packed.archive.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extracting an archive
//!
//! ```no_run
//! use rattler_pack::Archiver;
//! use std::path::Path;
//!
//! let archiver = Archiver::default();
//! match archiver.extract("dist/my-app.zip", Some(Path::new("unpacked"))) {
//!     Ok(extracted) => println!("extracted to {}", extracted.destination.display()),
//!     Err(err) => eprintln!("extraction failed ({}): {err}", err.code()),
//! }
//! ```
//!
//! ## Packing in the background
//!
//! ```no_run
//! # #[cfg(feature = "tokio")]
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use rattler_pack::{ArchiverBuilder, ExecutionMode};
//!
//! let archiver = ArchiverBuilder::new()
//!     .with_execution_mode(ExecutionMode::Background)
//!     .build();
//!
//! let packed = archiver.pack_one("dist/my-app")?;
//! packed.completion.wait().await?;
//! # Ok(())
//! # }
//! ```

pub mod archiver;
pub mod command;
pub mod error;
pub mod escape;
pub mod exec;
pub mod format;
pub mod fs;
pub mod options;
pub mod platform;
pub mod progress;
pub mod target;

#[cfg(feature = "tokio")]
pub mod r#async;

pub use archiver::{Archiver, ArchiverBuilder, Completion, Extracted, Packed};
pub use command::{CommandBuilder, Invocation, InvocationShape, PackPlan};
pub use error::{ExtractError, OptionError, PackError, Result};
pub use escape::escape_arg;
pub use exec::{ExecOptions, Executor, ProcessExecutor, ProcessOutput};
pub use format::{should_use_disk_image, ArchiveFormat, DiskImagePreference};
pub use fs::{EntryKind, FileSystem, LocalFileSystem};
pub use options::{ExecutionMode, OptionName, OptionValue, Options};
pub use platform::HostPlatform;
pub use target::ArchiveTarget;

#[cfg(feature = "progress")]
pub use progress::IndicatifProgressReporter;
pub use progress::{NoProgressReporter, ProgressReporter};

#[cfg(feature = "tokio")]
pub use r#async::BackgroundRun;
