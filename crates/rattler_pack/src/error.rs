//! Error types for the rattler_pack crate

use std::path::PathBuf;

/// Result type for pack operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Error type for pack and extract operations
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// I/O error while inspecting or cleaning up paths
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path to pack does not exist
    #[error("Specified path does not exist: \"{}\"", .path.display())]
    NotFound { path: PathBuf },

    /// The path has no final component to derive an archive name from
    #[error("Cannot derive an archive name from \"{}\"", .path.display())]
    InvalidPath { path: PathBuf },

    /// The archiving tool could not be started
    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The archiving tool exited unsuccessfully
    #[error("Command `{command}` failed with {}: {stderr}", describe_code(.code))]
    Subprocess {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The archiving tool produced more output than allowed
    #[error("Command `{command}` exceeded the output buffer limit of {limit} bytes")]
    OutputLimitExceeded { command: String, limit: usize },

    /// A shell command line was to be run on a host without a POSIX shell
    #[error("Cannot run `{command}`: shell command lines require a POSIX shell")]
    ShellUnavailable { command: String },

    /// Background execution was requested outside of a tokio runtime
    #[error("Background execution requires a running tokio runtime")]
    NoRuntime,

    /// Background execution was requested but the `tokio` feature is disabled
    #[error("Background execution is not available without the `tokio` feature")]
    BackgroundUnavailable,

    /// The background task running the archiving tool panicked or was cancelled
    #[error("Background task failed: {0}")]
    Join(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

impl PackError {
    /// Create a new not found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a new invalid path error
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    /// Create a new spawn error
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a new subprocess error, trimming the captured stderr
    pub fn subprocess(command: impl Into<String>, code: Option<i32>, stderr: &str) -> Self {
        Self::Subprocess {
            command: command.into(),
            code,
            stderr: stderr.trim().to_string(),
        }
    }

    /// Create a new shell unavailable error
    pub fn shell_unavailable(command: impl Into<String>) -> Self {
        Self::ShellUnavailable {
            command: command.into(),
        }
    }

    /// Create a new output limit error
    pub fn output_limit_exceeded(command: impl Into<String>, limit: usize) -> Self {
        Self::OutputLimitExceeded {
            command: command.into(),
            limit,
        }
    }
}

/// Error returned by [`crate::Archiver::extract`].
///
/// Validation failures never reach the archiving tool. Each variant maps onto a
/// distinct negative code through [`ExtractError::code`] for callers that
/// forward the outcome as a process exit status or over an FFI boundary.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No archive path was given
    #[error("No archive path given")]
    MissingPath,

    /// The archive path exists but is not a regular file
    #[error("Not a file: \"{}\"", .path.display())]
    NotAFile { path: PathBuf },

    /// The archive is not a ZIP archive
    #[error("Only ZIP files can be extracted. Provided path: \"{}\"", .path.display())]
    NotZip { path: PathBuf },

    /// The archive path does not exist
    #[error("Archive does not exist: \"{}\"", .path.display())]
    NotFound { path: PathBuf },

    /// Running the extraction failed
    #[error(transparent)]
    Failed(#[from] PackError),
}

impl ExtractError {
    /// The negative sentinel code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::MissingPath => -1,
            Self::NotAFile { .. } => -2,
            Self::NotZip { .. } => -3,
            Self::NotFound { .. } => -4,
            Self::Failed(_) => -5,
        }
    }
}

/// Error type for reading and writing options by name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    /// The option name is not recognized
    #[error("Unknown option: {name}")]
    Unknown { name: String },

    /// The value has the wrong kind for the option
    #[error("Invalid value for option {name}: expected {expected}")]
    InvalidValue { name: String, expected: String },
}

impl OptionError {
    /// Create a new unknown option error
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::Unknown { name: name.into() }
    }

    /// Create a new invalid value error
    pub fn invalid_value(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            expected: expected.into(),
        }
    }
}
