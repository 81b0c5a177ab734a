//! Runtime options of an [`crate::Archiver`]

use crate::error::OptionError;
use crate::format::DiskImagePreference;
use regex::Regex;
use std::path::PathBuf;
use std::str::FromStr;

/// Default ceiling for captured subprocess output, per stream.
pub const DEFAULT_MAX_OUTPUT_BUFFER_SIZE: usize = 200 * 1024;

/// How the archiving tools are run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Block the caller until the tool exits
    #[default]
    Blocking,
    /// Spawn the tool on the current tokio runtime and return immediately
    Background,
}

/// The options controlling format selection and tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Which paths are packed as disk images
    pub disk_image: DiskImagePreference,
    /// The `hdiutil` image format, e.g. `UDZO` for compressed read-only
    pub disk_image_subformat: String,
    /// Suppress log output
    pub silent: bool,
    /// Blocking or background execution
    pub execution: ExecutionMode,
    /// Store the contents of a directory without the directory name as prefix
    pub skip_container_directory: bool,
    /// Maximum number of bytes captured from stdout or stderr
    pub max_output_buffer_size: usize,
    /// The 7-Zip executable used on Windows
    pub seven_zip_executable: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            disk_image: DiskImagePreference::default(),
            disk_image_subformat: "UDZO".to_string(),
            silent: false,
            execution: ExecutionMode::Blocking,
            skip_container_directory: true,
            max_output_buffer_size: DEFAULT_MAX_OUTPUT_BUFFER_SIZE,
            seven_zip_executable: PathBuf::from("7za.exe"),
        }
    }
}

/// Recognized option names
///
/// Parsing accepts the canonical camel case names as well as the short legacy
/// names (`dmg`, `dmgFormat`, `isSilent`, `isSync`, `skipDirName`,
/// `zipOutputMaxBuffer`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum OptionName {
    #[strum(to_string = "archiveFormatPreference", serialize = "dmg")]
    ArchiveFormatPreference,
    #[strum(to_string = "diskImageSubformat", serialize = "dmgFormat")]
    DiskImageSubformat,
    #[strum(to_string = "silent", serialize = "isSilent")]
    Silent,
    #[strum(to_string = "synchronous", serialize = "isSync")]
    Synchronous,
    #[strum(to_string = "skipContainerDirectory", serialize = "skipDirName")]
    SkipContainerDirectory,
    #[strum(to_string = "maxOutputBufferSize", serialize = "zipOutputMaxBuffer")]
    MaxOutputBufferSize,
    #[strum(to_string = "sevenZipExecutable")]
    SevenZipExecutable,
}

impl OptionName {
    /// Parse an option name, reporting unknown names as [`OptionError::Unknown`]
    pub fn parse(name: &str) -> Result<Self, OptionError> {
        Self::from_str(name).map_err(|_| OptionError::unknown(name))
    }
}

/// A value read from or written to an option by name
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
    Size(usize),
    Path(PathBuf),
    Preference(DiskImagePreference),
    Mode(ExecutionMode),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<usize> for OptionValue {
    fn from(value: usize) -> Self {
        Self::Size(value)
    }
}

impl From<PathBuf> for OptionValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<Regex> for OptionValue {
    fn from(value: Regex) -> Self {
        Self::Preference(DiskImagePreference::MatchesPattern(value))
    }
}

impl From<DiskImagePreference> for OptionValue {
    fn from(value: DiskImagePreference) -> Self {
        Self::Preference(value)
    }
}

impl From<ExecutionMode> for OptionValue {
    fn from(value: ExecutionMode) -> Self {
        Self::Mode(value)
    }
}

impl Options {
    /// Read an option by name.
    pub fn get(&self, name: &str) -> Result<OptionValue, OptionError> {
        Ok(match OptionName::parse(name)? {
            OptionName::ArchiveFormatPreference => OptionValue::Preference(self.disk_image.clone()),
            OptionName::DiskImageSubformat => OptionValue::Text(self.disk_image_subformat.clone()),
            OptionName::Silent => OptionValue::Flag(self.silent),
            OptionName::Synchronous => {
                OptionValue::Flag(self.execution == ExecutionMode::Blocking)
            }
            OptionName::SkipContainerDirectory => OptionValue::Flag(self.skip_container_directory),
            OptionName::MaxOutputBufferSize => OptionValue::Size(self.max_output_buffer_size),
            OptionName::SevenZipExecutable => OptionValue::Path(self.seven_zip_executable.clone()),
        })
    }

    /// Write an option by name and return its previous value.
    ///
    /// Unknown names and values of the wrong kind leave the options untouched.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> Result<OptionValue, OptionError> {
        let option = OptionName::parse(name)?;
        let previous = self.get(name)?;
        let invalid = |expected: &str| OptionError::invalid_value(option.to_string(), expected);

        match (option, value.into()) {
            (OptionName::ArchiveFormatPreference, OptionValue::Preference(preference)) => {
                self.disk_image = preference;
            }
            (OptionName::ArchiveFormatPreference, OptionValue::Flag(enabled)) => {
                self.disk_image = DiskImagePreference::from(enabled);
            }
            (OptionName::ArchiveFormatPreference, OptionValue::Text(pattern)) => {
                let pattern = Regex::new(&pattern).map_err(|_| invalid("a valid pattern"))?;
                self.disk_image = DiskImagePreference::MatchesPattern(pattern);
            }
            (OptionName::ArchiveFormatPreference, _) => {
                return Err(invalid("a flag, a pattern or a preference"));
            }
            (OptionName::DiskImageSubformat, OptionValue::Text(subformat)) => {
                self.disk_image_subformat = subformat;
            }
            (OptionName::DiskImageSubformat, _) => return Err(invalid("text")),
            (OptionName::Silent, OptionValue::Flag(silent)) => self.silent = silent,
            (OptionName::Silent, _) => return Err(invalid("a flag")),
            (OptionName::Synchronous, OptionValue::Flag(synchronous)) => {
                self.execution = if synchronous {
                    ExecutionMode::Blocking
                } else {
                    ExecutionMode::Background
                };
            }
            (OptionName::Synchronous, OptionValue::Mode(mode)) => self.execution = mode,
            (OptionName::Synchronous, _) => return Err(invalid("a flag or an execution mode")),
            (OptionName::SkipContainerDirectory, OptionValue::Flag(skip)) => {
                self.skip_container_directory = skip;
            }
            (OptionName::SkipContainerDirectory, _) => return Err(invalid("a flag")),
            (OptionName::MaxOutputBufferSize, OptionValue::Size(size)) => {
                self.max_output_buffer_size = size;
            }
            (OptionName::MaxOutputBufferSize, _) => return Err(invalid("a size")),
            (OptionName::SevenZipExecutable, OptionValue::Path(path)) => {
                self.seven_zip_executable = path;
            }
            (OptionName::SevenZipExecutable, OptionValue::Text(path)) => {
                self.seven_zip_executable = PathBuf::from(path);
            }
            (OptionName::SevenZipExecutable, _) => return Err(invalid("a path")),
        }

        Ok(previous)
    }
}
