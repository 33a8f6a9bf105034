//! Logger configuration and settings resolution.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use tracing::debug;

use crate::error::{LogError, Result};
use crate::interval::RollingInterval;
use crate::level::{LevelCase, LogEventLevel};
use crate::settings::{scope_settings, SettingsMap, SettingsProvider};

/// Settings prefix used when none is given.
pub const DEFAULT_PREFIX: &str = "aglog";

/// File name used when no log path is configured.
pub const DEFAULT_FILE_NAME: &str = "Application_Log.log";

/// Timestamp format used when none is configured.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Size threshold used when none is configured (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Resolved configuration for a [`Logger`](crate::Logger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfiguration {
    /// Path of the active log file.
    pub file_path: PathBuf,
    /// Whether each line starts with a timestamp.
    pub add_timestamp: bool,
    /// Size in bytes at which the file is rotated; `0` rotates after every write.
    pub max_file_size: u64,
    /// Level used when a write does not name one.
    pub minimum_level: LogEventLevel,
    /// Width of the level tag in characters.
    pub level_width: i32,
    /// Casing of the level tag.
    pub level_case: LevelCase,
    /// `strftime` format for line and header timestamps.
    pub timestamp_format: String,
    /// Whether a banner is written when a new file is created.
    pub add_header: bool,
    /// Time-based rotation granularity.
    pub rollover_interval: RollingInterval,
    /// Folder under the log directory that rotated files are moved into.
    pub rollover_subfolder: Option<String>,
}

impl Default for LoggerConfiguration {
    fn default() -> Self {
        Self {
            file_path: default_file_path(),
            add_timestamp: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            minimum_level: LogEventLevel::Information,
            level_width: 3,
            level_case: LevelCase::Upper,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            add_header: false,
            rollover_interval: RollingInterval::Infinite,
            rollover_subfolder: None,
        }
    }
}

impl LoggerConfiguration {
    /// Creates a configuration writing to `file_path` with default settings.
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    /// Sets whether lines carry a timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, add_timestamp: bool) -> Self {
        self.add_timestamp = add_timestamp;
        self
    }

    /// Sets the size threshold for rotation.
    #[must_use]
    pub const fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Sets the minimum (and default) level.
    #[must_use]
    pub const fn with_minimum_level(mut self, level: LogEventLevel) -> Self {
        self.minimum_level = level;
        self
    }

    /// Sets the level tag width.
    #[must_use]
    pub const fn with_level_width(mut self, width: i32) -> Self {
        self.level_width = width;
        self
    }

    /// Sets the level tag casing.
    #[must_use]
    pub const fn with_level_case(mut self, case: LevelCase) -> Self {
        self.level_case = case;
        self
    }

    /// Sets the timestamp format.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Sets whether new files get a banner.
    #[must_use]
    pub const fn with_header(mut self, add_header: bool) -> Self {
        self.add_header = add_header;
        self
    }

    /// Sets the rotation interval.
    #[must_use]
    pub const fn with_rollover_interval(mut self, interval: RollingInterval) -> Self {
        self.rollover_interval = interval;
        self
    }

    /// Sets the folder rotated files are moved into.
    #[must_use]
    pub fn with_rollover_subfolder(mut self, subfolder: impl Into<String>) -> Self {
        let subfolder = subfolder.into();
        self.rollover_subfolder = (!subfolder.is_empty()).then_some(subfolder);
        self
    }

    /// Checks that the timestamp format is a valid `strftime` format.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidArgument`] for an unrecognized specifier.
    pub fn validate(&self) -> Result<()> {
        if is_valid_format(&self.timestamp_format) {
            Ok(())
        } else {
            Err(LogError::InvalidArgument(format!(
                "timestamp format '{}'",
                self.timestamp_format
            )))
        }
    }
}

/// Returns `Application_Log.log` next to the running executable.
///
/// Falls back to the working directory when the executable path is unknown.
#[must_use]
pub fn default_file_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(DEFAULT_FILE_NAME)
}

pub(crate) fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Resolves a configuration from the settings under `prefix`.
///
/// Returns the configuration together with every setting that was found
/// under the prefix, recognized or not. Environment references in values are
/// expanded from the process environment.
///
/// # Errors
///
/// Returns [`LogError::InvalidSetting`] when a recognized key carries a value
/// that cannot be parsed.
pub fn resolve_configuration<P>(prefix: &str, provider: &P) -> Result<(LoggerConfiguration, SettingsMap)>
where
    P: SettingsProvider + ?Sized,
{
    let settings = scope_settings(prefix, provider.entries(), |name| std::env::var(name).ok());
    let config = apply_settings(LoggerConfiguration::default(), &settings)?;
    debug!(prefix, applied = settings.len(), "resolved logger settings");
    Ok((config, settings))
}

/// Applies already-scoped settings on top of `config`.
///
/// # Errors
///
/// Returns [`LogError::InvalidSetting`] for unparsable values.
pub fn apply_settings(mut config: LoggerConfiguration, settings: &SettingsMap) -> Result<LoggerConfiguration> {
    for (key, value) in settings {
        let trimmed = value.trim();
        match key.as_str() {
            "file.path" => {
                config.file_path = if trimmed.is_empty() {
                    default_file_path()
                } else {
                    PathBuf::from(trimmed)
                };
            }
            "file.sizelimitbytes" => {
                if let Some(size) = parse_optional::<u64>(key, trimmed)? {
                    config.max_file_size = size;
                }
            }
            "file.addheader" => {
                if let Some(add_header) = parse_bool(key, trimmed)? {
                    config.add_header = add_header;
                }
            }
            "minimum-level" => {
                if let Some(level) = parse_optional::<LogEventLevel>(key, trimmed)? {
                    config.minimum_level = level;
                }
            }
            "level.length" => {
                if let Some(width) = parse_optional::<i32>(key, trimmed)? {
                    config.level_width = width;
                }
            }
            "level.case" => {
                if let Some(case) = parse_optional::<LevelCase>(key, trimmed)? {
                    config.level_case = case;
                }
            }
            "timestamp.visible" => {
                config.add_timestamp = parse_bool(key, trimmed)?.unwrap_or(true);
            }
            "timestamp.format" => {
                if !value.is_empty() {
                    if !is_valid_format(value) {
                        return Err(invalid(key, value));
                    }
                    config.timestamp_format.clone_from(value);
                }
            }
            "rollover.interval" => {
                config.rollover_interval = trimmed.parse().unwrap_or_default();
            }
            "rollover.subfolder" => {
                config.rollover_subfolder = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            _ => debug!(key = %key, "ignoring unrecognized logger setting"),
        }
    }
    Ok(config)
}

fn invalid(key: &str, value: &str) -> LogError {
    LogError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_optional<T: FromStr>(key: &str, value: &str) -> Result<Option<T>> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<Option<bool>> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(invalid(key, value)),
    }
}
