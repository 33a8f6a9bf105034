//! The rolling file logger.
//!
//! This module provides:
//! - [`Logger`] — appends formatted lines to a text file and rotates it
//! - [`WriteOptions`] — per-call overrides for [`Logger::write_log_with`]
//!
//! Every write re-stats the file, appends one line, then checks whether the
//! file is due for rotation by size or by time. Rotation renames the file to
//! `<name>_<timestamp><ext>`; the next write starts a fresh file at the
//! original path.

use std::fmt;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::config::{default_file_path, resolve_configuration, LoggerConfiguration};
use crate::error::{LogError, Result};
use crate::interval::DEFAULT_FILENAME_FORMAT;
use crate::level::{format_level_tag, LogEventLevel};
use crate::observer::{RolloverObserver, TracingObserver};
use crate::settings::{SettingsMap, SettingsProvider};
use crate::template::serialize_objects;

/// Extension given to log files that have none.
pub const LOG_EXTENSION: &str = "log";

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

const HEADER_SEPARATOR: &str =
    "================================================================================";

/// Per-call options for [`Logger::write_log_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Level of the event; the configured minimum level when `None`.
    pub level: Option<LogEventLevel>,
    /// Start the event on a new line.
    pub append_newline: bool,
    /// Overrides the configured timestamp visibility.
    pub timestamp: Option<bool>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            level: None,
            append_newline: true,
            timestamp: None,
        }
    }
}

impl WriteOptions {
    /// Options for an event at `level`.
    #[must_use]
    pub fn at(level: LogEventLevel) -> Self {
        Self {
            level: Some(level),
            ..Self::default()
        }
    }

    /// Sets whether the event starts on a new line.
    #[must_use]
    pub const fn with_newline(mut self, append_newline: bool) -> Self {
        self.append_newline = append_newline;
        self
    }

    /// Forces the timestamp on or off for this event.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A rolling file logger.
///
/// A logger owns its file path and rollover checkpoint. Appends are not
/// coordinated across threads or processes, so each file should have a
/// single writer.
pub struct Logger {
    config: LoggerConfiguration,
    settings: SettingsMap,
    configured: bool,
    /// Next time-based rollover; `None` never rolls over on time.
    next_checkpoint: Mutex<Option<DateTime<Local>>>,
    observer: Arc<dyn RolloverObserver>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("settings", &self.settings)
            .field("configured", &self.configured)
            .field("next_checkpoint", &*self.next_checkpoint.lock())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Creates a logger from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: LoggerConfiguration) -> Result<Self> {
        config.validate()?;
        let next_checkpoint = config.rollover_interval.next_checkpoint(&Local::now());
        Ok(Self {
            config,
            settings: SettingsMap::new(),
            configured: false,
            next_checkpoint: Mutex::new(next_checkpoint),
            observer: Arc::new(TracingObserver),
        })
    }

    /// Creates a logger configured from the settings under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if a setting value cannot be parsed.
    pub fn from_settings<P>(prefix: &str, provider: &P) -> Result<Self>
    where
        P: SettingsProvider + ?Sized,
    {
        let mut logger = Self::new(LoggerConfiguration::default())?;
        logger.configure(prefix, provider)?;
        Ok(logger)
    }

    /// Replaces the configuration with the settings under `prefix`.
    ///
    /// Settings can be applied once per logger. A call that fails leaves the
    /// logger unchanged and does not count.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidOperation`] if settings were already
    /// applied, or [`LogError::InvalidSetting`] for unparsable values.
    pub fn configure<P>(&mut self, prefix: &str, provider: &P) -> Result<()>
    where
        P: SettingsProvider + ?Sized,
    {
        if self.configured {
            return Err(LogError::InvalidOperation(
                "logger settings have already been resolved".to_string(),
            ));
        }

        let (config, settings) = resolve_configuration(prefix, provider)?;
        *self.next_checkpoint.get_mut() = config.rollover_interval.next_checkpoint(&Local::now());
        self.config = config;
        self.settings = settings;
        self.configured = true;
        Ok(())
    }

    /// Routes rotation outcomes to `observer` instead of `tracing`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RolloverObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &LoggerConfiguration {
        &self.config
    }

    /// Returns the settings that were applied, keyed without the prefix.
    #[must_use]
    pub const fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    /// Returns the next time-based rollover, if the interval has one.
    #[must_use]
    pub fn next_checkpoint(&self) -> Option<DateTime<Local>> {
        *self.next_checkpoint.lock()
    }

    /// Returns the path of the active log file, `.log` extension included.
    #[must_use]
    pub fn current_path(&self) -> PathBuf {
        let path = if self.config.file_path.as_os_str().is_empty() {
            default_file_path()
        } else {
            self.config.file_path.clone()
        };

        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(LOG_EXTENSION))
        {
            path
        } else {
            let mut name = path.into_os_string();
            name.push(".");
            name.push(LOG_EXTENSION);
            PathBuf::from(name)
        }
    }

    /// Writes `text` at `level` (or the minimum level) on a new line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub fn write_log(&self, text: &str, level: Option<LogEventLevel>) -> Result<()> {
        self.write_log_with(
            text,
            WriteOptions {
                level,
                ..WriteOptions::default()
            },
        )
    }

    /// Writes `text` with explicit options, then rotates the file if due.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    /// Rotation failures are reported to the observer, not returned.
    pub fn write_log_with(&self, text: &str, options: WriteOptions) -> Result<()> {
        let level = options.level.unwrap_or(self.config.minimum_level);
        let path = self.current_path();
        let now = Local::now();

        if !path.exists() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            debug!(path = %path.display(), "creating log file");
            if self.config.add_header {
                self.write_header(&path, &now)?;
            }
        }

        if level.passes(self.config.minimum_level) {
            let tag = format_level_tag(level, self.config.level_width, self.config.level_case);
            let line = if options.timestamp.unwrap_or(self.config.add_timestamp) {
                format!("{} [{tag}] {text}", self.format_time(&now))
            } else {
                format!("[{tag}] {text}")
            };
            append(&path, &line, options.append_newline)?;
        }

        self.rollover_log_file(&path, &now);
        Ok(())
    }

    /// Moves the active file aside now, whether or not it is due.
    ///
    /// Returns the path the file was moved to.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no active file or it cannot be moved.
    pub fn rotate(&self) -> Result<PathBuf> {
        let path = self.current_path();
        let now = Local::now();
        fs::metadata(&path)?;

        let mut checkpoint = self.next_checkpoint.lock();
        let dest = self.move_aside(&path, &now).map_err(|(_, err)| err)?;
        *checkpoint = self.config.rollover_interval.next_checkpoint(&now);
        drop(checkpoint);

        self.observer.rotated(&path, &dest);
        Ok(dest)
    }

    /// Writes a `Verbose` event.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_verbose(&self, text: &str) -> Result<()> {
        self.write_log(text, Some(LogEventLevel::Verbose))
    }

    /// Writes a `Verbose` event from a template and objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_verbose_with<T: Serialize>(&self, template: &str, objects: &[T]) -> Result<()> {
        self.log_verbose(&serialize_objects(template, objects))
    }

    /// Writes a `Debug` event.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_debug(&self, text: &str) -> Result<()> {
        self.write_log(text, Some(LogEventLevel::Debug))
    }

    /// Writes a `Debug` event from a template and objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_debug_with<T: Serialize>(&self, template: &str, objects: &[T]) -> Result<()> {
        self.log_debug(&serialize_objects(template, objects))
    }

    /// Writes an `Information` event.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_info(&self, text: &str) -> Result<()> {
        self.write_log(text, Some(LogEventLevel::Information))
    }

    /// Writes an `Information` event from a template and objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_info_with<T: Serialize>(&self, template: &str, objects: &[T]) -> Result<()> {
        self.log_info(&serialize_objects(template, objects))
    }

    /// Writes a `Warning` event.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_warning(&self, text: &str) -> Result<()> {
        self.write_log(text, Some(LogEventLevel::Warning))
    }

    /// Writes a `Warning` event from a template and objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_warning_with<T: Serialize>(&self, template: &str, objects: &[T]) -> Result<()> {
        self.log_warning(&serialize_objects(template, objects))
    }

    /// Writes an `Error` event.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_error(&self, text: &str) -> Result<()> {
        self.write_log(text, Some(LogEventLevel::Error))
    }

    /// Writes an `Error` event from a template and objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_error_with<T: Serialize>(&self, template: &str, objects: &[T]) -> Result<()> {
        self.log_error(&serialize_objects(template, objects))
    }

    /// Writes a fatal event.
    ///
    /// Fatal events go through the `Warning` write path and carry its tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_fatal(&self, text: &str) -> Result<()> {
        self.write_log(text, Some(LogEventLevel::Warning))
    }

    /// Writes a fatal event from a template and objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn log_fatal_with<T: Serialize>(&self, template: &str, objects: &[T]) -> Result<()> {
        self.log_fatal(&serialize_objects(template, objects))
    }

    // ========== Internal Methods ==========

    fn format_time(&self, time: &DateTime<Local>) -> String {
        let mut out = String::new();
        if write!(out, "{}", time.format(&self.config.timestamp_format)).is_err() {
            out.clear();
            out.push_str(&time.to_rfc3339());
        }
        out
    }

    fn write_header(&self, path: &Path, now: &DateTime<Local>) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        append(path, HEADER_SEPARATOR, true)?;
        append(path, &format!("File: {name}"), true)?;
        append(path, HEADER_SEPARATOR, true)?;
        append(path, &format!("Created {}", self.format_time(now)), true)?;
        append(path, HEADER_SEPARATOR, true)?;
        Ok(())
    }

    fn rollover_log_file(&self, path: &Path, now: &DateTime<Local>) {
        let Ok(metadata) = fs::metadata(path) else {
            return;
        };

        let size_due = metadata.len() >= self.config.max_file_size;

        let mut checkpoint = self.next_checkpoint.lock();
        let time_due = checkpoint.is_some_and(|at| *now >= at);
        if !size_due && !time_due {
            return;
        }

        let outcome = self.move_aside(path, now);
        if outcome.is_ok() {
            *checkpoint = self.config.rollover_interval.next_checkpoint(now);
        }
        // Observers may call back into the logger.
        drop(checkpoint);

        match outcome {
            Ok(dest) => self.observer.rotated(path, &dest),
            Err((dest, err)) => self.observer.rotation_failed(path, &dest, &err),
        }
    }

    /// Renames `path` into the rollover folder, returning the destination.
    ///
    /// On failure the intended destination is returned with the error.
    fn move_aside(
        &self,
        path: &Path,
        now: &DateTime<Local>,
    ) -> std::result::Result<PathBuf, (PathBuf, io::Error)> {
        let format = match self.config.rollover_interval.filename_format() {
            "" => DEFAULT_FILENAME_FORMAT,
            format => format,
        };
        let suffix = now.format(format).to_string();

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let target_dir = match &self.config.rollover_subfolder {
            Some(subfolder) => dir.join(subfolder),
            None => dir.to_path_buf(),
        };
        let dest = rotated_destination(&target_dir, path, &suffix);

        if self.config.rollover_subfolder.is_some() {
            fs::create_dir_all(&target_dir).map_err(|e| (dest.clone(), e))?;
        }
        fs::rename(path, &dest).map_err(|e| (dest.clone(), e))?;
        Ok(dest)
    }
}

/// Builds `<dir>/<stem>_<suffix><ext>`, adding `_1`, `_2`, … while the name
/// is taken so an earlier rotation is never overwritten.
fn rotated_destination(dir: &Path, path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut dest = dir.join(format!("{stem}_{suffix}{ext}"));
    let mut seq = 1u32;
    while dest.exists() {
        dest = dir.join(format!("{stem}_{suffix}_{seq}{ext}"));
        seq += 1;
    }
    dest
}

/// Appends `text` as one write, preceded by a line ending when `newline` is
/// set and the file already has content.
fn append(path: &Path, text: &str, newline: bool) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let has_content = file.metadata()?.len() > 0;

    let mut buf = String::with_capacity(text.len() + LINE_ENDING.len());
    if newline && has_content {
        buf.push_str(LINE_ENDING);
    }
    buf.push_str(text);

    let mut writer = BufWriter::new(file);
    writer.write_all(buf.as_bytes())?;
    writer.flush()?;
    Ok(())
}
