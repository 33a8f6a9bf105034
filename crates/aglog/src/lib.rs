//! # aglog
//!
//! Embedded rolling file logger.
//!
//! This crate provides:
//!
//! - [`Logger`] — Appends leveled lines to a text file and rotates it
//! - [`LoggerConfiguration`] — Resolved logger settings with a builder
//! - [`LogEventLevel`] — Severity levels (Verbose, Debug, Information, Warning, Error, Fatal)
//! - [`RollingInterval`] — Time-based rotation granularity and checkpoints
//! - [`SettingsProvider`] — Injectable key/value settings source
//! - [`RolloverObserver`] — Side channel for rotation outcomes
//! - [`serialize_objects`] — Positional `{…}` message templating
//!
//! ## Example
//!
//! ```rust,no_run
//! use aglog::{Logger, LoggerConfiguration, RollingInterval};
//!
//! let config = LoggerConfiguration::new("/var/log/myapp/service.log")
//!     .with_max_file_size(5 * 1024 * 1024)
//!     .with_rollover_interval(RollingInterval::Day)
//!     .with_rollover_subfolder("archive");
//!
//! let logger = Logger::new(config)?;
//! logger.log_info("service started")?;
//! logger.log_warning_with("slow request: {req}", &[serde_json::json!({"ms": 1200})])?;
//! # Ok::<(), aglog::LogError>(())
//! ```
//!
//! Settings can also come from any [`SettingsProvider`]:
//!
//! ```rust
//! use aglog::{Logger, LogEventLevel, RollingInterval};
//!
//! let settings = [("aglog:minimum-level", "Debug"), ("aglog:rollover.interval", "Hour")];
//! let logger = Logger::from_settings("aglog", &settings)?;
//! assert_eq!(logger.config().minimum_level, LogEventLevel::Debug);
//! assert_eq!(logger.config().rollover_interval, RollingInterval::Hour);
//! # Ok::<(), aglog::LogError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod interval;
pub mod level;
pub mod logger;
pub mod observer;
pub mod settings;
pub mod template;

// Re-export main types
pub use config::{resolve_configuration, LoggerConfiguration, DEFAULT_PREFIX};
pub use error::{LogError, Result};
pub use interval::RollingInterval;
pub use level::{format_level_tag, LevelCase, LevelFormat, LogEventLevel};
pub use logger::{Logger, WriteOptions};
pub use observer::{RolloverObserver, TracingObserver};
pub use settings::{EnvironmentSettings, JsonSettings, SettingsMap, SettingsProvider};
pub use template::serialize_objects;
