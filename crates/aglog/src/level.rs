//! Severity levels and fixed-width level tags.
//!
//! This module provides:
//! - [`LogEventLevel`] — the six ordered severities
//! - [`LevelCase`] — upper, lower, or title casing of a tag
//! - [`LevelFormat`] — a parsed width code such as `u3`
//! - [`format_level_tag`] — renders the abbreviated tag embedded in each line

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// Log event severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogEventLevel {
    /// Tracing detail, normally suppressed
    Verbose = 0,
    /// Internal diagnostics
    Debug = 1,
    /// Normal operation
    Information = 2,
    /// Degraded but still working
    Warning = 3,
    /// A failed operation
    Error = 4,
    /// The application cannot continue
    Fatal = 5,
}

impl LogEventLevel {
    /// All levels in ordinal order.
    pub const ALL: [Self; 6] = [
        Self::Verbose,
        Self::Debug,
        Self::Information,
        Self::Warning,
        Self::Error,
        Self::Fatal,
    ];

    /// Returns the full name of the level.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Verbose => "Verbose",
            Self::Debug => "Debug",
            Self::Information => "Information",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Fatal => "Fatal",
        }
    }

    /// Returns the ordinal of the level.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Returns true if an event at this level passes the configured minimum.
    ///
    /// Only `Verbose` is ever filtered: it is dropped unless the minimum is
    /// itself `Verbose`. Every other level is written regardless of the
    /// minimum.
    #[must_use]
    pub fn passes(self, minimum: Self) -> bool {
        !(self == Self::Verbose && minimum != Self::Verbose)
    }
}

impl fmt::Display for LogEventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for LogEventLevel {
    type Error = LogError;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| LogError::InvalidArgument(format!("log event level ordinal {value}")))
    }
}

impl FromStr for LogEventLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" | "vrb" => Ok(Self::Verbose),
            "debug" | "dbg" => Ok(Self::Debug),
            "information" | "info" | "inf" => Ok(Self::Information),
            "warning" | "warn" | "wrn" => Ok(Self::Warning),
            "error" | "err" => Ok(Self::Error),
            "fatal" | "ftl" => Ok(Self::Fatal),
            _ => Err(LogError::InvalidArgument(format!("log event level '{s}'"))),
        }
    }
}

/// Casing applied to a level tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelCase {
    /// `INF`
    #[default]
    Upper,
    /// `inf`
    Lower,
    /// `Inf`
    Title,
}

impl LevelCase {
    /// Maps a case specifier character to a casing.
    ///
    /// `u` is upper and `w` is lower; anything else is title case.
    #[must_use]
    pub const fn from_code(code: char) -> Self {
        match code {
            'u' => Self::Upper,
            'w' => Self::Lower,
            _ => Self::Title,
        }
    }

    fn table(self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Upper => &UPPER_CASE,
            Self::Lower => &LOWER_CASE,
            Self::Title => &TITLE_CASE,
        }
    }

    /// Applies this casing to an arbitrary word.
    #[must_use]
    pub fn apply(self, word: &str) -> String {
        match self {
            Self::Upper => word.to_uppercase(),
            Self::Lower => word.to_lowercase(),
            Self::Title => {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                })
            }
        }
    }
}

impl FromStr for LevelCase {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" | "upper" => Ok(Self::Upper),
            "w" | "l" | "lower" => Ok(Self::Lower),
            "t" | "title" => Ok(Self::Title),
            _ => Err(LogError::InvalidArgument(format!("level case '{s}'"))),
        }
    }
}

// Rows are indexed by level ordinal, columns by tag width minus one.

static TITLE_CASE: [&[&str]; 6] = [
    &["V", "Vb", "Vrb", "Verb", "Verbo", "Verbos", "Verbose"],
    &["D", "De", "Dbg", "Dbug", "Debug"],
    &[
        "I",
        "In",
        "Inf",
        "Info",
        "Infor",
        "Inform",
        "Informa",
        "Informat",
        "Informati",
        "Informatio",
        "Information",
    ],
    &["W", "Wn", "Wrn", "Warn", "Warni", "Warnin", "Warning"],
    &["E", "Er", "Err", "Eror", "Error"],
    &["F", "Fa", "Ftl", "Fatl", "Fatal"],
];

static UPPER_CASE: [&[&str]; 6] = [
    &["V", "VB", "VRB", "VERB", "VERBO", "VERBOS", "VERBOSE"],
    &["D", "DE", "DBG", "DBUG", "DEBUG"],
    &[
        "I",
        "IN",
        "INF",
        "INFO",
        "INFOR",
        "INFORM",
        "INFORMA",
        "INFORMAT",
        "INFORMATI",
        "INFORMATIO",
        "INFORMATION",
    ],
    &["W", "WN", "WRN", "WARN", "WARNI", "WARNIN", "WARNING"],
    &["E", "ER", "ERR", "EROR", "ERROR"],
    &["F", "FA", "FTL", "FATL", "FATAL"],
];

static LOWER_CASE: [&[&str]; 6] = [
    &["v", "vb", "vrb", "verb", "verbo", "verbos", "verbose"],
    &["d", "de", "dbg", "dbug", "debug"],
    &[
        "i",
        "in",
        "inf",
        "info",
        "infor",
        "inform",
        "informa",
        "informat",
        "informati",
        "informatio",
        "information",
    ],
    &["w", "wn", "wrn", "warn", "warni", "warnin", "warning"],
    &["e", "er", "err", "eror", "error"],
    &["f", "fa", "ftl", "fatl", "fatal"],
];

/// Renders the level tag for `level` at the requested width and case.
///
/// Widths past the longest abbreviation return the full name; widths below
/// one return an empty tag.
#[must_use]
pub fn format_level_tag(level: LogEventLevel, width: i32, case: LevelCase) -> String {
    if width < 1 {
        return String::new();
    }

    let Some(variants) = case.table().get(usize::from(level.ordinal())) else {
        return case.apply(level.name());
    };

    let column = usize::try_from(width)
        .unwrap_or(usize::MAX)
        .min(variants.len())
        .saturating_sub(1);
    variants
        .get(column)
        .map_or_else(|| case.apply(level.name()), |tag| (*tag).to_string())
}

/// A parsed level width code: a case letter plus one or two width digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFormat {
    /// Casing of the tag.
    pub case: LevelCase,
    /// Requested width; values outside the table range are clamped on render.
    pub width: i32,
}

impl LevelFormat {
    /// Creates a format from its parts.
    #[must_use]
    pub const fn new(case: LevelCase, width: i32) -> Self {
        Self { case, width }
    }

    /// Parses a width code such as `u3` or `t11`.
    ///
    /// The digits are decoded from their character codes without validation,
    /// so `uX` produces an arbitrary width rather than an error. Codes that
    /// are not two or three characters long render the full level name.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        let chars: Vec<char> = code.chars().collect();
        let case = chars.first().map_or(LevelCase::Title, |c| LevelCase::from_code(*c));

        let width = match chars.as_slice() {
            [_, units] => digit_value(*units),
            [_, tens, units] => digit_value(*tens)
                .saturating_mul(10)
                .saturating_add(digit_value(*units)),
            _ => i32::MAX,
        };

        Self { case, width }
    }

    /// Renders `level` with this format.
    #[must_use]
    pub fn render(&self, level: LogEventLevel) -> String {
        format_level_tag(level, self.width, self.case)
    }
}

fn digit_value(c: char) -> i32 {
    // Non-digits decode to whatever their code point offset happens to be.
    i32::try_from(u32::from(c)).unwrap_or(i32::MAX) - i32::from(b'0')
}
