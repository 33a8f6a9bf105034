//! Rolling interval model.
//!
//! Pure functions mapping an instant to the rotated-file timestamp format,
//! the start of its enclosing period, and the start of the following period.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeDelta, TimeZone, Timelike,
};
use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// Filename timestamp format used when the interval has none of its own.
pub const DEFAULT_FILENAME_FORMAT: &str = "%Y%m%d%H%M";

/// Granularity of time-based log rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum RollingInterval {
    /// Never rotate on time
    #[default]
    Infinite = 0,
    /// Rotate at the start of each year
    Year = 1,
    /// Rotate at the start of each month
    Month = 2,
    /// Rotate at midnight
    Day = 3,
    /// Rotate at the top of each hour
    Hour = 4,
    /// Rotate at the start of each minute
    Minute = 5,
}

impl RollingInterval {
    /// All intervals in ordinal order.
    pub const ALL: [Self; 6] = [
        Self::Infinite,
        Self::Year,
        Self::Month,
        Self::Day,
        Self::Hour,
        Self::Minute,
    ];

    /// Returns the name of the interval.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Infinite => "Infinite",
            Self::Year => "Year",
            Self::Month => "Month",
            Self::Day => "Day",
            Self::Hour => "Hour",
            Self::Minute => "Minute",
        }
    }

    /// Returns the `strftime` format used to stamp rotated file names.
    ///
    /// `Infinite` has no period and returns an empty format.
    #[must_use]
    pub const fn filename_format(self) -> &'static str {
        match self {
            Self::Infinite => "",
            Self::Year => "%Y",
            Self::Month => "%Y%m",
            Self::Day => "%Y%m%d",
            Self::Hour => "%Y%m%d%H",
            Self::Minute => "%Y%m%d%H%M",
        }
    }

    /// Returns the start of the period enclosing `instant`, in the same zone.
    ///
    /// Returns `None` for `Infinite`.
    #[must_use]
    pub fn current_checkpoint<Tz: TimeZone>(self, instant: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let local = instant.naive_local();
        let date = local.date();
        let naive = match self {
            Self::Infinite => return None,
            Self::Year => start_of_day(NaiveDate::from_ymd_opt(date.year(), 1, 1)?),
            Self::Month => start_of_day(date.with_day(1)?),
            Self::Day => start_of_day(date),
            Self::Hour => date.and_hms_opt(local.hour(), 0, 0)?,
            Self::Minute => date.and_hms_opt(local.hour(), local.minute(), 0)?,
        };
        Some(localize(instant, naive))
    }

    /// Returns the start of the period after the one enclosing `instant`.
    ///
    /// Returns `None` for `Infinite`.
    #[must_use]
    pub fn next_checkpoint<Tz: TimeZone>(self, instant: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let current = self.current_checkpoint(instant)?.naive_local();
        let next = match self {
            Self::Infinite => return None,
            Self::Year => current.checked_add_months(Months::new(12))?,
            Self::Month => current.checked_add_months(Months::new(1))?,
            Self::Day => current.checked_add_days(Days::new(1))?,
            Self::Hour => current.checked_add_signed(TimeDelta::hours(1))?,
            Self::Minute => current.checked_add_signed(TimeDelta::minutes(1))?,
        };
        Some(localize(instant, next))
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Attaches `instant`'s zone to a wall-clock time.
///
/// Ambiguous wall-clock times take the earlier instant; times skipped by a
/// DST gap are resolved with `instant`'s own UTC offset.
fn localize<Tz: TimeZone>(instant: &DateTime<Tz>, naive: NaiveDateTime) -> DateTime<Tz> {
    let tz = instant.timezone();
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let offset = TimeDelta::seconds(i64::from(instant.offset().fix().local_minus_utc()));
            tz.from_utc_datetime(&(naive - offset))
        }
    }
}

impl fmt::Display for RollingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for RollingInterval {
    type Error = LogError;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| LogError::InvalidArgument(format!("rolling interval ordinal {value}")))
    }
}

impl FromStr for RollingInterval {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "infinite" => Ok(Self::Infinite),
            "year" => Ok(Self::Year),
            "month" => Ok(Self::Month),
            "day" => Ok(Self::Day),
            "hour" => Ok(Self::Hour),
            "minute" => Ok(Self::Minute),
            _ => Err(LogError::InvalidArgument(format!("rolling interval '{s}'"))),
        }
    }
}
