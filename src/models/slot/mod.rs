// Slot module
// Canonical UTC slot identity and local grid positions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while building or parsing slot identities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotKeyError {
    #[error("hour {0} is outside 0..=23")]
    HourOutOfRange(u32),
    #[error("malformed slot key '{0}', expected YYYY-MM-DD_H")]
    Malformed(String),
    #[error("local time {date} {hour}:00 does not exist in the viewer's time zone")]
    NonexistentLocalTime { date: NaiveDate, hour: u32 },
}

/// One UTC calendar hour, the atomic unit of availability.
///
/// Rendered as `YYYY-MM-DD_H` with a zero-padded date and an unpadded hour.
/// Parsing accepts the hour padded or unpadded so both `2024-01-01_9` and
/// `2024-01-01_09` name the same slot. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotKey {
    date: NaiveDate,
    hour: u32,
}

impl SlotKey {
    pub fn new(date: NaiveDate, hour: u32) -> Result<Self, SlotKeyError> {
        if hour > 23 {
            return Err(SlotKeyError::HourOutOfRange(hour));
        }
        Ok(Self { date, hour })
    }

    /// Slot containing the given instant (truncated to the hour).
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            date: instant.date_naive(),
            hour: instant.hour(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// UTC instant at the top of this slot's hour.
    pub fn start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.date.and_hms_opt(self.hour, 0, 0).unwrap_or_default())
    }

    /// The slot immediately after this one.
    pub fn next(&self) -> Self {
        Self::from_instant(self.start() + chrono::Duration::hours(1))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}_{}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.hour
        )
    }
}

impl FromStr for SlotKey {
    type Err = SlotKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || SlotKeyError::Malformed(value.to_string());

        let (date_part, hour_part) = value.trim().split_once('_').ok_or_else(malformed)?;
        if date_part.len() != 10 || hour_part.is_empty() || hour_part.len() > 2 {
            return Err(malformed());
        }

        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| malformed())?;
        let hour = hour_part.parse::<u32>().map_err(|_| malformed())?;
        Self::new(date, hour)
    }
}

impl TryFrom<String> for SlotKey {
    type Error = SlotKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.to_string()
    }
}

/// A (local calendar date, local hour) pair in the viewer's time zone.
///
/// Derived ordering compares the date first and the hour second, which is
/// the lexicographic order the selection rectangle relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalPosition {
    pub date: NaiveDate,
    pub hour: u32,
}

impl LocalPosition {
    pub fn new(date: NaiveDate, hour: u32) -> Result<Self, SlotKeyError> {
        if hour > 23 {
            return Err(SlotKeyError::HourOutOfRange(hour));
        }
        Ok(Self { date, hour })
    }

    /// Build from year/month/day parts, `None` for an invalid calendar date.
    pub fn from_ymd_h(year: i32, month: u32, day: u32, hour: u32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Self::new(date, hour).ok()
    }
}

impl fmt::Display for LocalPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:00", self.date.format("%Y-%m-%d"), self.hour)
    }
}
