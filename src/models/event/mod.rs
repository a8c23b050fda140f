// Event module
// Scheduling window that participants mark availability against

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::slot::SlotKey;

/// A bounded UTC window, divided into hourly slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Event {
    /// Create a new event with required fields
    ///
    /// # Examples
    /// ```
    /// use availability_grid::models::event::Event;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    /// let end = Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap();
    /// let event = Event::new("team-offsite", "Team Offsite", start, end).unwrap();
    /// assert_eq!(event.slots().count(), 8);
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, String> {
        let event = Self {
            id: id.into(),
            name: name.into(),
            start,
            end,
        };
        event.validate()?;
        Ok(event)
    }

    /// Build from millisecond epoch timestamps, the storage and wire format.
    pub fn from_millis(
        id: impl Into<String>,
        name: impl Into<String>,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Self, String> {
        let start = Utc
            .timestamp_millis_opt(start_ms)
            .single()
            .ok_or_else(|| format!("Invalid start timestamp {}", start_ms))?;
        let end = Utc
            .timestamp_millis_opt(end_ms)
            .single()
            .ok_or_else(|| format!("Invalid end timestamp {}", end_ms))?;
        Self::new(id, name, start, end)
    }

    pub fn validate(&self) -> Result<(), String> {
        let id = self.id.trim();
        if id.is_empty() || id.len() > 255 {
            return Err("Event id must be between 1 and 255 characters".to_string());
        }

        let name = self.name.trim();
        if name.is_empty() || name.len() > 255 {
            return Err("Event name must be between 1 and 255 characters".to_string());
        }

        if self.end <= self.start {
            return Err("Event end time must be after start time".to_string());
        }

        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Every UTC hour in the half-open window `[start, end)`.
    ///
    /// Iteration steps an hour at a time from `start`, so a window starting
    /// mid-hour yields the slot containing `start` first.
    pub fn slots(&self) -> impl Iterator<Item = SlotKey> + '_ {
        let mut cursor = self.start;
        std::iter::from_fn(move || {
            if cursor >= self.end {
                return None;
            }
            let key = SlotKey::from_instant(cursor);
            cursor += Duration::hours(1);
            Some(key)
        })
    }
}
