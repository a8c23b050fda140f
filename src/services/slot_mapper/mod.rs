//! Conversion between the viewer's local wall-clock grid and canonical UTC
//! slot keys.
//!
//! The offset is resolved per date/hour through [`chrono::TimeZone`], so the
//! mapping stays correct on both sides of a daylight-saving transition.
//! Production code uses [`chrono::Local`]; tests pin explicit zones.

use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};

use crate::models::slot::{LocalPosition, SlotKey, SlotKeyError};

#[derive(Debug, Clone)]
pub struct SlotKeyMapper<Tz: TimeZone> {
    tz: Tz,
}

impl SlotKeyMapper<Local> {
    /// Mapper for the zone of the runtime clock.
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl Default for SlotKeyMapper<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> SlotKeyMapper<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// UTC slot whose hour contains the local wall-clock `date hour:00`.
    ///
    /// A local hour repeated by a fall-back transition resolves to its first
    /// occurrence. A local hour skipped by a spring-forward transition has no
    /// slot.
    pub fn to_utc_key(&self, position: LocalPosition) -> Result<SlotKey, SlotKeyError> {
        let naive = position
            .date
            .and_hms_opt(position.hour, 0, 0)
            .ok_or(SlotKeyError::HourOutOfRange(position.hour))?;

        let local = self
            .tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or(SlotKeyError::NonexistentLocalTime {
                date: position.date,
                hour: position.hour,
            })?;

        Ok(SlotKey::from_instant(local.with_timezone(&Utc)))
    }

    /// Local grid position that maps onto `key`.
    ///
    /// For zones with a fractional-hour offset the local top-of-hour falls
    /// inside the UTC slot, so the local time is rounded up to the next
    /// whole hour.
    pub fn from_utc_key(&self, key: &SlotKey) -> LocalPosition {
        let local = key.start().with_timezone(&self.tz);
        let minute = local.minute();
        let local = if minute == 0 {
            local
        } else {
            local + Duration::minutes(i64::from(60 - minute))
        };

        LocalPosition {
            date: local.date_naive(),
            hour: local.hour(),
        }
    }

    /// Local position of the hour containing `instant`.
    pub fn local_position(&self, instant: DateTime<Utc>) -> LocalPosition {
        let local = instant.with_timezone(&self.tz);
        LocalPosition {
            date: local.date_naive(),
            hour: local.hour(),
        }
    }
}
