// Test fixtures - reusable test data
// Events and helpers shared by the integration and property tests

#![allow(dead_code)]

use std::collections::BTreeSet;

use availability_grid::models::event::Event;
use availability_grid::models::slot::SlotKey;
use chrono::{TimeZone, Utc};

/// Sample events, all pinned to explicit UTC instants
pub mod events {
    use super::*;

    /// Monday Mar 4, 2024, 09:00-17:00 in New York (EST, UTC-5)
    pub fn new_york_workday() -> Event {
        Event::new(
            "workday",
            "Design Review",
            Utc.with_ymd_and_hms(2024, 3, 4, 14, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 4, 22, 0, 0).unwrap(),
        )
        .unwrap()
    }

    /// Sunday Mar 10, 2024, 00:00 EST to 06:00 EDT in New York; the local
    /// 02:00 hour does not exist
    pub fn spring_forward_night() -> Event {
        Event::new(
            "spring-forward",
            "Night Shift",
            Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap(),
        )
        .unwrap()
    }
}

pub fn keys(raw: &[&str]) -> BTreeSet<SlotKey> {
    raw.iter().map(|key| key.parse().unwrap()).collect()
}

pub fn users(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_events_are_valid() {
        assert_eq!(events::new_york_workday().slots().count(), 8);
        assert_eq!(events::spring_forward_night().slots().count(), 5);
    }
}
