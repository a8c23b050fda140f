//! Per-slot availability aggregation.
//!
//! Pure function of the event window, the event's availability records and
//! the ordered list of event users. Safe to recompute on every poll.

use std::collections::{BTreeMap, HashSet};

use crate::models::availability::{AggregateResult, AvailabilityRecord, SlotDetail};
use crate::models::event::Event;
use crate::models::slot::SlotKey;

pub struct AggregateComputer;

impl AggregateComputer {
    /// `event_users` is every user who has interacted with the event, most
    /// recently active first; its order is kept in the unavailable lists.
    pub fn compute(
        event: &Event,
        records: &[AvailabilityRecord],
        event_users: &[String],
    ) -> AggregateResult {
        let total_users = event_users.len();

        // Unique usernames per slot, in record order.
        let mut by_slot: BTreeMap<SlotKey, Vec<&str>> = BTreeMap::new();
        for record in records.iter().filter(|record| record.event_id == event.id) {
            let users = by_slot.entry(record.key()).or_default();
            if !users.contains(&record.username.as_str()) {
                users.push(record.username.as_str());
            }
        }

        let per_slot_percentage = if total_users == 0 {
            BTreeMap::new()
        } else {
            by_slot
                .iter()
                .map(|(key, users)| (*key, Self::percentage(users.len(), total_users)))
                .collect()
        };

        let per_slot_detail = event
            .slots()
            .map(|key| {
                if total_users == 0 {
                    return (key, SlotDetail::default());
                }

                let available: Vec<String> = by_slot
                    .get(&key)
                    .map(|users| users.iter().map(|user| user.to_string()).collect())
                    .unwrap_or_default();
                let present: HashSet<&str> = available.iter().map(String::as_str).collect();
                let unavailable = event_users
                    .iter()
                    .filter(|user| !present.contains(user.as_str()))
                    .cloned()
                    .collect();

                (
                    key,
                    SlotDetail {
                        available,
                        unavailable,
                    },
                )
            })
            .collect();

        AggregateResult {
            per_slot_percentage,
            per_slot_detail,
        }
    }

    /// `count / total * 100` rounded half up, capped at 100.
    pub fn percentage(count: usize, total: usize) -> u8 {
        if total == 0 {
            return 0;
        }
        let rounded = (200 * count + total) / (2 * total);
        rounded.min(100) as u8
    }
}
