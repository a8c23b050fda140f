// Property-based tests for slot keys, the local/UTC mapping and drag selection

use std::collections::BTreeSet;

use availability_grid::models::availability::AvailabilityRecord;
use availability_grid::models::event::Event;
use availability_grid::models::slot::{LocalPosition, SlotKey};
use availability_grid::services::aggregate::AggregateComputer;
use availability_grid::services::grid::GridBuilder;
use availability_grid::services::selection::{SelectionEngine, SelectionMode};
use availability_grid::services::slot_mapper::SlotKeyMapper;
use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    // 2000-01-01 through roughly 2040
    (0i64..14_600).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset)
    })
}

fn slot_strategy() -> impl Strategy<Value = SlotKey> {
    (date_strategy(), 0u32..24).prop_map(|(date, hour)| SlotKey::new(date, hour).unwrap())
}

proptest! {
    /// Property: the wire form parses back to the same key, padded or not
    #[test]
    fn prop_wire_form_round_trips(key in slot_strategy()) {
        let text = key.to_string();
        prop_assert_eq!(text.parse::<SlotKey>().unwrap(), key);

        let padded = format!("{}_{:02}", key.date().format("%Y-%m-%d"), key.hour());
        prop_assert_eq!(padded.parse::<SlotKey>().unwrap(), key);
    }

    /// Property: with a fixed whole-hour offset the mapping is a bijection
    #[test]
    fn prop_fixed_offset_round_trips(key in slot_strategy(), offset_hours in -12i32..=14) {
        let mapper = SlotKeyMapper::new(FixedOffset::east_opt(offset_hours * 3600).unwrap());

        let position = mapper.from_utc_key(&key);
        prop_assert_eq!(mapper.to_utc_key(position).unwrap(), key);
    }

    /// Property: every existing New York wall-clock hour maps back to itself,
    /// across both DST transitions
    #[test]
    fn prop_dst_zone_local_round_trips(date in date_strategy(), hour in 0u32..24) {
        let mapper = SlotKeyMapper::new(chrono_tz::America::New_York);
        let position = LocalPosition::new(date, hour).unwrap();

        if let Ok(key) = mapper.to_utc_key(position) {
            prop_assert_eq!(mapper.from_utc_key(&key), position);
        }
    }

    /// Property: a fractional-offset zone never maps two keys onto one cell
    #[test]
    fn prop_fractional_offset_is_injective(key in slot_strategy()) {
        let mapper = SlotKeyMapper::new(chrono_tz::Asia::Kolkata);
        prop_assert_ne!(mapper.from_utc_key(&key), mapper.from_utc_key(&key.next()));
    }

    /// Property: dragging A to B and back to A before release changes nothing
    #[test]
    fn prop_drag_out_and_back_is_a_no_op(
        preselected in proptest::collection::vec(any::<bool>(), 16),
        a in 0usize..16,
        b in 0usize..16,
    ) {
        prop_assume!(a != b);

        // Two days, 09:00-16:00 UTC viewer: 16 cells
        let mapper = SlotKeyMapper::new(Utc);
        let event = Event::new(
            "e1",
            "Planning",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 16, 0, 0).unwrap(),
        )
        .unwrap();
        let saved: BTreeSet<SlotKey> = GridBuilder::new(&mapper)
            .build(&event, &BTreeSet::new())
            .cells()
            .iter()
            .zip(&preselected)
            .filter(|(_, selected)| **selected)
            .map(|(cell, _)| cell.key)
            .collect();
        let grid = GridBuilder::new(&mapper).build(&event, &saved);
        prop_assert_eq!(grid.len(), 16);

        let mut engine = SelectionEngine::new(grid, SelectionMode::Select);
        let changes = engine.subscribe();
        let before = engine.selected_keys();

        engine.pointer_down(1, a);
        engine.pointer_move(1, Some(b));
        engine.pointer_move(1, Some(a));
        engine.pointer_up(1);

        prop_assert_eq!(engine.selected_keys(), before);
        prop_assert!(changes.try_recv().is_err());
    }

    /// Property: percentages stay in range and match the available list
    #[test]
    fn prop_aggregate_is_consistent(
        marks in proptest::collection::vec((0usize..5, 0u32..4), 0..20),
        user_count in 1usize..5,
    ) {
        let event = Event::new(
            "e1",
            "Retro",
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap(),
        )
        .unwrap();
        let users: Vec<String> = (0..user_count).map(|i| format!("user{}", i)).collect();
        let records: Vec<AvailabilityRecord> = marks
            .iter()
            .filter(|(user, _)| *user < user_count)
            .map(|(user, offset)| {
                let key = SlotKey::from_instant(event.start + Duration::hours(i64::from(*offset)));
                AvailabilityRecord::new("e1", users[*user].clone(), key)
            })
            .collect();

        let result = AggregateComputer::compute(&event, &records, &users);

        for key in event.slots() {
            let detail = result.detail(&key).unwrap();
            prop_assert_eq!(detail.available.len() + detail.unavailable.len(), user_count);
            prop_assert_eq!(
                result.percentage(&key),
                AggregateComputer::percentage(detail.available.len(), user_count)
            );
            prop_assert!(result.percentage(&key) <= 100);
        }
    }
}
