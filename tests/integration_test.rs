// Integration tests: grid, selection, sync and the SQLite store working together

mod fixtures;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use availability_grid::models::availability::AggregateResult;
use availability_grid::models::slot::{LocalPosition, SlotKey};
use availability_grid::services::availability::AvailabilityService;
use availability_grid::services::database::Database;
use availability_grid::services::grid::{GridBuilder, Tooltip};
use availability_grid::services::selection::{PointerOutcome, SelectionEngine, SelectionMode};
use availability_grid::services::slot_mapper::SlotKeyMapper;
use availability_grid::services::sync::{
    SaveStatus, SyncContext, SyncController, SyncError, SyncSession, SyncTimings, SyncTransport,
};
use chrono::Utc;
use chrono_tz::America::New_York;
use fixtures::{events, keys, users};
use mockall::mock;
use pretty_assertions::assert_eq;

mock! {
    pub Transport {}

    impl SyncTransport for Transport {
        fn save(&self, event_id: &str, csrf_token: &str, slots: &BTreeSet<SlotKey>) -> Result<(), SyncError>;
        fn fetch_aggregate(&self, event_id: &str) -> Result<AggregateResult, SyncError>;
    }
}

/// Transport that talks straight to an in-memory store as a single user.
struct StoreTransport {
    db: Database,
    username: String,
    saves: RefCell<usize>,
}

impl StoreTransport {
    fn new(db: Database, username: &str) -> Self {
        Self {
            db,
            username: username.to_string(),
            saves: RefCell::new(0),
        }
    }

    fn service(&self) -> AvailabilityService<'_> {
        AvailabilityService::new(self.db.connection())
    }
}

impl SyncTransport for StoreTransport {
    fn save(&self, event_id: &str, csrf_token: &str, slots: &BTreeSet<SlotKey>) -> Result<(), SyncError> {
        if csrf_token != "token" {
            return Err(SyncError::Rejected("CSRF token validation failed".to_string()));
        }
        *self.saves.borrow_mut() += 1;
        self.service()
            .replace_slots(event_id, &self.username, slots)
            .map_err(|err| SyncError::Transport(err.to_string()))
    }

    fn fetch_aggregate(&self, event_id: &str) -> Result<AggregateResult, SyncError> {
        self.service()
            .aggregate_for_event(event_id)
            .map_err(|err| SyncError::Transport(err.to_string()))?
            .ok_or_else(|| SyncError::Rejected("Event not found.".to_string()))
    }
}

fn at(hour: u32) -> LocalPosition {
    LocalPosition::from_ymd_h(2024, 3, 4, hour).unwrap()
}

fn drag(engine: &mut SelectionEngine, from: LocalPosition, to: LocalPosition) -> PointerOutcome {
    let from = engine.grid().index_of(from).unwrap();
    let to = engine.grid().index_of(to).unwrap();
    engine.pointer_down(1, from);
    engine.pointer_move(1, Some(to));
    engine.pointer_up(1)
}

#[test]
fn test_drag_results_in_exactly_one_save() {
    let mapper = SlotKeyMapper::new(New_York);
    let event = events::new_york_workday();
    let grid = GridBuilder::new(&mapper).build(&event, &BTreeSet::new());
    let mut engine = SelectionEngine::new(grid, SelectionMode::Select);

    let mut transport = MockTransport::new();
    transport
        .expect_save()
        .withf(|event_id, token, slots| {
            event_id == "workday"
                && token == "token"
                && *slots == keys(&["2024-03-04_14", "2024-03-04_15", "2024-03-04_16"])
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    transport
        .expect_fetch_aggregate()
        .times(1)
        .returning(|_| Ok(AggregateResult::default()));

    let mut session = SyncSession::new(
        SyncController::new(SyncContext::new("workday", "token"), SyncTimings::default()),
        transport,
    );
    session.attach(engine.subscribe());

    assert_eq!(drag(&mut engine, at(9), at(11)), PointerOutcome::Committed { changed: true });

    let t0 = Instant::now();
    session.run_once(t0);
    assert_eq!(session.controller().status(), SaveStatus::Idle);

    session.run_once(t0 + Duration::from_millis(999));
    assert!(session.run_once(t0 + Duration::from_millis(1000)));
    assert_eq!(session.controller().status(), SaveStatus::Saved);

    session.run_once(t0 + Duration::from_secs(10));
    assert_eq!(session.controller().status(), SaveStatus::Idle);
}

#[test]
fn test_saved_selection_round_trips_through_store() {
    let db = Database::new(":memory:").unwrap();
    db.initialize_schema().unwrap();
    let event = events::new_york_workday();
    {
        let service = AvailabilityService::new(db.connection());
        service.create_event(&event).unwrap();
        let now = Utc::now();
        service.touch_user("workday", "Bob", now).unwrap();
        service
            .touch_user("workday", "Alice", now + chrono::Duration::seconds(1))
            .unwrap();
        service
            .replace_slots("workday", "bob", &keys(&["2024-03-04_15"]))
            .unwrap();
    }

    let mapper = SlotKeyMapper::new(New_York);
    let grid = GridBuilder::new(&mapper).build(&event, &BTreeSet::new());
    let mut engine = SelectionEngine::new(grid, SelectionMode::Select);

    let mut session = SyncSession::new(
        SyncController::new(SyncContext::new("workday", "token"), SyncTimings::default()),
        StoreTransport::new(db, "alice"),
    );
    session.attach(engine.subscribe());

    drag(&mut engine, at(10), at(11));

    let t0 = Instant::now();
    session.controller_mut().set_visible(true, t0);
    assert!(session.run_once(t0));
    assert!(session.run_once(t0 + Duration::from_millis(1000)));
    assert_eq!(*session.transport().saves.borrow(), 1);

    let aggregate = session.controller().aggregate().unwrap().clone();
    let overlay = engine.grid().overlay(&aggregate);

    let ten = engine.grid().index_of(at(10)).unwrap();
    let eleven = engine.grid().index_of(at(11)).unwrap();
    let noon = engine.grid().index_of(at(12)).unwrap();

    assert_eq!(overlay[ten].fill_percent, 100);
    assert_eq!(overlay[eleven].fill_percent, 50);
    assert_eq!(overlay[noon].fill_percent, 0);
    assert_eq!(
        overlay[eleven].tooltip,
        Some(Tooltip::Detail {
            available: users(&["alice"]),
            unavailable: users(&["bob"]),
        })
    );

    // Reloading with the stored slots preselects the same cells.
    let stored = session
        .transport()
        .service()
        .slots_for_user("workday", "alice")
        .unwrap();
    let reloaded = GridBuilder::new(&mapper).build(&event, &stored);
    assert_eq!(reloaded.selected_keys(), engine.selected_keys());
}

#[test]
fn test_rejected_save_reports_failure_without_refresh() {
    let db = Database::new(":memory:").unwrap();
    db.initialize_schema().unwrap();
    AvailabilityService::new(db.connection())
        .create_event(&events::new_york_workday())
        .unwrap();

    let mapper = SlotKeyMapper::new(New_York);
    let grid = GridBuilder::new(&mapper).build(&events::new_york_workday(), &BTreeSet::new());
    let mut engine = SelectionEngine::new(grid, SelectionMode::Select);

    let mut session = SyncSession::new(
        SyncController::new(SyncContext::new("workday", "stale"), SyncTimings::default()),
        StoreTransport::new(db, "alice"),
    );
    session.attach(engine.subscribe());

    drag(&mut engine, at(9), at(9));
    let t0 = Instant::now();
    session.run_once(t0);
    assert!(!session.run_once(t0 + Duration::from_secs(1)));

    assert_eq!(session.controller().status(), SaveStatus::Failed);
    assert!(session.controller().aggregate().is_none());
    assert_eq!(*session.transport().saves.borrow(), 0);
}

#[test]
fn test_read_only_viewer_shows_details() {
    let mapper = SlotKeyMapper::new(New_York);
    let grid = GridBuilder::new(&mapper).build(&events::new_york_workday(), &BTreeSet::new());
    let mut engine = SelectionEngine::new(grid, SelectionMode::ReadOnly);
    let changes = engine.subscribe();

    let nine = engine.grid().index_of(at(9)).unwrap();
    assert_eq!(engine.pointer_down(1, nine), PointerOutcome::ShowDetail(nine));
    assert_eq!(engine.pointer_up(1), PointerOutcome::Ignored);
    assert!(changes.try_recv().is_err());
    assert!(engine.selected_keys().is_empty());
}

#[test]
fn test_spring_forward_grid_skips_missing_hour() {
    let mapper = SlotKeyMapper::new(New_York);
    let event = events::spring_forward_night();
    let grid = GridBuilder::new(&mapper).build(&event, &BTreeSet::new());

    let hours: Vec<u32> = grid.cells().iter().map(|cell| cell.position.hour).collect();
    assert_eq!(hours, vec![0, 1, 3, 4, 5, 6]);

    let distinct: BTreeSet<SlotKey> = grid.cells().iter().map(|cell| cell.key).collect();
    assert_eq!(distinct.len(), grid.len());
    assert_eq!(
        grid.cell(grid.index_of(LocalPosition::from_ymd_h(2024, 3, 10, 3).unwrap()).unwrap())
            .unwrap()
            .key
            .to_string(),
        "2024-03-10_7"
    );
}
