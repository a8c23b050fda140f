// Availability Grid
// Headless viewer: polls an event's shared availability and logs it

use std::env;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use availability_grid::models::availability::AggregateResult;
use availability_grid::services::settings::SettingsService;
use availability_grid::services::slot_mapper::SlotKeyMapper;
use availability_grid::services::sync::{
    HttpTransport, SyncContext, SyncController, SyncSession, SyncTimings,
};
use chrono::TimeZone;

const MAX_SLEEP: Duration = Duration::from_millis(500);
const MIN_SLEEP: Duration = Duration::from_millis(20);

fn main() -> Result<()> {
    env_logger::init();

    let settings_service = match env::args().nth(1) {
        Some(path) => SettingsService::new(path),
        None => SettingsService::at_default_location(),
    };
    let settings = settings_service.load()?;

    let event_id = settings.event_id.clone().ok_or_else(|| {
        anyhow!(
            "No event_id configured in {}",
            settings_service.path().display()
        )
    })?;

    log::info!(
        "Watching availability for event {} at {}",
        event_id,
        settings.base_url
    );

    let transport = HttpTransport::new(&settings).context("Failed to set up HTTP transport")?;
    let context = SyncContext {
        event_id: Some(event_id),
        csrf_token: settings.csrf_token.clone(),
    };
    let controller = SyncController::new(context, SyncTimings::from(&settings));
    let mut session = SyncSession::new(controller, transport);
    session.controller_mut().set_visible(true, Instant::now());

    let mapper = SlotKeyMapper::local();

    loop {
        if session.run_once(Instant::now()) {
            if let Some(aggregate) = session.controller().aggregate() {
                log_aggregate(&mapper, aggregate);
            }
        }

        let sleep = session
            .controller()
            .next_wakeup()
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or(MAX_SLEEP)
            .clamp(MIN_SLEEP, MAX_SLEEP);
        thread::sleep(sleep);
    }
}

fn log_aggregate<Tz: TimeZone>(mapper: &SlotKeyMapper<Tz>, aggregate: &AggregateResult) {
    if aggregate.per_slot_percentage.is_empty() {
        log::info!("No availability recorded yet");
        return;
    }

    for (key, percent) in &aggregate.per_slot_percentage {
        let position = mapper.from_utc_key(key);
        match aggregate.detail(key) {
            Some(detail) => log::info!(
                "{} {:>3}% available: [{}] unavailable: [{}]",
                position,
                percent,
                detail.available.join(", "),
                detail.unavailable.join(", ")
            ),
            None => log::info!("{} {:>3}%", position, percent),
        }
    }
}
