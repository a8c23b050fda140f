//! Debounced auto-save and visibility-aware polling.
//!
//! The controller owns two timers, both plain deadlines checked by
//! [`SyncController::tick`]: the save debounce and the refresh poller. It
//! never performs I/O itself. `tick` and the completion callbacks return
//! [`SyncCommand`]s for a driver to execute and report back, so responses
//! may arrive late or out of order.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use super::SyncError;
use crate::models::availability::AggregateResult;
use crate::models::settings::Settings;
use crate::models::slot::SlotKey;
use crate::services::selection::SelectionChanged;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTimings {
    pub save_debounce: Duration,
    pub poll_interval: Duration,
    pub saved_status: Duration,
    pub error_status: Duration,
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for SyncTimings {
    fn from(settings: &Settings) -> Self {
        Self {
            save_debounce: settings.save_debounce(),
            poll_interval: settings.poll_interval(),
            saved_status: settings.saved_status(),
            error_status: settings.error_status(),
        }
    }
}

/// Identity needed before any request can be sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncContext {
    pub event_id: Option<String>,
    pub csrf_token: Option<String>,
}

impl SyncContext {
    pub fn new(event_id: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            csrf_token: Some(csrf_token.into()),
        }
    }

    fn event_id(&self) -> Result<&str, SyncError> {
        self.event_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(SyncError::MissingContext("event id"))
    }

    fn csrf_token(&self) -> Result<&str, SyncError> {
        self.csrf_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(SyncError::MissingContext("CSRF token"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    Save {
        seq: u64,
        event_id: String,
        csrf_token: String,
        slots: BTreeSet<SlotKey>,
    },
    Refresh {
        seq: u64,
        event_id: String,
    },
}

/// Save button affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    /// The server answered `status: "error"`.
    Failed,
    /// Transport failure or missing context.
    Error,
}

impl SaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "Save",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
            SaveStatus::Failed => "Save Failed!",
            SaveStatus::Error => "Save Error!",
        }
    }
}

/// Cancelable periodic task. `start` and `stop` are idempotent.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTask {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start with an immediate first run. No-op when already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.next_due = Some(now);
        true
    }

    pub fn stop(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// True when a run is due; the next run is scheduled one interval later.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }
}

#[derive(Debug, Clone)]
struct Debounce {
    quiet: Duration,
    deadline: Option<Instant>,
    pending: Option<BTreeSet<SlotKey>>,
}

impl Debounce {
    fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
            pending: None,
        }
    }

    fn trigger(&mut self, now: Instant, selection: BTreeSet<SlotKey>) {
        self.deadline = Some(now + self.quiet);
        self.pending = Some(selection);
    }

    fn take_due(&mut self, now: Instant) -> Option<BTreeSet<SlotKey>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    fn cancel(&mut self) -> Option<BTreeSet<SlotKey>> {
        self.deadline = None;
        self.pending.take()
    }
}

pub struct SyncController {
    context: SyncContext,
    timings: SyncTimings,
    debounce: Debounce,
    poller: PeriodicTask,
    status: SaveStatus,
    status_reverts_at: Option<Instant>,
    next_seq: u64,
    latest_save_seq: u64,
    latest_applied_refresh: u64,
    aggregate: Option<AggregateResult>,
}

impl SyncController {
    /// Polling stays stopped until the document is reported visible.
    pub fn new(context: SyncContext, timings: SyncTimings) -> Self {
        Self {
            debounce: Debounce::new(timings.save_debounce),
            poller: PeriodicTask::new(timings.poll_interval),
            context,
            timings,
            status: SaveStatus::Idle,
            status_reverts_at: None,
            next_seq: 0,
            latest_save_seq: 0,
            latest_applied_refresh: 0,
            aggregate: None,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn has_pending_save(&self) -> bool {
        self.debounce.deadline.is_some()
    }

    /// Latest applied aggregate.
    pub fn aggregate(&self) -> Option<&AggregateResult> {
        self.aggregate.as_ref()
    }

    /// Earliest instant at which `tick` has something to do.
    pub fn next_wakeup(&self) -> Option<Instant> {
        [
            self.debounce.deadline,
            self.poller.next_due(),
            self.status_reverts_at,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Restart the quiet period with the latest full selection.
    pub fn selection_changed(&mut self, change: SelectionChanged, now: Instant) {
        self.debounce.trigger(now, change.selected);
    }

    /// Hidden documents stop polling; becoming visible restarts it with an
    /// immediate refresh.
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        if visible {
            if self.poller.start(now) {
                log::debug!("Aggregate polling started");
            }
        } else if self.poller.stop() {
            log::debug!("Aggregate polling stopped while hidden");
        }
    }

    /// Explicit save: skip the remaining quiet period.
    pub fn save_now(&mut self, selection: BTreeSet<SlotKey>, now: Instant) -> Vec<SyncCommand> {
        self.debounce.cancel();
        self.issue_save(selection, now).into_iter().collect()
    }

    pub fn tick(&mut self, now: Instant) -> Vec<SyncCommand> {
        if matches!(self.status_reverts_at, Some(at) if now >= at) {
            self.status = SaveStatus::Idle;
            self.status_reverts_at = None;
        }

        let mut commands = Vec::new();

        if let Some(selection) = self.debounce.take_due(now) {
            commands.extend(self.issue_save(selection, now));
        }

        if self.poller.poll_due(now) {
            commands.extend(self.issue_refresh());
        }

        commands
    }

    /// Report the outcome of a `Save` command. A successful save asks for an
    /// immediate refresh so the user's change shows in the shared view.
    pub fn save_completed(
        &mut self,
        seq: u64,
        result: Result<(), SyncError>,
        now: Instant,
    ) -> Vec<SyncCommand> {
        let is_latest = seq == self.latest_save_seq;

        match result {
            Ok(()) => {
                log::info!("Availability saved (request {})", seq);
                if is_latest {
                    self.set_status(SaveStatus::Saved, Some(now + self.timings.saved_status));
                }
                self.issue_refresh().into_iter().collect()
            }
            Err(err) => {
                match &err {
                    SyncError::Rejected(message) => {
                        log::error!("Auto-save rejected (request {}): {}", seq, message)
                    }
                    other => log::error!("Auto-save request error (request {}): {}", seq, other),
                }
                if is_latest {
                    let status = match err {
                        SyncError::Rejected(_) => SaveStatus::Failed,
                        _ => SaveStatus::Error,
                    };
                    self.set_status(status, Some(now + self.timings.error_status));
                }
                Vec::new()
            }
        }
    }

    /// Report the outcome of a `Refresh` command. Returns true when the
    /// aggregate was applied; responses older than the last applied one are
    /// dropped.
    pub fn refresh_completed(&mut self, seq: u64, result: Result<AggregateResult, SyncError>) -> bool {
        match result {
            Ok(aggregate) => {
                if seq < self.latest_applied_refresh {
                    log::debug!(
                        "Discarding stale aggregate response {} (latest applied {})",
                        seq,
                        self.latest_applied_refresh
                    );
                    return false;
                }
                self.latest_applied_refresh = seq;
                self.aggregate = Some(aggregate);
                true
            }
            Err(err) => {
                log::error!("Aggregate refresh {} failed, skipping this cycle: {}", seq, err);
                false
            }
        }
    }

    fn issue_save(&mut self, slots: BTreeSet<SlotKey>, now: Instant) -> Option<SyncCommand> {
        let context = self
            .context
            .event_id()
            .and_then(|event_id| Ok((event_id.to_string(), self.context.csrf_token()?.to_string())));

        let (event_id, csrf_token) = match context {
            Ok(context) => context,
            Err(err) => {
                log::error!("Cannot auto-save: {}", err);
                self.set_status(SaveStatus::Error, Some(now + self.timings.error_status));
                return None;
            }
        };

        let seq = self.next_seq();
        self.latest_save_seq = seq;
        self.set_status(SaveStatus::Saving, None);

        Some(SyncCommand::Save {
            seq,
            event_id,
            csrf_token,
            slots,
        })
    }

    fn issue_refresh(&mut self) -> Option<SyncCommand> {
        match self.context.event_id() {
            Ok(event_id) => {
                let event_id = event_id.to_string();
                Some(SyncCommand::Refresh {
                    seq: self.next_seq(),
                    event_id,
                })
            }
            Err(err) => {
                log::error!("Cannot fetch aggregate data: {}", err);
                None
            }
        }
    }

    fn set_status(&mut self, status: SaveStatus, reverts_at: Option<Instant>) {
        self.status = status;
        self.status_reverts_at = reverts_at;
    }

    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
