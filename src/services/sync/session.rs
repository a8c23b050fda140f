//! Synchronous driver that executes controller commands on a transport.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use super::controller::{SyncCommand, SyncController};
use super::transport::SyncTransport;
use crate::services::selection::SelectionChanged;

pub struct SyncSession<T: SyncTransport> {
    controller: SyncController,
    transport: T,
    changes: Option<Receiver<SelectionChanged>>,
}

impl<T: SyncTransport> SyncSession<T> {
    pub fn new(controller: SyncController, transport: T) -> Self {
        Self {
            controller,
            transport,
            changes: None,
        }
    }

    /// Feed selection notifications (from `SelectionEngine::subscribe`) into
    /// the save debounce.
    pub fn attach(&mut self, changes: Receiver<SelectionChanged>) {
        self.changes = Some(changes);
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SyncController {
        &mut self.controller
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Drain pending notifications, tick the controller and run whatever it
    /// asks for. Returns true when a new aggregate was applied.
    pub fn run_once(&mut self, now: Instant) -> bool {
        self.drain_changes(now);
        let commands = self.controller.tick(now);
        self.execute(commands, now)
    }

    /// Run commands from an explicit call such as `SyncController::save_now`.
    pub fn execute(&mut self, commands: Vec<SyncCommand>, now: Instant) -> bool {
        let mut queue: VecDeque<SyncCommand> = commands.into();
        let mut updated = false;

        while let Some(command) = queue.pop_front() {
            match command {
                SyncCommand::Save {
                    seq,
                    event_id,
                    csrf_token,
                    slots,
                } => {
                    log::debug!("Saving {} slot(s) for event {}", slots.len(), event_id);
                    let result = self.transport.save(&event_id, &csrf_token, &slots);
                    queue.extend(self.controller.save_completed(seq, result, now));
                }
                SyncCommand::Refresh { seq, event_id } => {
                    let result = self.transport.fetch_aggregate(&event_id);
                    updated |= self.controller.refresh_completed(seq, result);
                }
            }
        }

        updated
    }

    fn drain_changes(&mut self, now: Instant) {
        let Some(changes) = &self.changes else {
            return;
        };

        let mut disconnected = false;
        loop {
            match changes.try_recv() {
                Ok(change) => self.controller.selection_changed(change, now),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if disconnected {
            log::debug!("Selection channel closed");
            self.changes = None;
        }
    }
}
