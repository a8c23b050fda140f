//! Pointer/touch driven rectangular selection over a [`Grid`].
//!
//! The engine is a two-state machine. Pointer-down on a schedulable cell
//! enters `Dragging`, capturing the anchor, the drag direction (select when
//! the anchor was unselected, deselect otherwise) and a snapshot of every
//! cell's selection. Each move applies the direction inside the rectangle
//! spanned by anchor and hovered cell and restores the snapshot everywhere
//! else, so overshooting and coming back leaves nothing behind. Pointer-up
//! either toggles the anchor (no movement) or keeps the rectangle.
//!
//! Subscribers receive one [`SelectionChanged`] per interaction that ends
//! with a net change.

use std::collections::BTreeSet;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::models::slot::SlotKey;
use crate::services::grid::Grid;

/// Identifies one mouse or touch contact.
pub type PointerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Select,
    /// Pointer-down surfaces the cell's detail instead of selecting.
    ReadOnly,
}

/// Full selection after an interaction that changed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub selected: BTreeSet<SlotKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    DragStarted,
    Previewed,
    Committed { changed: bool },
    Cancelled,
    /// Read-only mode: show the tooltip of this cell.
    ShowDetail(usize),
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    pointer: PointerId,
    anchor: usize,
    select: bool,
    snapshot: Vec<bool>,
    moved: bool,
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

pub struct SelectionEngine {
    grid: Grid,
    mode: SelectionMode,
    state: DragState,
    subscribers: Vec<Sender<SelectionChanged>>,
}

impl SelectionEngine {
    pub fn new(grid: Grid, mode: SelectionMode) -> Self {
        Self {
            grid,
            mode,
            state: DragState::Idle,
            subscribers: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn selected_keys(&self) -> BTreeSet<SlotKey> {
        self.grid.selected_keys()
    }

    /// Register for change notifications. Dropped receivers are pruned on
    /// the next send.
    pub fn subscribe(&mut self) -> Receiver<SelectionChanged> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Switching to read-only abandons an active drag.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if mode == SelectionMode::ReadOnly {
            self.abort_drag();
        }
        self.mode = mode;
    }

    /// Replace the selection with saved slots, e.g. after a reload. Does not
    /// notify.
    pub fn load_selection(&mut self, keys: &BTreeSet<SlotKey>) {
        self.abort_drag();
        self.grid.load_selection(keys);
    }

    pub fn pointer_down(&mut self, pointer: PointerId, cell: usize) -> PointerOutcome {
        let Some(target) = self.grid.cell(cell) else {
            return PointerOutcome::Ignored;
        };

        if self.mode == SelectionMode::ReadOnly {
            return if target.schedulable {
                PointerOutcome::ShowDetail(cell)
            } else {
                PointerOutcome::Ignored
            };
        }

        if self.is_dragging() || !target.schedulable {
            return PointerOutcome::Ignored;
        }

        let select = !target.selected;
        let snapshot = self.grid.cells().iter().map(|c| c.selected).collect();

        self.state = DragState::Dragging(ActiveDrag {
            pointer,
            anchor: cell,
            select,
            snapshot,
            moved: false,
        });

        PointerOutcome::DragStarted
    }

    /// `hovered` is `None` when the pointer is not over any cell.
    pub fn pointer_move(&mut self, pointer: PointerId, hovered: Option<usize>) -> PointerOutcome {
        let DragState::Dragging(drag) = &mut self.state else {
            return PointerOutcome::Ignored;
        };
        if drag.pointer != pointer {
            return PointerOutcome::Ignored;
        }
        let Some(hovered) = hovered.filter(|index| *index < self.grid.len()) else {
            return PointerOutcome::Ignored;
        };

        if hovered == drag.anchor {
            if !drag.moved {
                return PointerOutcome::Ignored;
            }
            // Back on the anchor after leaving it: the drag is taken back.
            restore(&mut self.grid, &drag.snapshot);
            return PointerOutcome::Previewed;
        }

        drag.moved = true;

        let anchor = self.grid.cells()[drag.anchor].position;
        let current = self.grid.cells()[hovered].position;
        let (min_date, max_date) = (anchor.date.min(current.date), anchor.date.max(current.date));
        let (min_hour, max_hour) = (anchor.hour.min(current.hour), anchor.hour.max(current.hour));

        for (cell, original) in self.grid.cells_mut().iter_mut().zip(&drag.snapshot) {
            if !cell.schedulable {
                continue;
            }
            let inside = (min_date..=max_date).contains(&cell.position.date)
                && (min_hour..=max_hour).contains(&cell.position.hour);
            cell.selected = if inside { drag.select } else { *original };
        }

        PointerOutcome::Previewed
    }

    pub fn pointer_up(&mut self, pointer: PointerId) -> PointerOutcome {
        let drag = match std::mem::take(&mut self.state) {
            DragState::Dragging(drag) if drag.pointer == pointer => drag,
            other => {
                self.state = other;
                return PointerOutcome::Ignored;
            }
        };

        if !drag.moved {
            self.grid.cells_mut()[drag.anchor].selected = drag.select;
        }

        let changed = self
            .grid
            .cells()
            .iter()
            .zip(&drag.snapshot)
            .any(|(cell, original)| cell.selected != *original);

        if changed {
            self.notify();
        }

        PointerOutcome::Committed { changed }
    }

    /// Touch cancel or pointer lost: revert to the state before the drag.
    pub fn pointer_cancel(&mut self, pointer: PointerId) -> PointerOutcome {
        let owns_drag = matches!(&self.state, DragState::Dragging(drag) if drag.pointer == pointer);
        if !owns_drag {
            return PointerOutcome::Ignored;
        }

        self.abort_drag();
        PointerOutcome::Cancelled
    }

    fn abort_drag(&mut self) {
        if let DragState::Dragging(drag) = std::mem::take(&mut self.state) {
            restore(&mut self.grid, &drag.snapshot);
            log::debug!("Selection drag from cell {} abandoned", drag.anchor);
        }
    }

    fn notify(&mut self) {
        let event = SelectionChanged {
            selected: self.grid.selected_keys(),
        };
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

fn restore(grid: &mut Grid, snapshot: &[bool]) {
    for (cell, original) in grid.cells_mut().iter_mut().zip(snapshot) {
        if cell.schedulable {
            cell.selected = *original;
        }
    }
}
