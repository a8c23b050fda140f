//! Layout of the schedulable hour cells for one event, in the viewer's
//! local time.
//!
//! The event window is converted to local wall-clock positions and rendered
//! as one column per local day. When the daily hour range crosses local
//! midnight (start hour after end hour) each column gets two blocks, early
//! `[0, end]` and late `[start, 23]`, separated by a gap row. The first day's
//! early block precedes the event and the last day's late block follows it,
//! so both are rendered but not schedulable.

mod overlay;

pub use overlay::{CellOverlay, Tooltip};

use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeZone};

use crate::models::event::Event;
use crate::models::slot::{LocalPosition, SlotKey, SlotKeyError};
use crate::services::slot_mapper::SlotKeyMapper;
use crate::utils::date::{day_header, days_inclusive, is_weekend};

/// View state of one rendered local hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub position: LocalPosition,
    pub key: SlotKey,
    pub selected: bool,
    pub schedulable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridRow {
    /// Index into [`Grid::cells`].
    Cell(usize),
    /// Visual break between the early and late blocks of a spanning window.
    Gap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub weekend: bool,
    pub date_label: String,
    pub day_name: String,
    pub rows: Vec<GridRow>,
}

/// Daily shape of the event window in local hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowShape {
    Contiguous { start_hour: u32, end_hour: u32 },
    Spanning { start_hour: u32, end_hour: u32 },
}

impl WindowShape {
    pub fn from_hours(start_hour: u32, end_hour: u32) -> Self {
        if start_hour > end_hour {
            Self::Spanning {
                start_hour,
                end_hour,
            }
        } else {
            Self::Contiguous {
                start_hour,
                end_hour,
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    columns: Vec<DayColumn>,
}

impl Grid {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn columns(&self) -> &[DayColumn] {
        &self.columns
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Hit test by local position.
    pub fn index_of(&self, position: LocalPosition) -> Option<usize> {
        self.cells.iter().position(|cell| cell.position == position)
    }

    pub fn index_of_key(&self, key: &SlotKey) -> Option<usize> {
        self.cells.iter().position(|cell| cell.key == *key)
    }

    /// Keys of every selected schedulable cell, the payload of a save.
    pub fn selected_keys(&self) -> BTreeSet<SlotKey> {
        self.cells
            .iter()
            .filter(|cell| cell.schedulable && cell.selected)
            .map(|cell| cell.key)
            .collect()
    }

    /// Replace the selection with `keys`. Non-schedulable cells stay
    /// unselected.
    pub fn load_selection(&mut self, keys: &BTreeSet<SlotKey>) {
        for cell in &mut self.cells {
            cell.selected = cell.schedulable && keys.contains(&cell.key);
        }
    }
}

pub struct GridBuilder<'a, Tz: TimeZone> {
    mapper: &'a SlotKeyMapper<Tz>,
}

impl<'a, Tz: TimeZone> GridBuilder<'a, Tz> {
    pub fn new(mapper: &'a SlotKeyMapper<Tz>) -> Self {
        Self { mapper }
    }

    /// Lay out every local hour of `event`, preselecting `saved` slots.
    pub fn build(&self, event: &Event, saved: &BTreeSet<SlotKey>) -> Grid {
        let start = self.mapper.local_position(event.start);
        let end = self.mapper.local_position(event.end);
        let shape = WindowShape::from_hours(start.hour, end.hour);

        let mut grid = Grid::default();

        for date in days_inclusive(start.date, end.date) {
            let is_first_day = date == start.date;
            let is_last_day = date == end.date;
            let (date_label, day_name) = day_header(date);

            let mut column = DayColumn {
                date,
                weekend: is_weekend(date),
                date_label,
                day_name,
                rows: Vec::new(),
            };

            match shape {
                WindowShape::Contiguous {
                    start_hour,
                    end_hour,
                } => {
                    for hour in start_hour..=end_hour {
                        self.push_cell(&mut grid, &mut column, date, hour, true, saved);
                    }
                }
                WindowShape::Spanning {
                    start_hour,
                    end_hour,
                } => {
                    for hour in 0..=end_hour {
                        self.push_cell(&mut grid, &mut column, date, hour, !is_first_day, saved);
                    }
                    column.rows.push(GridRow::Gap);
                    for hour in start_hour..=23 {
                        self.push_cell(&mut grid, &mut column, date, hour, !is_last_day, saved);
                    }
                }
            }

            grid.columns.push(column);
        }

        log::debug!(
            "Built grid for event {}: {} day(s), {} cell(s), shape {:?}",
            event.id,
            grid.columns.len(),
            grid.cells.len(),
            shape
        );

        grid
    }

    fn push_cell(
        &self,
        grid: &mut Grid,
        column: &mut DayColumn,
        date: NaiveDate,
        hour: u32,
        schedulable: bool,
        saved: &BTreeSet<SlotKey>,
    ) {
        let position = LocalPosition { date, hour };
        let key = match self.mapper.to_utc_key(position) {
            Ok(key) => key,
            Err(SlotKeyError::NonexistentLocalTime { .. }) => {
                log::debug!("Skipping local hour {} skipped by a DST transition", position);
                return;
            }
            Err(err) => {
                log::warn!("Skipping cell {}: {}", position, err);
                return;
            }
        };

        column.rows.push(GridRow::Cell(grid.cells.len()));
        grid.cells.push(Cell {
            position,
            key,
            selected: schedulable && saved.contains(&key),
            schedulable,
        });
    }
}
