//! Reference availability store backed by SQLite.
//!
//! Covers the storage side of the save and aggregate actions: event lookup,
//! user sessions, per-user slot replacement and the aggregate query.

use rusqlite::Connection;

pub mod events;
pub mod records;

/// Service for events and availability stored in SQLite.
pub struct AvailabilityService<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> AvailabilityService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}
