use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_events_table(conn)?;
    create_availability_table(conn)?;
    create_user_sessions_table(conn)?;
    Ok(())
}

fn create_events_table(conn: &Connection) -> Result<()> {
    // Window bounds are epoch milliseconds.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            uniqueid TEXT PRIMARY KEY,
            event_name TEXT NOT NULL,
            start_datetime INTEGER NOT NULL,
            end_datetime INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (end_datetime > start_datetime)
        )",
        [],
    )
    .context("Failed to create events table")?;

    Ok(())
}

fn create_availability_table(conn: &Connection) -> Result<()> {
    // Slots are UTC epoch seconds at the top of the hour.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS availability (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT NOT NULL,
            username TEXT NOT NULL,
            slot_timestamp INTEGER NOT NULL,
            UNIQUE (event_id, username, slot_timestamp),
            FOREIGN KEY (event_id) REFERENCES events(uniqueid) ON DELETE CASCADE
        )",
        [],
    )
    .context("Failed to create availability table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_availability_event ON availability(event_id)",
        [],
    )
    .context("Failed to create availability index")?;

    Ok(())
}

fn create_user_sessions_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_sessions (
            event_id TEXT NOT NULL,
            username TEXT NOT NULL,
            last_active TEXT NOT NULL,
            PRIMARY KEY (event_id, username),
            FOREIGN KEY (event_id) REFERENCES events(uniqueid) ON DELETE CASCADE
        )",
        [],
    )
    .context("Failed to create user_sessions table")?;

    Ok(())
}
