use super::AvailabilityService;
use crate::models::event::Event;
use anyhow::{anyhow, Context, Result};
use rusqlite::{self, params};

impl<'a> AvailabilityService<'a> {
    pub fn create_event(&self, event: &Event) -> Result<()> {
        event.validate().map_err(|e| anyhow!(e))?;

        self.conn
            .execute(
                "INSERT INTO events (uniqueid, event_name, start_datetime, end_datetime)
                 VALUES (?, ?, ?, ?)",
                params![
                    event.id,
                    event.name,
                    event.start.timestamp_millis(),
                    event.end.timestamp_millis(),
                ],
            )
            .with_context(|| format!("Failed to insert event {}", event.id))?;

        Ok(())
    }

    pub fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let result = self.conn.query_row(
            "SELECT uniqueid, event_name, start_datetime, end_datetime
             FROM events WHERE uniqueid = ?",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        );

        match result {
            Ok((id, name, start_ms, end_ms)) => Event::from_millis(id, name, start_ms, end_ms)
                .map(Some)
                .map_err(|e| anyhow!("Stored event is invalid: {}", e)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to load event"),
        }
    }

    /// Remove an event with its sessions and availability. Returns false when
    /// the event did not exist.
    pub fn delete_event(&self, id: &str) -> Result<bool> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin delete transaction")?;

        tx.execute("DELETE FROM availability WHERE event_id = ?", [id])
            .context("Failed to delete availability")?;
        tx.execute("DELETE FROM user_sessions WHERE event_id = ?", [id])
            .context("Failed to delete user sessions")?;
        let deleted = tx
            .execute("DELETE FROM events WHERE uniqueid = ?", [id])
            .context("Failed to delete event")?;

        tx.commit().context("Failed to commit event deletion")?;

        if deleted > 0 {
            log::info!("Deleted event {}", id);
        }
        Ok(deleted > 0)
    }
}
