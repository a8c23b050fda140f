use std::collections::BTreeSet;

use super::AvailabilityService;
use crate::models::availability::{normalize_username, AggregateResult, AvailabilityRecord};
use crate::models::slot::SlotKey;
use crate::services::aggregate::AggregateComputer;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::params;

const LAST_ACTIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn normalized(raw: &str) -> Result<String> {
    normalize_username(raw).ok_or_else(|| anyhow!("Username cannot be empty"))
}

impl<'a> AvailabilityService<'a> {
    /// Record that `username` interacted with the event. Returns the stored
    /// (normalised) name.
    pub fn touch_user(&self, event_id: &str, username: &str, now: DateTime<Utc>) -> Result<String> {
        let username = normalized(username)?;

        self.conn
            .execute(
                "INSERT INTO user_sessions (event_id, username, last_active) VALUES (?, ?, ?)
                 ON CONFLICT (event_id, username) DO UPDATE SET last_active = excluded.last_active",
                params![event_id, username, now.format(LAST_ACTIVE_FORMAT).to_string()],
            )
            .with_context(|| format!("Failed to record session for event {}", event_id))?;

        Ok(username)
    }

    /// Replace everything `username` had marked for the event with `slots`.
    pub fn replace_slots(&self, event_id: &str, username: &str, slots: &BTreeSet<SlotKey>) -> Result<()> {
        let username = normalized(username)?;

        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin save transaction")?;

        tx.execute(
            "DELETE FROM availability WHERE event_id = ? AND username = ?",
            params![event_id, username],
        )
        .context("Failed to clear previous availability")?;

        {
            let mut insert = tx
                .prepare("INSERT INTO availability (event_id, username, slot_timestamp) VALUES (?, ?, ?)")
                .context("Failed to prepare availability insert")?;
            for key in slots {
                insert
                    .execute(params![event_id, username, key.start().timestamp()])
                    .with_context(|| format!("Failed to insert slot {}", key))?;
            }
        }

        tx.commit().context("Failed to commit availability")?;

        log::info!(
            "Saved {} slot(s) for {} on event {}",
            slots.len(),
            username,
            event_id
        );
        Ok(())
    }

    pub fn records_for_event(&self, event_id: &str) -> Result<Vec<AvailabilityRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT username, slot_timestamp FROM availability WHERE event_id = ? ORDER BY id")
            .context("Failed to prepare availability query")?;

        let rows = stmt
            .query_map([event_id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .context("Failed to query availability")?;

        let mut records = Vec::new();
        for row in rows {
            let (username, timestamp) = row.context("Failed to read availability row")?;
            let slot = Utc
                .timestamp_opt(timestamp, 0)
                .single()
                .ok_or_else(|| anyhow!("Invalid slot timestamp {}", timestamp))?;
            records.push(AvailabilityRecord {
                event_id: event_id.to_string(),
                username,
                slot,
            });
        }

        Ok(records)
    }

    /// Slots a user has marked, used to pre-select their grid.
    pub fn slots_for_user(&self, event_id: &str, username: &str) -> Result<BTreeSet<SlotKey>> {
        let username = normalized(username)?;
        Ok(self
            .records_for_event(event_id)?
            .into_iter()
            .filter(|record| record.username == username)
            .map(|record| record.key())
            .collect())
    }

    /// Everyone who has interacted with the event, most recently active first.
    pub fn event_users(&self, event_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT username FROM user_sessions WHERE event_id = ?
                 ORDER BY last_active DESC, username",
            )
            .context("Failed to prepare user query")?;

        let users = stmt
            .query_map([event_id], |row| row.get::<_, String>(0))
            .context("Failed to query event users")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read event users")?;

        Ok(users)
    }

    /// `None` when the event does not exist.
    pub fn aggregate_for_event(&self, event_id: &str) -> Result<Option<AggregateResult>> {
        let Some(event) = self.get_event(event_id)? else {
            return Ok(None);
        };

        let records = self.records_for_event(event_id)?;
        let users = self.event_users(event_id)?;
        Ok(Some(AggregateComputer::compute(&event, &records, &users)))
    }
}
