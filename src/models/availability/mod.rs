// Availability module
// Per-user availability records and the aggregate derived from them

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::slot::SlotKey;

/// Usernames are stored lower-cased, trimmed and capped at this many chars.
pub const MAX_USERNAME_CHARS: usize = 32;

/// A user marked themselves available for exactly one UTC hour of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub event_id: String,
    pub username: String,
    pub slot: DateTime<Utc>,
}

impl AvailabilityRecord {
    pub fn new(event_id: impl Into<String>, username: impl Into<String>, slot: SlotKey) -> Self {
        Self {
            event_id: event_id.into(),
            username: username.into(),
            slot: slot.start(),
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::from_instant(self.slot)
    }
}

/// Who is and is not available for one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotDetail {
    pub available: Vec<String>,
    pub unavailable: Vec<String>,
}

/// Derived per-slot view of an event's availability. Never persisted.
///
/// A key missing from `per_slot_percentage` means 0 %; a key missing from
/// `per_slot_detail` means nobody is available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub per_slot_percentage: BTreeMap<SlotKey, u8>,
    pub per_slot_detail: BTreeMap<SlotKey, SlotDetail>,
}

impl AggregateResult {
    pub fn percentage(&self, key: &SlotKey) -> u8 {
        self.per_slot_percentage.get(key).copied().unwrap_or(0)
    }

    pub fn detail(&self, key: &SlotKey) -> Option<&SlotDetail> {
        self.per_slot_detail.get(key)
    }
}

/// Canonical form of a display name entered by a participant.
///
/// Returns `None` when nothing is left after trimming.
pub fn normalize_username(raw: &str) -> Option<String> {
    let normalized: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .take(MAX_USERNAME_CHARS)
        .collect();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_username_trims_lowercases_and_truncates() {
        assert_eq!(normalize_username("  Alice "), Some("alice".to_string()));
        assert_eq!(normalize_username("   "), None);

        let long = "X".repeat(40);
        assert_eq!(normalize_username(&long).unwrap().chars().count(), MAX_USERNAME_CHARS);
    }

    #[test]
    fn missing_slot_defaults_to_zero_percent() {
        let result = AggregateResult::default();
        let key: SlotKey = "2024-01-01_14".parse().unwrap();
        assert_eq!(result.percentage(&key), 0);
        assert!(result.detail(&key).is_none());
    }

    #[test]
    fn record_key_matches_slot() {
        let key: SlotKey = "2024-06-01_8".parse().unwrap();
        let record = AvailabilityRecord::new("e1", "bob", key);
        assert_eq!(record.key(), key);
    }
}
