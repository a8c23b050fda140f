//! JSON bodies exchanged with the availability endpoint.
//!
//! The server may encode an empty map as `[]` and percentages as floats, so
//! both are accepted on input.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::SyncError;
use crate::models::availability::{AggregateResult, SlotDetail};
use crate::models::slot::SlotKey;

/// Discriminator of the `get_aggregate_data` GET action.
pub const AGGREGATE_ACTION: &str = "get_aggregate_data";
/// Discriminator of the save POST form.
pub const SAVE_ACTION: &str = "save_availability";
/// Header marking a request issued by auto-save rather than a form submit.
pub const ASYNC_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn into_result(self) -> Result<(), SyncError> {
        match self.status {
            ResponseStatus::Success => Ok(()),
            ResponseStatus::Error => Err(SyncError::Rejected(
                self.message.unwrap_or_else(|| "unspecified error".to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResponse {
    pub status: ResponseStatus,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub per_slot_availability_percentages: BTreeMap<SlotKey, f64>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub slot_user_details: BTreeMap<SlotKey, SlotDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AggregateResponse {
    pub fn success(result: &AggregateResult) -> Self {
        Self {
            status: ResponseStatus::Success,
            per_slot_availability_percentages: result
                .per_slot_percentage
                .iter()
                .map(|(key, percent)| (*key, f64::from(*percent)))
                .collect(),
            slot_user_details: result.per_slot_detail.clone(),
            message: None,
        }
    }

    pub fn into_result(self) -> Result<AggregateResult, SyncError> {
        if self.status == ResponseStatus::Error {
            return Err(SyncError::Rejected(
                self.message.unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }

        let per_slot_percentage = self
            .per_slot_availability_percentages
            .into_iter()
            .map(|(key, percent)| (key, percent.round().clamp(0.0, 100.0) as u8))
            .collect();

        Ok(AggregateResult {
            per_slot_percentage,
            per_slot_detail: self.slot_user_details,
        })
    }
}

fn map_or_empty_list<'de, D, V>(deserializer: D) -> Result<BTreeMap<SlotKey, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList<V> {
        Map(BTreeMap<SlotKey, V>),
        List(Vec<serde::de::IgnoredAny>),
    }

    match MapOrList::deserialize(deserializer)? {
        MapOrList::Map(map) => Ok(map),
        MapOrList::List(items) if items.is_empty() => Ok(BTreeMap::new()),
        MapOrList::List(_) => Err(serde::de::Error::custom("expected a map keyed by slot")),
    }
}
