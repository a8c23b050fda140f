use std::collections::BTreeSet;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};

use super::protocol::{AggregateResponse, SaveResponse, AGGREGATE_ACTION, ASYNC_HEADER, SAVE_ACTION};
use super::SyncError;
use crate::models::availability::AggregateResult;
use crate::models::settings::Settings;
use crate::models::slot::SlotKey;

/// The two requests the sync controller needs from the server.
#[cfg_attr(test, mockall::automock)]
pub trait SyncTransport {
    /// Replace the caller's availability for the event with `slots`.
    fn save(&self, event_id: &str, csrf_token: &str, slots: &BTreeSet<SlotKey>) -> Result<(), SyncError>;

    fn fetch_aggregate(&self, event_id: &str) -> Result<AggregateResult, SyncError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to build availability HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn read_body(response: Response) -> Result<String, SyncError> {
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Transport(format!("HTTP status {}", status)));
        }

        response
            .text()
            .map_err(|err| SyncError::Transport(format!("Failed to read response body: {}", err)))
    }
}

/// Form body of a save request. Slot keys are sent in ascending order.
pub fn save_form(csrf_token: &str, slots: &BTreeSet<SlotKey>) -> Vec<(&'static str, String)> {
    let mut form = Vec::with_capacity(slots.len() + 2);
    form.push(("form_action", SAVE_ACTION.to_string()));
    form.push(("csrf_token", csrf_token.to_string()));
    form.extend(slots.iter().map(|key| ("selected_slots[]", key.to_string())));
    form
}

impl SyncTransport for HttpTransport {
    fn save(&self, event_id: &str, csrf_token: &str, slots: &BTreeSet<SlotKey>) -> Result<(), SyncError> {
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("id", event_id)])
            .header(ASYNC_HEADER.0, ASYNC_HEADER.1)
            .form(&save_form(csrf_token, slots))
            .send()
            .map_err(|err| SyncError::Transport(format!("Network error during save: {}", err)))?;

        let body = Self::read_body(response)?;
        let parsed: SaveResponse = serde_json::from_str(&body)
            .map_err(|err| SyncError::Transport(format!("Malformed save response: {}", err)))?;
        parsed.into_result()
    }

    fn fetch_aggregate(&self, event_id: &str) -> Result<AggregateResult, SyncError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("id", event_id), ("action", AGGREGATE_ACTION)])
            .send()
            .map_err(|err| SyncError::Transport(format!("Network error during refresh: {}", err)))?;

        let body = Self::read_body(response)?;
        let parsed: AggregateResponse = serde_json::from_str(&body)
            .map_err(|err| SyncError::Transport(format!("Malformed aggregate response: {}", err)))?;
        parsed.into_result()
    }
}
