// Settings module
// Client-side sync configuration, persisted as TOML

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Endpoint serving both the save and the aggregate actions.
    pub base_url: String,
    pub event_id: Option<String>,
    pub csrf_token: Option<String>,
    pub username: Option<String>,
    pub save_debounce_ms: u64,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub saved_status_secs: u64,
    pub error_status_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/event.php".to_string(),
            event_id: None,
            csrf_token: None,
            username: None,
            save_debounce_ms: 1000,
            poll_interval_secs: 15,
            request_timeout_secs: 20,
            saved_status_secs: 2,
            error_status_secs: 3,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err("Base URL must use http or https".to_string());
        }

        if self.save_debounce_ms == 0 {
            return Err("Save debounce must be greater than 0 ms".to_string());
        }

        if self.poll_interval_secs == 0 {
            return Err("Poll interval must be greater than 0 seconds".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than 0 seconds".to_string());
        }

        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn saved_status(&self) -> Duration {
        Duration::from_secs(self.saved_status_secs)
    }

    pub fn error_status(&self) -> Duration {
        Duration::from_secs(self.error_status_secs)
    }
}
