// Settings service module
// Loads and stores client settings as TOML

mod service;

pub use service::SettingsService;
