// Module exports for models

pub mod availability;
pub mod event;
pub mod settings;
pub mod slot;
