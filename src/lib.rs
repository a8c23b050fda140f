// Availability Grid Library
// Hourly availability grid, drag selection, aggregation and auto-sync

pub mod models;
pub mod services;
pub mod utils;
