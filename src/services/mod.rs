// Service module exports

pub mod aggregate;
pub mod availability;
pub mod database;
pub mod grid;
pub mod selection;
pub mod settings;
pub mod slot_mapper;
pub mod sync;
