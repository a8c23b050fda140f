// Database service module
// SQLite storage for events, availability records and user sessions

mod connection;
mod schema;

pub use connection::Database;
