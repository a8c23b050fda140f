// Sync module
// Keeps the local selection and the shared aggregate in step with the server

pub mod controller;
pub mod protocol;
pub mod session;
pub mod transport;

pub use controller::{PeriodicTask, SaveStatus, SyncCommand, SyncContext, SyncController, SyncTimings};
pub use session::SyncSession;
pub use transport::{HttpTransport, SyncTransport};

use thiserror::Error;

/// Failure taxonomy for save and refresh requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Network failure, non-2xx status or an unreadable body.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Well-formed response carrying `status: "error"`.
    #[error("request rejected by server: {0}")]
    Rejected(String),
    /// Required client-side context was absent; nothing was sent.
    #[error("missing {0}, request not sent")]
    MissingContext(&'static str),
}
