use std::time::Duration;

/// Failure to hand an operation to a session's home thread.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandoffError {
    /// The home thread has shut down or dropped the request.
    #[error("session has been torn down")]
    SessionGone,

    /// The home thread did not answer in time.
    #[error("session did not respond within {0:?}")]
    TimedOut(Duration),

    /// The home thread could not be started.
    #[error("failed to start session thread: {0}")]
    SpawnFailed(String),
}
