use thiserror::Error;

/// Errors surfaced by [`crate::EventWaiter`] registration and async waits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaiterError {
    #[error("event waiter has been shut down")]
    ShutDown,
    #[error("event waiter requires an active Tokio runtime")]
    NoRuntime,
    #[error("wait timeout must be greater than zero")]
    InvalidTimeout,
    #[error("wait was cancelled before it matched or timed out")]
    Cancelled,
}
