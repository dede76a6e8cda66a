// Error types for webstep
//
// Fatal errors only. Recoverable outcomes (timeouts, stale targets,
// cancellation) are ordinary `ActionResult` values the caller branches on;
// see the `result` module.

use thiserror::Error;

/// Result type alias for webstep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using webstep
///
/// These are fatal for the current session (or caller error). A session that
/// returns `DriverUnavailable` cannot be reused; the process itself is fine.
#[derive(Debug, Error)]
pub enum Error {
    /// The external driver collaborator's session died
    ///
    /// The browser-control connection is gone (process crashed, socket
    /// closed). Fatal for this `Session`; create a new one to continue.
    #[error("Driver unavailable: {0}")]
    DriverUnavailable(String),

    /// Operation attempted on a session that has been torn down
    #[error("Session closed: cannot perform operations after teardown")]
    SessionClosed,

    /// A `WaitSpec` violated its construction invariants
    ///
    /// Timeout and interval must both be strictly positive, and the interval
    /// must not exceed the timeout.
    #[error("Invalid wait spec: {0}")]
    InvalidWaitSpec(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
