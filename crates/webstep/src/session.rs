// Session - one live browser-control connection
//
// A session owns its driver connection lifecycle: created on demand, torn
// down exactly once. It is not shared across concurrent logical tests; each
// scenario gets its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::driver::{Driver, DriverError};
use crate::error::{Error, Result};

/// Process-scoped handle wrapping one live browser-control connection.
///
/// All wait/act calls against one session are issued sequentially by the
/// caller. Teardown is idempotent: the first `close()` closes the driver,
/// later ones are no-ops, and every operation after teardown fails with
/// `Error::SessionClosed`.
pub struct Session {
    driver: Arc<dyn Driver>,
    closed: AtomicBool,
}

impl Session {
    /// Creates a session over a live driver connection
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            closed: AtomicBool::new(false),
        }
    }

    /// Returns true once the session has been torn down
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Tears down the browser-control connection.
    ///
    /// Exactly one call reaches the driver; any later call returns `Ok(())`
    /// without touching it.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        debug!("closing session");
        match self.driver.close().await {
            Ok(()) | Err(DriverError::SessionClosed) => Ok(()),
            Err(e) => Err(Error::DriverUnavailable(e.to_string())),
        }
    }

    /// The underlying driver, for operations issued through this session.
    ///
    /// Fails once the session is closed so no query races teardown.
    pub(crate) fn driver(&self) -> Result<&dyn Driver> {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }
        Ok(self.driver.as_ref())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
