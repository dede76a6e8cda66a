// Driver - the external browser-control capability boundary
//
// Everything the executor knows about the browser goes through this trait.
// Any backend that can navigate, query elements, and issue keystrokes/clicks
// is substitutable: a real WebDriver/CDP client in production, the in-crate
// fake in tests.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::locator::Locator;

/// Opaque reference to a resolved page element.
///
/// Handles are issued by the driver when a locator query matches. A handle
/// stays valid only as long as the backing element stays attached; the DOM is
/// externally mutable, so staleness is detected at use time, never prevented.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle(Arc<str>);

impl Handle {
    /// Creates a handle from a driver-issued element id
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// The driver-issued element id backing this handle
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element@{}", self.0)
    }
}

/// Errors reported by a driver backend.
///
/// `Stale` and `NotInteractable` are per-element conditions the executor
/// folds into `ActionResult::Failed`; `SessionClosed` and `Backend` mean the
/// connection itself is unusable and escalate to `crate::Error`.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// The element backing a handle has been detached or replaced
    #[error("stale element: {0}")]
    Stale(String),

    /// The element cannot accept the requested interaction
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// The browser-control session has been closed
    #[error("driver session closed")]
    SessionClosed,

    /// Backend-specific failure (connection dropped, protocol fault)
    #[error("driver backend failure: {0}")]
    Backend(String),
}

/// Result alias for driver operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// The capability surface the executor requires from a browser backend.
///
/// All methods observe or mutate the live page through the backend's own
/// protocol. Implementations must be safe to call sequentially from one task;
/// the executor never issues concurrent calls against a single driver.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigates the page to the given URL
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Returns handles for every element currently matching the locator.
    ///
    /// An empty vec is not an error: "no matches yet" is a state the polling
    /// loop is expected to see.
    async fn find(&self, locator: &Locator) -> DriverResult<Vec<Handle>>;

    /// Returns true while the element backing `handle` is attached to the page.
    ///
    /// Backend-facing capability: the executor itself relies on `Stale`
    /// errors from the other element methods rather than pre-flight checks,
    /// but backends and callers holding handles across page mutations can
    /// probe attachment directly.
    async fn is_attached(&self, handle: &Handle) -> DriverResult<bool>;

    /// Returns true if the element is rendered visible
    async fn is_visible(&self, handle: &Handle) -> DriverResult<bool>;

    /// Returns true if the element accepts interaction (not disabled)
    async fn is_enabled(&self, handle: &Handle) -> DriverResult<bool>;

    /// Reads the element's visible text content
    async fn text(&self, handle: &Handle) -> DriverResult<String>;

    /// Reads an attribute value, or `None` if the attribute is absent
    async fn attribute(&self, handle: &Handle, name: &str) -> DriverResult<Option<String>>;

    /// Sends keystrokes to the element
    async fn type_text(&self, handle: &Handle, text: &str) -> DriverResult<()>;

    /// Clicks the element
    async fn click(&self, handle: &Handle) -> DriverResult<()>;

    /// Returns the URL the page currently reports
    async fn current_url(&self) -> DriverResult<String>;

    /// Closes the browser-control connection.
    ///
    /// Must tolerate a second call: the session layer issues at most one
    /// logical teardown, but callers may also close the backend directly.
    async fn close(&self) -> DriverResult<()>;
}
