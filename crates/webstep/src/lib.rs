//! webstep: condition-polling wait/act executor for browser automation
//!
//! This crate wraps a browser-control backend behind the [`Driver`] trait and
//! provides the one abstraction UI test scripts keep reinventing inline:
//! poll the live page until a condition holds, then interact with the
//! resolved element. Timeouts, polling cadence, cancellation, and failure
//! taxonomy are explicit values instead of hidden wait-object state.
//!
//! # Examples
//!
//! ## Wait for an element, then click it
//!
//! ```ignore
//! use std::sync::Arc;
//! use webstep::{ActionKind, Condition, Locator, Session, WaitSpec};
//!
//! # async fn demo(driver: Arc<dyn webstep::Driver>) -> webstep::Result<()> {
//! let session = Session::new(driver);
//!
//! let result = session
//!     .wait_then_act(
//!         &Locator::css("button.primary"),
//!         &WaitSpec::default(),
//!         &Condition::Enabled,
//!         &ActionKind::Click,
//!     )
//!     .await?;
//! assert!(result.is_success());
//!
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Run a login flow against any backend
//!
//! ```ignore
//! use std::sync::Arc;
//! use webstep::{
//!     Condition, Credentials, Locator, LoginFlow, WaitSpec, run_login,
//! };
//!
//! # async fn demo(driver: Arc<dyn webstep::Driver>) -> webstep::Result<()> {
//! let flow = LoginFlow {
//!     target_url: "https://example.test/".to_string(),
//!     username_field: Locator::id("email"),
//!     password_field: Locator::id("password"),
//!     submit_control: Locator::xpath("//button[@type='submit']"),
//!     success_locator: Locator::css(".user-name"),
//!     success_condition: Condition::UrlContains("/dashboard".to_string()),
//!     wait: WaitSpec::default(),
//! };
//! let credentials = Credentials::new("user@example.test", "hunter2");
//!
//! let outcome = run_login(driver, &flow, &credentials).await?;
//! assert!(outcome.result.is_success());
//! assert!(outcome.final_url.contains("/dashboard"));
//! # Ok(())
//! # }
//! ```
//!
//! The `fake` module ships an in-memory [`Driver`] implementation so both
//! examples run deterministically without a browser; see the integration
//! tests for full fixtures.

pub mod driver;
pub mod error;
pub mod executor;
pub mod fake;
pub mod locator;
pub mod result;
pub mod scenario;
pub mod session;
pub mod wait;

pub use driver::{Driver, DriverError, DriverResult, Handle};
pub use error::{Error, Result};
pub use executor::ActionKind;
pub use locator::{Locator, Strategy};
pub use result::{ActionResult, Failure};
pub use scenario::{
    Credentials, LoginFlow, ScenarioOutcome, ScenarioStep, run_login, run_login_cancellable,
    run_steps,
};
pub use session::Session;
pub use wait::{
    CheckOutcome, Condition, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT, Predicate, WaitSpec,
};
