// Wait specification and built-in conditions
//
// A `WaitSpec` is an explicit value (timeout + polling interval) rather than
// a shared, mutable wait object, so timing behavior is reproducible and
// testable under a paused clock. Conditions are the predicate vocabulary the
// polling loop evaluates against live page state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::{Driver, DriverError, DriverResult, Handle};
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::result::Failure;

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout and polling cadence for a single wait operation.
///
/// Invariants, enforced at construction and on deserialization: timeout and
/// interval are strictly positive and the interval never exceeds the timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWaitSpec")]
pub struct WaitSpec {
    timeout: Duration,
    interval: Duration,
}

/// Unvalidated mirror of `WaitSpec`; deserialization funnels through
/// `WaitSpec::new` so a JSON step list cannot smuggle in a zero interval.
#[derive(Deserialize)]
struct RawWaitSpec {
    timeout: Duration,
    interval: Duration,
}

impl TryFrom<RawWaitSpec> for WaitSpec {
    type Error = Error;

    fn try_from(raw: RawWaitSpec) -> Result<Self> {
        Self::new(raw.timeout, raw.interval)
    }
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitSpec {
    /// Creates a wait spec, validating the timing invariants
    pub fn new(timeout: Duration, interval: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::InvalidWaitSpec(
                "timeout must be strictly positive".to_string(),
            ));
        }
        if interval.is_zero() {
            return Err(Error::InvalidWaitSpec(
                "interval must be strictly positive".to_string(),
            ));
        }
        if interval > timeout {
            return Err(Error::InvalidWaitSpec(format!(
                "interval ({interval:?}) must not exceed timeout ({timeout:?})"
            )));
        }
        Ok(Self { timeout, interval })
    }

    /// Returns a copy with the given timeout
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        Self::new(timeout, self.interval.min(timeout))
    }

    /// Returns a copy with the given polling interval
    pub fn with_interval(self, interval: Duration) -> Result<Self> {
        Self::new(self.timeout, interval)
    }

    /// The total wait budget
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The cadence between predicate evaluations
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

/// A caller-supplied check over live page state.
///
/// The built-in `Condition` vocabulary covers the common capability checks;
/// implement this trait (and pass it to `Session::wait_until_with`) for
/// anything it does not express. Evaluations must observe only, never mutate
/// the page.
#[async_trait::async_trait]
pub trait Predicate: Send + Sync {
    /// Evaluates the predicate once against the driver's live state
    async fn evaluate(&self, driver: &dyn Driver) -> DriverResult<CheckOutcome>;

    /// Short description for log output
    fn describe(&self) -> String {
        "custom predicate".to_string()
    }
}

/// Tri-state outcome of one predicate evaluation.
pub enum CheckOutcome {
    /// The condition holds; carries every handle it resolved
    Satisfied(Vec<Handle>),
    /// The condition does not hold yet; keep polling
    NotYet,
    /// The condition can never hold from the observed state; stop polling
    Terminal(Failure),
}

/// Built-in predicate vocabulary over live page state.
///
/// Conditions are evaluated against the current matches of a locator (and,
/// for `UrlContains`, the page URL). A found-but-detached element is reported
/// as `Terminal(StaleTarget)` rather than retried forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "check", content = "value")]
pub enum Condition {
    /// At least one element matches the locator
    Exists,
    /// At least one match is rendered visible
    Visible,
    /// At least one match is visible and enabled for interaction
    Enabled,
    /// Some match's visible text equals the given string exactly
    TextEquals(String),
    /// Some match's visible text contains the given substring
    TextContains(String),
    /// Some match carries the attribute with exactly the given value
    AttributeEquals {
        /// Attribute name
        name: String,
        /// Required attribute value
        value: String,
    },
    /// The page URL contains the given substring; the locator is unused
    /// for this check and no element query is issued
    UrlContains(String),
}

impl Condition {
    /// Evaluates this condition once against the driver's live state.
    ///
    /// Observes only; never mutates the page. Element-level staleness
    /// surfacing mid-check is terminal for the wait, since a handle resolved
    /// and lost within one tick can never satisfy the condition.
    pub(crate) async fn check(
        &self,
        driver: &dyn Driver,
        locator: &Locator,
    ) -> DriverResult<CheckOutcome> {
        if let Self::UrlContains(fragment) = self {
            let url = driver.current_url().await?;
            return Ok(if url.contains(fragment.as_str()) {
                CheckOutcome::Satisfied(Vec::new())
            } else {
                CheckOutcome::NotYet
            });
        }

        let handles = driver.find(locator).await?;
        if handles.is_empty() {
            return Ok(CheckOutcome::NotYet);
        }

        match self {
            Self::Exists => Ok(CheckOutcome::Satisfied(handles)),
            Self::Visible => {
                for handle in &handles {
                    match driver.is_visible(handle).await {
                        Ok(true) => return Ok(CheckOutcome::Satisfied(handles.clone())),
                        Ok(false) => {}
                        Err(DriverError::Stale(_)) => {
                            return Ok(CheckOutcome::Terminal(Failure::StaleTarget));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(CheckOutcome::NotYet)
            }
            Self::Enabled => {
                for handle in &handles {
                    match interactable(driver, handle).await {
                        Ok(true) => return Ok(CheckOutcome::Satisfied(handles.clone())),
                        Ok(false) => {}
                        Err(DriverError::Stale(_)) => {
                            return Ok(CheckOutcome::Terminal(Failure::StaleTarget));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(CheckOutcome::NotYet)
            }
            Self::TextEquals(expected) => {
                for handle in &handles {
                    match driver.text(handle).await {
                        Ok(text) if text.trim() == expected => {
                            return Ok(CheckOutcome::Satisfied(handles.clone()));
                        }
                        Ok(_) => {}
                        Err(DriverError::Stale(_)) => {
                            return Ok(CheckOutcome::Terminal(Failure::StaleTarget));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(CheckOutcome::NotYet)
            }
            Self::TextContains(fragment) => {
                for handle in &handles {
                    match driver.text(handle).await {
                        Ok(text) if text.contains(fragment.as_str()) => {
                            return Ok(CheckOutcome::Satisfied(handles.clone()));
                        }
                        Ok(_) => {}
                        Err(DriverError::Stale(_)) => {
                            return Ok(CheckOutcome::Terminal(Failure::StaleTarget));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(CheckOutcome::NotYet)
            }
            Self::AttributeEquals { name, value } => {
                for handle in &handles {
                    match driver.attribute(handle, name).await {
                        Ok(Some(actual)) if actual == *value => {
                            return Ok(CheckOutcome::Satisfied(handles.clone()));
                        }
                        Ok(_) => {}
                        Err(DriverError::Stale(_)) => {
                            return Ok(CheckOutcome::Terminal(Failure::StaleTarget));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(CheckOutcome::NotYet)
            }
            Self::UrlContains(_) => unreachable!("handled above"),
        }
    }
}

/// Visible-and-enabled probe used by `Condition::Enabled`
async fn interactable(driver: &dyn Driver, handle: &Handle) -> DriverResult<bool> {
    Ok(driver.is_visible(handle).await? && driver.is_enabled(handle).await?)
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exists => write!(f, "exists"),
            Self::Visible => write!(f, "visible"),
            Self::Enabled => write!(f, "enabled"),
            Self::TextEquals(text) => write!(f, "text == {text:?}"),
            Self::TextContains(text) => write!(f, "text contains {text:?}"),
            Self::AttributeEquals { name, value } => {
                write!(f, "attribute {name} == {value:?}")
            }
            Self::UrlContains(fragment) => write!(f, "url contains {fragment:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_spec_rejects_zero_timeout() {
        let err = WaitSpec::new(Duration::ZERO, Duration::from_millis(10)).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn wait_spec_rejects_zero_interval() {
        let err = WaitSpec::new(Duration::from_secs(1), Duration::ZERO).unwrap_err();
        assert!(err.to_string().contains("interval"));
    }

    #[test]
    fn wait_spec_rejects_interval_beyond_timeout() {
        let err = WaitSpec::new(Duration::from_millis(50), Duration::from_millis(100)).unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn with_timeout_clamps_interval() {
        let spec = WaitSpec::default()
            .with_timeout(Duration::from_millis(20))
            .unwrap();
        assert_eq!(spec.timeout(), Duration::from_millis(20));
        assert_eq!(spec.interval(), Duration::from_millis(20));
    }

    #[test]
    fn condition_serde_round_trip() {
        let condition = Condition::AttributeEquals {
            name: "aria-expanded".to_string(),
            value: "true".to_string(),
        };
        let json = serde_json::to_string(&condition).unwrap();
        let back: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, condition);

        let url: Condition = serde_json::from_str(
            r#"{"check":"url-contains","value":"/dashboard"}"#,
        )
        .unwrap();
        assert_eq!(url, Condition::UrlContains("/dashboard".to_string()));
    }

    #[test]
    fn deserialization_enforces_timing_invariants() {
        let zero_interval = r#"{"timeout":{"secs":1,"nanos":0},"interval":{"secs":0,"nanos":0}}"#;
        let err = serde_json::from_str::<WaitSpec>(zero_interval).unwrap_err();
        assert!(err.to_string().contains("interval"));

        let inverted = r#"{"timeout":{"secs":1,"nanos":0},"interval":{"secs":2,"nanos":0}}"#;
        assert!(serde_json::from_str::<WaitSpec>(inverted).is_err());

        let json = serde_json::to_string(&WaitSpec::default()).unwrap();
        let back: WaitSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WaitSpec::default());
    }

    #[test]
    fn condition_display() {
        assert_eq!(Condition::Exists.to_string(), "exists");
        assert_eq!(
            Condition::UrlContains("/dashboard".to_string()).to_string(),
            "url contains \"/dashboard\""
        );
    }
}
