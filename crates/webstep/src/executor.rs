// Condition-polling action executor
//
// The polling state machine behind every wait/act call:
//
//   Polling -> { Succeeded -> Acting -> { Done, Failed } } | TimedOut | Failed
//
// Polling is entered once and never re-entered. The predicate is evaluated
// at least once even with an imminent deadline, the loop never sleeps past
// the deadline, and the evaluation at/after the deadline is authoritative.

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::driver::{Driver, DriverError, DriverResult, Handle};
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::result::{ActionResult, Failure};
use crate::session::Session;
use crate::wait::{CheckOutcome, Condition, Predicate, WaitSpec};

/// The interaction to perform against a resolved target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "payload")]
pub enum ActionKind {
    /// Send keystrokes to the element
    TypeText(String),
    /// Click the element
    Click,
    /// Read the element's visible text into the result value
    ReadText,
    /// Read the named attribute into the result value
    ReadAttribute(String),
    /// Navigate the page to the given URL (needs no resolved element)
    Navigate(String),
}

impl ActionKind {
    /// Whether this action requires a resolved element handle
    pub const fn needs_handle(&self) -> bool {
        !matches!(self, Self::Navigate(_))
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeText(_) => write!(f, "type-text"),
            Self::Click => write!(f, "click"),
            Self::ReadText => write!(f, "read-text"),
            Self::ReadAttribute(name) => write!(f, "read-attribute {name}"),
            Self::Navigate(url) => write!(f, "navigate {url}"),
        }
    }
}

/// Splits a driver error into a recoverable failure or a fatal crate error.
///
/// `Stale` and `NotInteractable` become ordinary `ActionResult::Failed`
/// values; a dead backend escalates.
fn fold_driver_error(e: DriverError) -> Result<Failure> {
    match e {
        DriverError::Stale(_) => Ok(Failure::StaleTarget),
        DriverError::NotInteractable(_) => Ok(Failure::NotInteractable),
        DriverError::SessionClosed => {
            Err(Error::DriverUnavailable("driver session closed".to_string()))
        }
        DriverError::Backend(reason) => Err(Error::DriverUnavailable(reason)),
    }
}

/// Adapts a (locator, condition) pair to the polling predicate interface
struct ConditionPredicate<'a> {
    locator: &'a Locator,
    condition: &'a Condition,
}

#[async_trait::async_trait]
impl Predicate for ConditionPredicate<'_> {
    async fn evaluate(&self, driver: &dyn Driver) -> DriverResult<CheckOutcome> {
        self.condition.check(driver, self.locator).await
    }

    fn describe(&self) -> String {
        format!("{} on {}", self.condition, self.locator)
    }
}

impl Session {
    /// Polls until `condition` holds for `locator`, a terminal failure is
    /// detected, or the wait budget elapses.
    ///
    /// Observes only; never mutates page state. Returns `Succeeded` with the
    /// resolved handle(s), `Failed` on a terminal predicate state, or
    /// `TimedOut` once the evaluation at/after the deadline has not
    /// succeeded.
    pub async fn wait_until(
        &self,
        locator: &Locator,
        spec: &WaitSpec,
        condition: &Condition,
    ) -> Result<ActionResult> {
        self.wait_until_cancellable(locator, spec, condition, &CancellationToken::new())
            .await
    }

    /// `wait_until` with an external cancellation signal.
    ///
    /// Cancellation is observed before the first driver query and between
    /// polls thereafter (within one interval), returning `Failed(Cancelled)`.
    /// The token is never checked mid-query, so no half-issued request is
    /// left behind.
    pub async fn wait_until_cancellable(
        &self,
        locator: &Locator,
        spec: &WaitSpec,
        condition: &Condition,
        cancel: &CancellationToken,
    ) -> Result<ActionResult> {
        self.poll(spec, &ConditionPredicate { locator, condition }, cancel)
            .await
    }

    /// Polls a caller-supplied predicate instead of a built-in `Condition`.
    ///
    /// Same cadence and cancellation contract as `wait_until`; the predicate
    /// carries its own locator knowledge (or none).
    pub async fn wait_until_with(
        &self,
        spec: &WaitSpec,
        predicate: &dyn Predicate,
        cancel: &CancellationToken,
    ) -> Result<ActionResult> {
        self.poll(spec, predicate, cancel).await
    }

    async fn poll(
        &self,
        spec: &WaitSpec,
        predicate: &dyn Predicate,
        cancel: &CancellationToken,
    ) -> Result<ActionResult> {
        let what = predicate.describe();
        let start = Instant::now();
        let deadline = start + spec.timeout();
        let mut polls: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                debug!(%what, polls, "wait cancelled");
                return Ok(ActionResult::Failed(Failure::Cancelled));
            }

            let driver = self.driver()?;
            polls += 1;
            trace!(%what, poll = polls, "evaluating condition");

            match predicate.evaluate(driver).await {
                Ok(CheckOutcome::Satisfied(handles)) => {
                    debug!(%what, polls, matches = handles.len(), "condition satisfied");
                    return Ok(ActionResult::succeeded(handles));
                }
                Ok(CheckOutcome::Terminal(failure)) => {
                    debug!(%what, polls, %failure, "condition terminally failed");
                    return Ok(ActionResult::Failed(failure));
                }
                Ok(CheckOutcome::NotYet) => {}
                Err(e) => {
                    let failure = fold_driver_error(e)?;
                    debug!(%what, polls, %failure, "driver reported failure");
                    return Ok(ActionResult::Failed(failure));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(%what, polls, elapsed = ?now.duration_since(start), "wait timed out");
                return Ok(ActionResult::TimedOut);
            }

            // Clamp the last tick so the final evaluation lands on the
            // deadline, never past it.
            let tick = spec.interval().min(deadline - now);
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(%what, polls, "wait cancelled");
                    return Ok(ActionResult::Failed(Failure::Cancelled));
                }
                () = sleep(tick) => {}
            }
        }
    }

    /// Navigates the page to the given URL.
    ///
    /// Convenience for `ActionKind::Navigate`, which needs no resolved
    /// element.
    pub async fn navigate(&self, url: &str) -> Result<ActionResult> {
        self.perform(None, &ActionKind::Navigate(url.to_string()))
            .await
    }

    /// Performs `action` against a previously resolved handle.
    ///
    /// The handle must come from a prior successful `wait_until` (or the
    /// caller accepts the stale-reference risk). A detached target yields
    /// `Failed(StaleTarget)`; a visibility/enabled violation yields
    /// `Failed(NotInteractable)`.
    pub async fn act(&self, handle: &Handle, action: &ActionKind) -> Result<ActionResult> {
        self.perform(Some(handle), action).await
    }

    /// Waits for the condition, then performs `action` on the first resolved
    /// handle.
    ///
    /// Equivalent to `wait_until` followed by `act` with the same arguments;
    /// this is the one pattern every caller script repeats, collapsed.
    pub async fn wait_then_act(
        &self,
        locator: &Locator,
        spec: &WaitSpec,
        condition: &Condition,
        action: &ActionKind,
    ) -> Result<ActionResult> {
        self.wait_then_act_cancellable(locator, spec, condition, action, &CancellationToken::new())
            .await
    }

    /// `wait_then_act` with an external cancellation signal.
    pub async fn wait_then_act_cancellable(
        &self,
        locator: &Locator,
        spec: &WaitSpec,
        condition: &Condition,
        action: &ActionKind,
        cancel: &CancellationToken,
    ) -> Result<ActionResult> {
        let resolved = self
            .wait_until_cancellable(locator, spec, condition, cancel)
            .await?;
        let ActionResult::Succeeded { handles, .. } = &resolved else {
            return Ok(resolved);
        };
        self.perform(handles.first(), action).await
    }

    /// Shared action dispatch for `act` and `wait_then_act`.
    async fn perform(&self, handle: Option<&Handle>, action: &ActionKind) -> Result<ActionResult> {
        let driver = self.driver()?;

        let handle = match (handle, action.needs_handle()) {
            (Some(h), _) => Some(h),
            (None, false) => None,
            (None, true) => {
                return Ok(ActionResult::Failed(Failure::Condition(format!(
                    "no element handle resolved for action {action}"
                ))));
            }
        };

        trace!(?handle, %action, "performing action");
        let outcome = match (action, handle) {
            (ActionKind::Navigate(url), _) => driver.navigate(url).await.map(|()| None),
            (ActionKind::Click, Some(h)) => driver.click(h).await.map(|()| None),
            (ActionKind::TypeText(text), Some(h)) => {
                driver.type_text(h, text).await.map(|()| None)
            }
            (ActionKind::ReadText, Some(h)) => driver.text(h).await.map(Some),
            (ActionKind::ReadAttribute(name), Some(h)) => driver.attribute(h, name).await,
            // needs_handle() rules the handle-less arms out above
            (_, None) => unreachable!("handle-requiring action without handle"),
        };

        match outcome {
            Ok(value) => Ok(ActionResult::Succeeded {
                handles: handle.cloned().into_iter().collect(),
                value,
            }),
            Err(e) => {
                let failure = fold_driver_error(e)?;
                debug!(?handle, %action, %failure, "action failed");
                Ok(ActionResult::Failed(failure))
            }
        }
    }
}
