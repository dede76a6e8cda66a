// Scenario runner - parameterized step lists over one session
//
// Every duplicated login script reduces to the same shape: navigate to a
// target URL, then run a sequence of (locator, wait, condition, action)
// steps, and report the final result plus the last observed URL. The runner
// owns nothing application-specific; endpoints, credentials, and locators
// are caller-supplied configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::driver::Driver;
use crate::error::Result;
use crate::executor::ActionKind;
use crate::locator::Locator;
use crate::result::ActionResult;
use crate::session::Session;
use crate::wait::{Condition, WaitSpec};

/// One wait-then-act step of a scenario.
///
/// Step lists are plain data and round-trip through JSON, so scenarios can
/// live in configuration rather than code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Target element(s) for this step
    pub locator: Locator,
    /// Wait budget and cadence
    #[serde(default)]
    pub wait: WaitSpec,
    /// Readiness predicate to poll for
    pub condition: Condition,
    /// Interaction to perform once the condition holds; `None` makes the
    /// step observe-only (wait, act on nothing)
    #[serde(default)]
    pub action: Option<ActionKind>,
}

impl ScenarioStep {
    /// Parses a step list from JSON
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A username/password pair supplied by the caller.
///
/// `Debug` redacts the password so credentials never leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account identifier typed into the username field
    pub username: String,
    /// Secret typed into the password field
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for the common login flow.
///
/// Whether success means "URL changed" or "this element shows this text"
/// varies per application; the caller picks via `success_condition` and
/// `success_locator` instead of the library guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFlow {
    /// Entry URL to navigate to first
    pub target_url: String,
    /// Locator for the username input
    pub username_field: Locator,
    /// Locator for the password input
    pub password_field: Locator,
    /// Locator for the submit control
    pub submit_control: Locator,
    /// Element the success condition is evaluated against
    pub success_locator: Locator,
    /// Post-login readiness predicate (URL fragment, DOM text, ...)
    pub success_condition: Condition,
    /// Wait budget applied to every step of the flow
    #[serde(default)]
    pub wait: WaitSpec,
}

impl LoginFlow {
    /// Expands this flow into its step list
    pub fn steps(&self, credentials: &Credentials) -> Vec<ScenarioStep> {
        vec![
            ScenarioStep {
                locator: self.username_field.clone(),
                wait: self.wait,
                condition: Condition::Visible,
                action: Some(ActionKind::TypeText(credentials.username.clone())),
            },
            ScenarioStep {
                locator: self.password_field.clone(),
                wait: self.wait,
                condition: Condition::Visible,
                action: Some(ActionKind::TypeText(credentials.password.clone())),
            },
            ScenarioStep {
                locator: self.submit_control.clone(),
                wait: self.wait,
                condition: Condition::Enabled,
                action: Some(ActionKind::Click),
            },
            // A URL check resolves no element, so there is nothing to read
            // back; element-based success conditions echo the matched text
            // the way the original assertions did.
            ScenarioStep {
                locator: self.success_locator.clone(),
                wait: self.wait,
                condition: self.success_condition.clone(),
                action: match self.success_condition {
                    Condition::UrlContains(_) => None,
                    _ => Some(ActionKind::ReadText),
                },
            },
        ]
    }
}

/// Final result of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Result of the last step that executed
    pub result: ActionResult,
    /// URL the page reported when the scenario ended
    pub final_url: String,
}

/// Runs a step list against an existing session.
///
/// Navigates to `target_url` first, then executes steps in order, stopping
/// at the first step that does not succeed. The outcome carries that step's
/// result and the last observed URL. Session teardown stays with the caller.
pub async fn run_steps(
    session: &Session,
    target_url: &str,
    steps: &[ScenarioStep],
    cancel: &CancellationToken,
) -> Result<ScenarioOutcome> {
    info!(target_url, step_count = steps.len(), "starting scenario");

    let mut last = if cancel.is_cancelled() {
        ActionResult::Failed(crate::result::Failure::Cancelled)
    } else {
        session.navigate(target_url).await?
    };

    if last.is_success() {
        for (index, step) in steps.iter().enumerate() {
            debug!(step = index, locator = %step.locator, condition = %step.condition, "running step");
            last = match &step.action {
                Some(action) => {
                    session
                        .wait_then_act_cancellable(
                            &step.locator,
                            &step.wait,
                            &step.condition,
                            action,
                            cancel,
                        )
                        .await?
                }
                None => {
                    session
                        .wait_until_cancellable(&step.locator, &step.wait, &step.condition, cancel)
                        .await?
                }
            };
            if !last.is_success() {
                warn!(step = index, locator = %step.locator, result = %last, "step did not succeed");
                break;
            }
        }
    }

    let final_url = match session.driver() {
        Ok(driver) => driver.current_url().await.unwrap_or_default(),
        Err(_) => String::new(),
    };
    info!(result = %last, %final_url, "scenario finished");
    Ok(ScenarioOutcome {
        result: last,
        final_url,
    })
}

/// Runs the login flow with scoped session teardown.
///
/// Creates the session, runs the expanded step list, and closes the session
/// on every exit path, matching the acquire/release discipline the flow's
/// callers rely on. Errors from the run take precedence over errors from the
/// teardown.
pub async fn run_login(
    driver: Arc<dyn Driver>,
    flow: &LoginFlow,
    credentials: &Credentials,
) -> Result<ScenarioOutcome> {
    run_login_cancellable(driver, flow, credentials, &CancellationToken::new()).await
}

/// `run_login` with an external cancellation signal.
pub async fn run_login_cancellable(
    driver: Arc<dyn Driver>,
    flow: &LoginFlow,
    credentials: &Credentials,
    cancel: &CancellationToken,
) -> Result<ScenarioOutcome> {
    let session = Session::new(driver);
    let steps = flow.steps(credentials);
    let outcome = run_steps(&session, &flow.target_url, &steps, cancel).await;
    let teardown = session.close().await;
    match (outcome, teardown) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(outcome), Err(teardown_err)) => {
            warn!(error = %teardown_err, "session teardown failed after successful run");
            Ok(outcome)
        }
        (Err(run_err), _) => Err(run_err),
    }
}
