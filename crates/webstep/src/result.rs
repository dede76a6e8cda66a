// Action outcomes
//
// The tri-state result of a wait or act operation. Everything here is a
// value the caller is expected to branch on; only driver death escalates to
// `crate::Error`.

use serde::{Deserialize, Serialize};

use crate::driver::Handle;

/// Reason tag for a deterministic (non-timeout) failure.
///
/// All of these are recoverable at the caller's discretion: a `StaleTarget`
/// is fixed by re-resolving through `wait_until`, a `NotInteractable` by
/// waiting for a different condition, a `Cancelled` by not caring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Failure {
    /// The resolved handle is no longer backed by a live element
    ///
    /// Detected, not prevented: the live DOM is externally mutable and the
    /// element may have been detached or replaced since resolution.
    StaleTarget,
    /// The element exists but cannot accept the requested action
    /// (hidden, disabled, or otherwise non-interactable)
    NotInteractable,
    /// The caller's cancellation signal was observed
    Cancelled,
    /// The predicate reported a state that can never satisfy the condition
    Condition(String),
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleTarget => write!(f, "stale target"),
            Self::NotInteractable => write!(f, "element not interactable"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Condition(reason) => write!(f, "condition failed: {reason}"),
        }
    }
}

/// Outcome of a `wait_until`, `act`, or `wait_then_act` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// The condition was satisfied (and any requested action performed)
    Succeeded {
        /// Every element handle matching the locator at resolution time.
        /// Empty for operations that resolve no element (e.g. a URL check).
        handles: Vec<Handle>,
        /// Output of a read action (`ReadText`, `ReadAttribute`), if any
        value: Option<String>,
    },
    /// The predicate never succeeded within the wait budget
    TimedOut,
    /// A deterministic failure; see `Failure` for the reason taxonomy
    Failed(Failure),
}

impl ActionResult {
    /// Convenience constructor for a success with no read value
    pub fn succeeded(handles: Vec<Handle>) -> Self {
        Self::Succeeded {
            handles,
            value: None,
        }
    }

    /// Returns true if this result is `Succeeded`
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// First resolved handle, if this result carries any
    pub fn handle(&self) -> Option<&Handle> {
        match self {
            Self::Succeeded { handles, .. } => handles.first(),
            _ => None,
        }
    }

    /// Read-action output, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Succeeded { value, .. } => value.as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded { handles, .. } => {
                write!(f, "succeeded ({} handle(s))", handles.len())
            }
            Self::TimedOut => write!(f, "timed out"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_on_success() {
        let result = ActionResult::Succeeded {
            handles: vec![Handle::new("e1"), Handle::new("e2")],
            value: Some("hello".to_string()),
        };
        assert!(result.is_success());
        assert_eq!(result.handle().map(Handle::id), Some("e1"));
        assert_eq!(result.value(), Some("hello"));
    }

    #[test]
    fn accessors_on_failure() {
        let result = ActionResult::Failed(Failure::StaleTarget);
        assert!(!result.is_success());
        assert!(result.handle().is_none());
        assert!(result.value().is_none());
        assert_eq!(result.to_string(), "failed: stale target");
    }

    #[test]
    fn timed_out_display() {
        assert_eq!(ActionResult::TimedOut.to_string(), "timed out");
    }
}
