// Locator - strategy-tagged element selector
//
// A locator identifies zero, one, or many elements in the live page. It is a
// plain value: resolution happens in the executor, not here, so locators can
// be built once and reused across polls and scenarios.

use serde::{Deserialize, Serialize};

/// Strategy tag for interpreting a selector string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Element id attribute
    #[serde(rename = "by-id")]
    Id,
    /// CSS selector
    #[serde(rename = "by-css")]
    Css,
    /// XPath expression
    #[serde(rename = "by-xpath")]
    XPath,
}

impl Strategy {
    /// Strategy name as it appears in serialized step lists
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "by-id",
            Self::Css => "by-css",
            Self::XPath => "by-xpath",
        }
    }
}

/// A way to find element(s) on the page at any given moment.
///
/// Locators are immutable once constructed and make no uniqueness claim:
/// resolving one may yield any number of matches. Callers that require a
/// single element inspect the resolved handle list.
///
/// # Examples
///
/// ```ignore
/// use webstep::Locator;
///
/// let email = Locator::id("email");
/// let submit = Locator::xpath("//button[@type='submit']");
/// let nav = Locator::css("nav .user-name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    /// Creates a locator with an explicit strategy
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    /// Creates an id locator
    pub fn id(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Id, selector)
    }

    /// Creates a CSS locator
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    /// Creates an XPath locator
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, selector)
    }

    /// Returns the strategy tag for this locator
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the selector string for this locator
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_strategy() {
        assert_eq!(Locator::id("email").strategy(), Strategy::Id);
        assert_eq!(Locator::css("#email").strategy(), Strategy::Css);
        assert_eq!(Locator::xpath("//input").strategy(), Strategy::XPath);
    }

    #[test]
    fn display_includes_strategy_tag() {
        let locator = Locator::xpath("//button[@type='submit']");
        assert_eq!(locator.to_string(), "by-xpath=//button[@type='submit']");
    }

    #[test]
    fn serde_round_trip() {
        let locator = Locator::css("nav .user-name");
        let json = serde_json::to_string(&locator).unwrap();
        assert!(json.contains("by-css"));
        let back: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, locator);
    }
}
