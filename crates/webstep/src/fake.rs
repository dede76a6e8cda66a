// Fake driver - deterministic in-memory backend
//
// A scriptable page model implementing the `Driver` trait, so executor and
// scenario behavior can be tested offline with no browser. The model tracks
// every observation query it serves, which lets tests pin down exact poll
// counts and verify that cancellation short-circuits before the first query.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::driver::{Driver, DriverError, DriverResult, Handle};
use crate::locator::Locator;

/// What a click on an element does to the page model.
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// The reported page URL changes (e.g. a submit that navigates)
    SetUrl(String),
    /// A previously hidden element becomes visible
    Reveal(String),
    /// An element is detached, leaving outstanding handles stale
    Detach(String),
    /// An element's visible text changes
    SetText {
        /// Element id to update
        id: String,
        /// New text content
        text: String,
    },
}

/// One element in the fake page model.
///
/// Built with chained setters, inserted via `FakeDriver::insert`. An element
/// always matches `Locator::id(<its id>)`; further locator aliases are added
/// with `matched_by`.
#[derive(Debug, Clone)]
pub struct FakeElement {
    id: String,
    text: String,
    value: String,
    attributes: HashMap<String, String>,
    visible: bool,
    enabled: bool,
    attached: bool,
    matches: Vec<Locator>,
    available_after: usize,
}

impl FakeElement {
    /// Creates a visible, enabled, attached element with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            value: String::new(),
            attributes: HashMap::new(),
            visible: true,
            enabled: true,
            attached: true,
            matches: Vec::new(),
            available_after: 0,
        }
    }

    /// Sets the element's visible text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets an attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets visibility
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets whether the element accepts interaction
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds a locator alias this element answers to
    pub fn matched_by(mut self, locator: Locator) -> Self {
        self.matches.push(locator);
        self
    }

    /// Hides the element from the first `n` find queries against any of its
    /// locators, simulating content that appears asynchronously
    pub fn available_after(mut self, n: usize) -> Self {
        self.available_after = n;
        self
    }

    fn answers(&self, locator: &Locator) -> bool {
        *locator == Locator::id(&self.id) || self.matches.contains(locator)
    }
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    elements: Vec<FakeElement>,
    click_effects: HashMap<String, Vec<ClickEffect>>,
    find_counts: HashMap<Locator, usize>,
    queries: usize,
    closed: bool,
}

impl PageState {
    fn element(&self, handle: &Handle) -> DriverResult<&FakeElement> {
        self.elements
            .iter()
            .find(|e| e.id == handle.id() && e.attached)
            .ok_or_else(|| DriverError::Stale(handle.id().to_string()))
    }

    fn element_mut(&mut self, handle: &Handle) -> DriverResult<&mut FakeElement> {
        self.elements
            .iter_mut()
            .find(|e| e.id == handle.id() && e.attached)
            .ok_or_else(|| DriverError::Stale(handle.id().to_string()))
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::SessionClosed);
        }
        Ok(())
    }
}

/// Scriptable fake page behind a `Driver` implementation.
#[derive(Debug, Default)]
pub struct FakeDriver {
    state: Mutex<PageState>,
}

impl FakeDriver {
    /// Creates an empty page reporting the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(PageState {
                url: url.into(),
                ..PageState::default()
            }),
        }
    }

    /// Adds an element to the page
    pub fn insert(&self, element: FakeElement) {
        self.state.lock().elements.push(element);
    }

    /// Scripts an effect to apply when the element with `id` is clicked
    pub fn on_click(&self, id: impl Into<String>, effect: ClickEffect) {
        self.state
            .lock()
            .click_effects
            .entry(id.into())
            .or_default()
            .push(effect);
    }

    /// Detaches an element immediately (outstanding handles go stale)
    pub fn detach(&self, id: &str) {
        for element in &mut self.state.lock().elements {
            if element.id == id {
                element.attached = false;
            }
        }
    }

    /// Total observation queries served (find, reads, URL checks)
    pub fn query_count(&self) -> usize {
        self.state.lock().queries
    }

    /// Find queries served for one specific locator
    pub fn find_count(&self, locator: &Locator) -> usize {
        self.state
            .lock()
            .find_counts
            .get(locator)
            .copied()
            .unwrap_or(0)
    }

    /// The URL the page currently reports (for assertions)
    pub fn url(&self) -> String {
        self.state.lock().url.clone()
    }

    /// True once `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// The text typed into an element so far, for post-run assertions.
    /// Keeps working after `close`, unlike the `Driver` surface.
    pub fn value_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .elements
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.value.clone())
    }

    fn apply_effects(state: &mut PageState, id: &str) {
        let effects = state.click_effects.get(id).cloned().unwrap_or_default();
        for effect in effects {
            match effect {
                ClickEffect::SetUrl(url) => state.url = url,
                ClickEffect::Reveal(target) => {
                    for element in &mut state.elements {
                        if element.id == target {
                            element.visible = true;
                        }
                    }
                }
                ClickEffect::Detach(target) => {
                    for element in &mut state.elements {
                        if element.id == target {
                            element.attached = false;
                        }
                    }
                }
                ClickEffect::SetText { id: target, text } => {
                    for element in &mut state.elements {
                        if element.id == target {
                            element.text = text.clone();
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.url = url.to_string();
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> DriverResult<Vec<Handle>> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.queries += 1;
        let count = state.find_counts.entry(locator.clone()).or_insert(0);
        *count += 1;
        let seen = *count;
        Ok(state
            .elements
            .iter()
            .filter(|e| e.attached && e.answers(locator) && seen > e.available_after)
            .map(|e| Handle::new(e.id.as_str()))
            .collect())
    }

    async fn is_attached(&self, handle: &Handle) -> DriverResult<bool> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.queries += 1;
        Ok(state
            .elements
            .iter()
            .any(|e| e.id == handle.id() && e.attached))
    }

    async fn is_visible(&self, handle: &Handle) -> DriverResult<bool> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.queries += 1;
        Ok(state.element(handle)?.visible)
    }

    async fn is_enabled(&self, handle: &Handle) -> DriverResult<bool> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.queries += 1;
        Ok(state.element(handle)?.enabled)
    }

    async fn text(&self, handle: &Handle) -> DriverResult<String> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.queries += 1;
        Ok(state.element(handle)?.text.clone())
    }

    async fn attribute(&self, handle: &Handle, name: &str) -> DriverResult<Option<String>> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.queries += 1;
        let element = state.element(handle)?;
        if name == "value" {
            return Ok(Some(element.value.clone()));
        }
        Ok(element.attributes.get(name).cloned())
    }

    async fn type_text(&self, handle: &Handle, text: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        let element = state.element_mut(handle)?;
        if !element.visible || !element.enabled {
            return Err(DriverError::NotInteractable(handle.id().to_string()));
        }
        element.value.push_str(text);
        Ok(())
    }

    async fn click(&self, handle: &Handle) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        {
            let element = state.element(handle)?;
            if !element.visible || !element.enabled {
                return Err(DriverError::NotInteractable(handle.id().to_string()));
            }
        }
        let id = handle.id().to_string();
        Self::apply_effects(&mut state, &id);
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.queries += 1;
        Ok(state.url.clone())
    }

    async fn close(&self) -> DriverResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_matches_id_and_aliases() {
        let driver = FakeDriver::new("https://example.test/");
        driver.insert(
            FakeElement::new("email").matched_by(Locator::xpath("//input[@id='email']")),
        );

        let by_id = driver.find(&Locator::id("email")).await.unwrap();
        assert_eq!(by_id.len(), 1);

        let by_xpath = driver
            .find(&Locator::xpath("//input[@id='email']"))
            .await
            .unwrap();
        assert_eq!(by_xpath, by_id);

        let miss = driver.find(&Locator::css("#nope")).await.unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn available_after_hides_early_queries() {
        let driver = FakeDriver::new("https://example.test/");
        driver.insert(FakeElement::new("late").available_after(2));
        let locator = Locator::id("late");

        assert!(driver.find(&locator).await.unwrap().is_empty());
        assert!(driver.find(&locator).await.unwrap().is_empty());
        assert_eq!(driver.find(&locator).await.unwrap().len(), 1);
        assert_eq!(driver.find_count(&locator), 3);
    }

    #[tokio::test]
    async fn detached_element_reads_are_stale() {
        let driver = FakeDriver::new("https://example.test/");
        driver.insert(FakeElement::new("gone").text("bye"));
        let handle = driver.find(&Locator::id("gone")).await.unwrap().remove(0);

        driver.detach("gone");
        assert!(!driver.is_attached(&handle).await.unwrap());
        assert!(matches!(
            driver.text(&handle).await,
            Err(DriverError::Stale(_))
        ));
    }

    #[tokio::test]
    async fn click_applies_scripted_effects() {
        let driver = FakeDriver::new("https://example.test/");
        driver.insert(FakeElement::new("submit"));
        driver.insert(FakeElement::new("banner").visible(false));
        driver.on_click(
            "submit",
            ClickEffect::SetUrl("https://example.test/dashboard".to_string()),
        );
        driver.on_click("submit", ClickEffect::Reveal("banner".to_string()));

        let handle = driver.find(&Locator::id("submit")).await.unwrap().remove(0);
        driver.click(&handle).await.unwrap();

        assert_eq!(driver.url(), "https://example.test/dashboard");
        let banner = driver.find(&Locator::id("banner")).await.unwrap().remove(0);
        assert!(driver.is_visible(&banner).await.unwrap());
    }

    #[tokio::test]
    async fn disabled_element_rejects_interaction() {
        let driver = FakeDriver::new("https://example.test/");
        driver.insert(FakeElement::new("frozen").enabled(false));
        let handle = driver.find(&Locator::id("frozen")).await.unwrap().remove(0);

        assert!(matches!(
            driver.type_text(&handle, "x").await,
            Err(DriverError::NotInteractable(_))
        ));
        assert!(matches!(
            driver.click(&handle).await,
            Err(DriverError::NotInteractable(_))
        ));
    }

    #[tokio::test]
    async fn closed_driver_rejects_queries() {
        let driver = FakeDriver::new("https://example.test/");
        driver.close().await.unwrap();
        assert!(driver.is_closed());
        assert!(matches!(
            driver.current_url().await,
            Err(DriverError::SessionClosed)
        ));
        // close is idempotent
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn typed_text_lands_in_value() {
        let driver = FakeDriver::new("https://example.test/");
        driver.insert(FakeElement::new("name"));
        let handle = driver.find(&Locator::id("name")).await.unwrap().remove(0);

        driver.type_text(&handle, "Jo").await.unwrap();
        driver.type_text(&handle, "hn").await.unwrap();
        assert_eq!(
            driver.attribute(&handle, "value").await.unwrap(),
            Some("John".to_string())
        );
    }
}
