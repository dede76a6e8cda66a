// Integration tests for act() and the wait_then_act composition

mod common;

use std::sync::Arc;
use std::time::Duration;

use webstep::fake::{ClickEffect, FakeDriver, FakeElement};
use webstep::{
    ActionKind, ActionResult, Condition, Failure, Locator, Session, WaitSpec,
};

fn quick_wait() -> WaitSpec {
    WaitSpec::new(Duration::from_millis(500), Duration::from_millis(50)).expect("valid wait spec")
}

#[tokio::test]
async fn act_on_detached_handle_reports_stale_target() {
    common::init_tracing();
    let driver = Arc::new(FakeDriver::new("https://example.test/"));
    driver.insert(FakeElement::new("button"));
    let session = Session::new(driver.clone());

    let resolved = session
        .wait_until(&Locator::id("button"), &quick_wait(), &Condition::Exists)
        .await
        .unwrap();
    let handle = resolved.handle().cloned().expect("handle resolved");

    // The page mutates between resolution and action.
    driver.detach("button");

    let result = session.act(&handle, &ActionKind::Click).await.unwrap();
    assert_eq!(result, ActionResult::Failed(Failure::StaleTarget));
}

#[tokio::test]
async fn act_on_disabled_element_reports_not_interactable() {
    common::init_tracing();
    let driver = Arc::new(FakeDriver::new("https://example.test/"));
    driver.insert(FakeElement::new("field").enabled(false));
    let session = Session::new(driver.clone());

    let resolved = session
        .wait_until(&Locator::id("field"), &quick_wait(), &Condition::Exists)
        .await
        .unwrap();
    let handle = resolved.handle().cloned().unwrap();

    let result = session
        .act(&handle, &ActionKind::TypeText("hello".to_string()))
        .await
        .unwrap();
    assert_eq!(result, ActionResult::Failed(Failure::NotInteractable));
}

#[tokio::test]
async fn read_actions_return_their_value() {
    common::init_tracing();
    let driver = Arc::new(FakeDriver::new("https://example.test/"));
    driver.insert(
        FakeElement::new("greeting")
            .text("Welcome back")
            .attribute("data-user", "piyush"),
    );
    let session = Session::new(driver.clone());

    let resolved = session
        .wait_until(&Locator::id("greeting"), &quick_wait(), &Condition::Visible)
        .await
        .unwrap();
    let handle = resolved.handle().cloned().unwrap();

    let text = session.act(&handle, &ActionKind::ReadText).await.unwrap();
    assert_eq!(text.value(), Some("Welcome back"));

    let attr = session
        .act(&handle, &ActionKind::ReadAttribute("data-user".to_string()))
        .await
        .unwrap();
    assert_eq!(attr.value(), Some("piyush"));

    // Absent attribute is a success with no value, not an error.
    let missing = session
        .act(&handle, &ActionKind::ReadAttribute("data-none".to_string()))
        .await
        .unwrap();
    assert!(missing.is_success());
    assert_eq!(missing.value(), None);
}

#[tokio::test]
async fn wait_then_act_matches_wait_until_followed_by_act() {
    common::init_tracing();

    // Two identically scripted pages, one per path.
    let build = || {
        let driver = Arc::new(FakeDriver::new("https://example.test/"));
        driver.insert(FakeElement::new("save").text("Save"));
        driver.on_click(
            "save",
            ClickEffect::SetUrl("https://example.test/saved".to_string()),
        );
        driver
    };

    let composed_driver = build();
    let composed_session = Session::new(composed_driver.clone());
    let composed = composed_session
        .wait_then_act(
            &Locator::id("save"),
            &quick_wait(),
            &Condition::Enabled,
            &ActionKind::Click,
        )
        .await
        .unwrap();

    let manual_driver = build();
    let manual_session = Session::new(manual_driver.clone());
    let resolved = manual_session
        .wait_until(&Locator::id("save"), &quick_wait(), &Condition::Enabled)
        .await
        .unwrap();
    let manual = manual_session
        .act(resolved.handle().unwrap(), &ActionKind::Click)
        .await
        .unwrap();

    assert_eq!(composed, manual);
    assert_eq!(composed_driver.url(), manual_driver.url());
    assert_eq!(composed_driver.url(), "https://example.test/saved");
}

#[tokio::test]
async fn wait_then_act_propagates_wait_failures_without_acting() {
    common::init_tracing();
    let driver = Arc::new(FakeDriver::new("https://example.test/"));
    let session = Session::new(driver.clone());

    let wait = WaitSpec::new(Duration::from_millis(100), Duration::from_millis(50)).unwrap();
    let result = session
        .wait_then_act(
            &Locator::id("never"),
            &wait,
            &Condition::Exists,
            &ActionKind::Click,
        )
        .await
        .unwrap();

    assert_eq!(result, ActionResult::TimedOut);
    assert_eq!(driver.url(), "https://example.test/", "no action performed");
}

#[tokio::test]
async fn navigate_needs_no_resolved_handle() {
    common::init_tracing();
    let driver = Arc::new(FakeDriver::new("about:blank"));
    let session = Session::new(driver.clone());

    let result = session.navigate("https://example.test/").await.unwrap();
    assert!(result.is_success());
    assert!(result.handle().is_none());
    assert_eq!(driver.url(), "https://example.test/");
}

#[tokio::test]
async fn handle_requiring_action_with_no_resolved_element_fails() {
    common::init_tracing();
    let driver = Arc::new(FakeDriver::new("https://example.test/dashboard"));
    let session = Session::new(driver.clone());

    // UrlContains resolves zero handles; Click then has nothing to act on.
    let result = session
        .wait_then_act(
            &Locator::id("anything"),
            &quick_wait(),
            &Condition::UrlContains("/dashboard".to_string()),
            &ActionKind::Click,
        )
        .await
        .unwrap();

    assert!(matches!(result, ActionResult::Failed(Failure::Condition(_))));
}
