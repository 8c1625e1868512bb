//! Tests for notification click routing

use super::fixtures::{HostCall, MockHost, clicked, window};
use crate::click::{ClickOutcome, route_click};
use crate::config::AppConfig;
use dietmate_types::ClientQuery;

#[tokio::test]
async fn test_click_focuses_main_page() {
    let host = MockHost::new().with_clients(vec![
        window("settings", "https://dietmate.app/settings.html"),
        window("main", "https://dietmate.app/index.html"),
    ]);

    let outcome = route_click(&host, &AppConfig::default(), &clicked("n1"), None)
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Focused("main".to_string()));
    assert_eq!(host.focused(), vec!["main"]);
    assert!(host.opened().is_empty());
}

#[tokio::test]
async fn test_click_closes_notification_first() {
    let host = MockHost::new();
    route_click(&host, &AppConfig::default(), &clicked("n7"), None)
        .await
        .unwrap();

    let calls = host.calls();
    assert_eq!(calls[0], HostCall::Close("n7".to_string()));
    assert_eq!(calls[1], HostCall::MatchClients(ClientQuery::all_windows()));
}

#[tokio::test]
async fn test_click_first_match_wins() {
    let host = MockHost::new().with_clients(vec![
        window("a", "https://dietmate.app/index.html?tab=log"),
        window("b", "https://dietmate.app/index.html"),
    ]);

    let outcome = route_click(&host, &AppConfig::default(), &clicked("n1"), None)
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Focused("a".to_string()));
    assert_eq!(host.focused().len(), 1, "at most one focus call");
}

#[tokio::test]
async fn test_click_skips_unfocusable_clients() {
    let mut hidden = window("hidden", "https://dietmate.app/index.html");
    hidden.focusable = false;
    let host = MockHost::new().with_clients(vec![
        hidden,
        window("visible", "https://dietmate.app/index.html"),
    ]);

    let outcome = route_click(&host, &AppConfig::default(), &clicked("n1"), None)
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Focused("visible".to_string()));
}

#[tokio::test]
async fn test_click_opens_root_without_match() {
    let host = MockHost::new().with_clients(vec![window("x", "https://dietmate.app/about")]);

    let outcome = route_click(&host, &AppConfig::default(), &clicked("n1"), Some("open"))
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Opened("./".to_string()));
    assert_eq!(host.opened(), vec!["./"]);
    assert!(host.focused().is_empty());
}

#[tokio::test]
async fn test_click_swallowed_without_open_capability() {
    let host = MockHost::new().without_open_window();

    let outcome = route_click(&host, &AppConfig::default(), &clicked("n1"), None)
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Ignored);
    assert!(host.focused().is_empty());
    assert!(host.opened().is_empty());
}

#[tokio::test]
async fn test_click_uses_configured_marker_and_root() {
    let app = AppConfig {
        root_url: "/app/".to_string(),
        main_page_marker: "/app/home".to_string(),
    };
    let host = MockHost::new().with_clients(vec![window("m", "https://dietmate.app/index.html")]);

    let outcome = route_click(&host, &app, &clicked("n1"), None).await.unwrap();

    assert_eq!(outcome, ClickOutcome::Opened("/app/".to_string()));
}

#[tokio::test]
async fn test_click_close_failure_still_focuses() {
    let host = MockHost::new()
        .failing_close()
        .with_clients(vec![window("w1", "https://dietmate.app/index.html")]);

    let outcome = route_click(&host, &AppConfig::default(), &clicked("n1"), None)
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Focused("w1".to_string()));
    assert_eq!(host.calls()[0], HostCall::Close("n1".to_string()));
    assert_eq!(host.focused(), vec!["w1"]);
}

#[tokio::test]
async fn test_click_close_failure_still_opens_root() {
    let host = MockHost::new().failing_close();

    let outcome = route_click(&host, &AppConfig::default(), &clicked("n1"), None)
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Opened("./".to_string()));
    assert_eq!(host.opened(), vec!["./"]);
}

#[test]
fn test_click_outcome_display() {
    assert_eq!(ClickOutcome::Focused("c1".to_string()).to_string(), "focused c1");
    assert_eq!(ClickOutcome::Opened("./".to_string()).to_string(), "opened ./");
    assert_eq!(ClickOutcome::Ignored.to_string(), "ignored");
}
