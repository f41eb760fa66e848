//! # End-to-End Browsing
//!
//! Serves the real router on a loopback port and drives it with the HTTP
//! content fetcher, the way a browser session would.

use std::net::SocketAddr;

use handbook_api::state::{AppConfig, AppState};
use handbook_client::{
    ClientConfig, Displayed, HttpContentSource, LoadOutcome, Navigator, PageUrl, Sidebar,
    ERROR_NOTICE,
};
use handbook_core::{HandbookSeed, PolicyId};

const FIXTURE: &str = include_str!("../fixtures/handbook.yaml");

async fn spawn_server() -> SocketAddr {
    let handbook = HandbookSeed::from_yaml(FIXTURE)
        .expect("fixture parses")
        .into_handbook()
        .expect("fixture is consistent");
    let state = AppState::with_config(AppConfig::default(), handbook, None);
    let app = handbook_api::app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.expect("serve");
    });
    addr
}

async fn navigator(addr: SocketAddr, query: &str) -> Navigator<HttpContentSource> {
    let config = ClientConfig::new(&format!("http://{addr}")).expect("config");
    let source = HttpContentSource::new(&config).expect("client");
    let navigation = source.fetch_navigation().await.expect("navigation");
    let page = PageUrl::parse(&format!("http://{addr}/handbook/sections/{query}")).expect("page url");
    Navigator::new(source, Sidebar::from_navigation(&navigation), page)
}

fn id(raw: u64) -> PolicyId {
    PolicyId::new(raw).unwrap()
}

#[tokio::test]
async fn sidebar_lists_published_policies_only() {
    let addr = spawn_server().await;
    let state = navigator(addr, "").await.snapshot();
    let labels: Vec<_> = state.sidebar.entries().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Introduction", "1.1 Hiring", "2.1 Remote Work"]);
    assert_eq!(state.sidebar.sections().len(), 2);
}

#[tokio::test]
async fn deep_link_then_related_click() {
    let addr = spawn_server().await;
    let nav = navigator(addr, "?policy=42").await;

    assert_eq!(nav.attach().await, LoadOutcome::Applied);
    let state = nav.snapshot();
    assert!(state.display.markup().contains("2.1 Remote Work"));
    assert_eq!(state.page_url.replacements(), 0);
    assert_eq!(state.sidebar.active_policy(), Some(id(42)));
    // 42 relates to 7 and the draft 8; only 7 is offered.
    let related: Vec<_> = state.display.triggers().iter().map(|t| t.url.as_str()).collect();
    assert_eq!(related, vec!["/handbook/policy/7/content/"]);

    assert_eq!(nav.activate_related(0).await, Ok(LoadOutcome::Applied));
    let state = nav.snapshot();
    assert!(state.display.markup().contains("1.1 Hiring"));
    assert!(state.display.markup().contains("Human Resources"));
    assert_eq!(state.page_url.policy_id(), Some(id(7)));
    assert_eq!(state.sidebar.active_policy(), Some(id(7)));
    assert_eq!(state.sidebar.expanded_sections(), vec![0, 1]);
    assert_eq!(state.display.triggers()[0].url, "/handbook/policy/42/content/");
}

#[tokio::test]
async fn introduction_on_plain_page_load() {
    let addr = spawn_server().await;
    let nav = navigator(addr, "").await;

    assert_eq!(nav.attach().await, LoadOutcome::Applied);
    let state = nav.snapshot();
    assert_eq!(state.display.displayed(), &Displayed::Introduction);
    assert!(state.display.markup().contains("Employee Handbook"));
    assert_eq!(state.page_url.raw_policy(), None);
}

#[tokio::test]
async fn returning_to_introduction_clears_query() {
    let addr = spawn_server().await;
    let nav = navigator(addr, "?policy=7").await;
    nav.attach().await;

    assert_eq!(nav.activate_entry(0).await, Ok(LoadOutcome::Applied));
    let state = nav.snapshot();
    assert_eq!(state.page_url.as_str(), format!("http://{addr}/handbook/sections/"));
    assert_eq!(state.sidebar.active_policy(), None);
}

#[tokio::test]
async fn unpublished_and_unknown_policies_show_notice() {
    let addr = spawn_server().await;
    let nav = navigator(addr, "").await;
    nav.attach().await;

    for url in ["/handbook/policy/8/content/", "/handbook/policy/999/content/"] {
        assert_eq!(nav.load_policy_details(url, true).await, LoadOutcome::Failed);
        let state = nav.snapshot();
        assert_eq!(state.display.markup(), ERROR_NOTICE);
        assert_eq!(state.page_url.raw_policy(), None);
    }
}

#[tokio::test]
async fn feedback_round_trip() {
    let addr = spawn_server().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/handbook/policy/2.1/feedback"))
        .json(&serde_json::json!({
            "first_name": "Grace",
            "last_name": "Hopper",
            "email": "grace@example.com",
            "question": "Does remote work include travel?"
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(body["policy_title"], "Remote Work");
}
