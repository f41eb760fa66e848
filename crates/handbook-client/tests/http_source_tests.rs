//! # Integration Tests for the HTTP Content Source
//!
//! Runs [`HttpContentSource`] against wiremock servers to check request
//! paths, envelope validation and error mapping without a real handbook
//! server.

use handbook_client::{
    ClientConfig, ContentSource, FetchError, HttpContentSource, LoadOutcome, Navigator, PageUrl,
    Sidebar, ERROR_NOTICE,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> HttpContentSource {
    let config = ClientConfig::new(&server.uri()).expect("valid base url");
    HttpContentSource::new(&config).expect("client build")
}

#[tokio::test]
async fn introduction_body_is_returned_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/handbook/introduction/content/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Handbook</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let markup = source(&server).fetch_introduction().await.expect("introduction");
    assert_eq!(markup, "<h1>Handbook</h1>");
}

#[tokio::test]
async fn policy_envelope_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/handbook/policy/42/content/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": "<article>Remote Work</article>"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = source(&server)
        .fetch_policy("/handbook/policy/42/content/")
        .await
        .expect("policy");
    assert_eq!(envelope.content, "<article>Remote Work</article>");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/handbook/policy/9/content/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_policy("/handbook/policy/9/content/")
        .await
        .unwrap_err();
    match err {
        FetchError::Status { status, reason, url } => {
            assert_eq!(status, 500);
            assert_eq!(reason, "Internal Server Error");
            assert!(url.ends_with("/handbook/policy/9/content/"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn envelope_without_string_content_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/handbook/policy/7/content/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": 7})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/handbook/policy/8/content/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>not json</p>"))
        .mount(&server)
        .await;

    let source = source(&server);
    for url in ["/handbook/policy/7/content/", "/handbook/policy/8/content/"] {
        let err = source.fetch_policy(url).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedEnvelope { .. }), "{url}: {err:?}");
    }
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let config = ClientConfig::new(&format!("http://{addr}")).unwrap().with_timeout(5);
    let source = HttpContentSource::new(&config).unwrap();

    let err = source.fetch_introduction().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }), "{err:?}");
}

#[tokio::test]
async fn navigation_document_builds_sidebar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/handbook/navigation/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "introduction": {"href": "/handbook/introduction/content/"},
            "sections": [{"number": "1.0", "title": "Employment", "policies": [
                {"id": 7, "number": "1.1", "title": "Hiring", "href": "/handbook/policy/7/content/"}
            ]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let doc = source(&server).fetch_navigation().await.expect("navigation");
    let sidebar = Sidebar::from_navigation(&doc);
    assert_eq!(sidebar.entries().len(), 2);
    assert_eq!(sidebar.entries()[1].label, "1.1 Hiring");
}

#[tokio::test]
async fn navigator_shows_notice_on_http_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/handbook/policy/42/content/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let page = PageUrl::parse(&format!("{}/handbook/sections/?policy=42", server.uri())).unwrap();
    let navigator = Navigator::new(source(&server), Sidebar::default(), page);

    assert_eq!(navigator.attach().await, LoadOutcome::Failed);
    let state = navigator.snapshot();
    assert_eq!(state.display.markup(), ERROR_NOTICE);
    assert_eq!(state.page_url.replacements(), 0);
}
