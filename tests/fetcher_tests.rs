use link_preview_card::{
    Fetcher, FetcherConfig, MetadataSource, PreviewError, PreviewFetcher, PreviewState,
};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> Fetcher {
    Fetcher::try_new_with_config(FetcherConfig {
        endpoint: format!("{}/api/metadata", server.uri()),
        timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .expect("valid fetcher config")
}

#[tokio::test]
async fn test_fetch_sends_encoded_target_and_reads_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metadata"))
        .and(query_param("q", "https://example.com/page?id=1&lang=en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": {
                "og:title": "Example",
                "og:description": "An example page",
                "og:image": "https://example.com/cover.png",
                "twitter:card": "summary"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = fetcher_for(&server)
        .lookup("https://example.com/page?id=1&lang=en")
        .await
        .expect("lookup succeeds");

    assert_eq!(metadata.og_title(), Some("Example"));
    assert_eq!(metadata.og_description(), Some("An example page"));
    assert_eq!(metadata.og_image(), Some("https://example.com/cover.png"));
    assert_eq!(metadata.get("twitter:card"), Some("summary"));
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metadata"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = fetcher_for(&server).fetch("https://example.com").await;
    assert_eq!(result, Err(PreviewError::HttpError { status: 500 }));
}

#[tokio::test]
async fn test_missing_data_degrades_to_empty_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .mount(&server)
        .await;

    let metadata = fetcher_for(&server)
        .fetch("https://example.com")
        .await
        .expect("lookup succeeds");
    assert!(metadata.is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let result = fetcher_for(&server).fetch("https://example.com").await;
    assert!(matches!(result, Err(PreviewError::DecodeError(_))));
}

#[tokio::test]
async fn test_slow_service_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let fetcher = Fetcher::try_new_with_config(FetcherConfig {
        endpoint: server.uri(),
        timeout: Duration::from_millis(200),
        ..Default::default()
    })
    .unwrap();

    let result = fetcher.fetch("https://example.com").await;
    assert!(matches!(result, Err(PreviewError::NetworkError(_))));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let fetcher = Fetcher::try_new_with_config(FetcherConfig {
        endpoint: "http://127.0.0.1:1/metadata".to_string(),
        ..Default::default()
    })
    .unwrap();

    let result = fetcher.fetch("https://example.com").await;
    assert!(matches!(result, Err(PreviewError::NetworkError(_))));
}

#[tokio::test]
async fn test_preview_fetcher_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "https://good.example"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "og:title": "Good" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "https://bad.example"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = PreviewFetcher::new(fetcher_for(&server));

    fetcher.set_target("https://good.example");
    let state = fetcher.settled().await;
    assert_eq!(state.metadata().and_then(|m| m.og_title()), Some("Good"));

    let card = fetcher.render();
    let card = card.card().unwrap();
    assert_eq!(card.description, "No description available");
    assert!(card.image.is_none());

    fetcher.set_target("https://bad.example");
    assert_eq!(fetcher.settled().await, PreviewState::Failed);
}
