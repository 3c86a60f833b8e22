//! Integration tests for the HTTP related-entity fetcher.
//!
//! A wiremock server stands in for the related API so the tests can check
//! URL joining, bearer auth, 404 handling, retries and cancellation.

use helpdesk_expand::{
    ExpandConfig, Expander, ExpansionMap, ExpansionRequest, FetchError, FetcherConfig,
    HttpFetcher, RelatedFetcher, RetryConfig,
};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer, api_key: Option<&str>) -> HttpFetcher {
    let config = FetcherConfig {
        base_url: server.uri(),
        api_key: api_key.map(str::to_string),
        timeout_secs: 5,
        max_retries: 3,
    };
    HttpFetcher::new(config).unwrap().with_retry(RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        exponential_base: 2.0,
    })
}

#[tokio::test]
async fn test_fetch_related_entity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/u-1"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-1",
            "username": "ada"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher(&server, Some("test-key"))
        .fetch_related("/users/u-1", "t-1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result, Some(json!({"id": "u-1", "username": "ada"})));
}

#[tokio::test]
async fn test_not_found_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher(&server, None)
        .fetch_related("/users/ghost", "t-1", &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tickets/t-1/comments"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher(&server, None)
        .fetch_related("/tickets/t-1/comments", "t-1", &CancellationToken::new())
        .await;

    match result {
        Err(FetchError::Status { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "forbidden");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories/c-1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/categories/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher(&server, None)
        .fetch_related("/categories/c-1", "t-1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result, Some(json!({"id": "c-1"})));
}

#[tokio::test]
async fn test_invalid_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/uploads/f-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = fetcher(&server, None)
        .fetch_related("/uploads/f-1", "t-1", &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_cancelled_fetch_returns_promptly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "slow"}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = fetcher(&server, None)
        .fetch_related("/users/slow", "t-1", &cancel)
        .await;

    assert!(matches!(result, Err(FetchError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_expander_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tickets/t-1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "k-1", "authorId": "u-2", "body": "Have you tried turning it off?"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/u-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u-2"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/u-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let map = ExpansionMap::from_value(json!({
        "owner": {"route": "/users/{ownerId}"},
        "comments": {
            "route": "/tickets/{id}/comments",
            "expands": {"author": {"route": "/users/{authorId}"}}
        }
    }))
    .unwrap();
    let fetcher = fetcher(&server, None);
    let config = ExpandConfig::default();

    let ticket = json!({"id": "t-1", "ownerId": "u-1"});
    let expanded = Expander::new(&map, &fetcher, &config)
        .expand(
            ticket,
            &ExpansionRequest::parse("owner,comments.author"),
            &CancellationToken::new(),
        )
        .await;

    assert!(expanded.get("owner").is_none());
    assert_eq!(expanded["comments"][0]["author"]["id"], "u-2");
}
