//! Tests for the HTTP fetch module

use super::*;
use crate::error::Error;
use crate::types::ResponseFormat;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> FetchClientConfig {
    FetchClientConfig::builder()
        .base_url(format!("{}/api/v4/", server.uri()))
        .access_token("test-token")
        .backoff(Duration::from_millis(1), Duration::from_millis(10))
        .build()
}

/// Requester that fails with the given error a number of times, then succeeds
struct ScriptedRequester {
    failures: u32,
    make_error: fn() -> Error,
    calls: Arc<AtomicU32>,
    called_at: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

impl ScriptedRequester {
    fn new(failures: u32, make_error: fn() -> Error) -> Self {
        Self {
            failures,
            make_error,
            calls: Arc::new(AtomicU32::new(0)),
            called_at: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait::async_trait]
impl PerformRequest for ScriptedRequester {
    async fn perform(&self, request: &ApiRequest) -> crate::error::Result<ApiResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.called_at
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());
        if call < self.failures {
            return Err((self.make_error)());
        }
        Ok(ApiResponse {
            status: 200,
            url: request.url.to_string(),
            body: bytes::Bytes::from_static(br#"{"data": []}"#),
        })
    }
}

fn server_error() -> Error {
    Error::from_status(503, "http://test/", "unavailable")
}

fn not_found() -> Error {
    Error::from_status(404, "http://test/", "missing")
}

fn request() -> ApiRequest {
    ApiRequest::new(url::Url::parse("http://test/tasks").unwrap())
}

#[test]
fn test_fetch_client_config_builder() {
    let config = FetchClientConfig::builder()
        .base_url("https://example.com/api/v4/")
        .access_token("token")
        .timeout(Duration::from_secs(10))
        .max_attempts(3)
        .backoff(Duration::from_millis(200), Duration::from_secs(30))
        .rate_limit(RateLimiterConfig::new(10, Duration::from_secs(1)))
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, "https://example.com/api/v4/");
    assert_eq!(config.timeout, Duration::from_secs(10));
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.retry.max_backoff, Duration::from_secs(30));
    assert_eq!(config.rate_limit.max_requests, 10);
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_missing_token_fails_before_any_request() {
    let config = FetchClientConfig::builder()
        .base_url("http://127.0.0.1:9/")
        .build();
    let err = FetchClient::new(config).unwrap_err();
    assert!(matches!(err, Error::AuthConfigMissing));
}

#[test]
fn test_resolve_relative_and_absolute() {
    let client = FetchClient::with_requester(
        "https://www.wrike.com/api/v4",
        ScriptedRequester::new(0, server_error),
    )
    .unwrap();

    let url = client.resolve("tasks", &[]).unwrap();
    assert_eq!(url.as_str(), "https://www.wrike.com/api/v4/tasks");

    let url = client
        .resolve(
            "tasks",
            &[
                ("pageSize".to_string(), "100".to_string()),
                ("nextPageToken".to_string(), "AB CD".to_string()),
            ],
        )
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.wrike.com/api/v4/tasks?pageSize=100&nextPageToken=AB+CD"
    );

    let url = client
        .resolve("https://export.example.com/tasks.csv", &[])
        .unwrap();
    assert_eq!(url.as_str(), "https://export.example.com/tasks.csv");
}

#[tokio::test]
async fn test_fetch_json_sends_wrike_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/tasks"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "tasks",
            "data": [{"id": "IEAAAAAA", "title": "Demo"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(test_config(&mock_server)).unwrap();
    let body = client.fetch_json("tasks", &[]).await.unwrap();

    assert_eq!(body["data"][0]["title"], "Demo");
}

#[tokio::test]
async fn test_fetch_with_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/tasks"))
        .and(query_param("pageSize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(test_config(&mock_server)).unwrap();
    let fetched = client
        .fetch(
            "tasks",
            &[("pageSize".to_string(), "2".to_string())],
            ResponseFormat::Json,
        )
        .await
        .unwrap();

    assert!(matches!(fetched, Fetched::Json(_)));
}

#[tokio::test]
async fn test_fetch_csv_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exports/tasks.csv"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("id,title\n1,First\n2,\"Second, quoted\"\n"),
        )
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(test_config(&mock_server)).unwrap();
    let rows = client
        .fetch_csv(&format!("{}/exports/tasks.csv", mock_server.uri()), &[])
        .await
        .unwrap();

    let rows: Vec<_> = rows.collect::<crate::error::Result<_>>().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["title"], "Second, quoted");
}

#[tokio::test]
async fn test_404_is_attempted_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(test_config(&mock_server)).unwrap();
    let err = client.fetch_json("missing", &[]).await.unwrap_err();

    assert!(matches!(err, Error::ClientError { status: 404, .. }));
}

#[tokio::test]
async fn test_500_uses_full_attempt_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/always-fail"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(test_config(&mock_server)).unwrap();
    let err = client.fetch_json("always-fail", &[]).await.unwrap_err();

    assert!(matches!(err, Error::TransientNetworkFailure { attempts: 5, .. }));
}

#[tokio::test]
async fn test_retry_recovers_after_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v4/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": [1]})))
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(test_config(&mock_server)).unwrap();
    let body = client.fetch_json("flaky", &[]).await.unwrap();
    assert_eq!(body["data"][0], 1);
}

#[tokio::test]
async fn test_timeouts_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = FetchClientConfig::builder()
        .base_url(format!("{}/api/v4/", mock_server.uri()))
        .access_token("test-token")
        .timeout(Duration::from_millis(50))
        .max_attempts(3)
        .backoff(Duration::from_millis(1), Duration::from_millis(5))
        .build();

    let client = FetchClient::new(config).unwrap();
    let err = client.fetch_json("slow", &[]).await.unwrap_err();
    assert!(matches!(err, Error::TransientNetworkFailure { attempts: 3, .. }));
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(test_config(&mock_server)).unwrap();
    let err = client.fetch_json("broken", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_delays_double_between_attempts() {
    let scripted = ScriptedRequester::new(u32::MAX, server_error);
    let calls = scripted.calls.clone();
    let called_at = scripted.called_at.clone();

    let requester = RetryingRequester::new(scripted, RetryPolicy::default());
    let err = requester.perform(&request()).await.unwrap_err();

    assert!(matches!(err, Error::TransientNetworkFailure { attempts: 5, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 5);

    let times = called_at.lock().unwrap().clone();
    let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
            Duration::from_secs(16),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_client_error_gives_up_immediately() {
    let scripted = ScriptedRequester::new(u32::MAX, not_found);
    let calls = scripted.calls.clone();

    let requester = RetryingRequester::new(scripted, RetryPolicy::default());
    let err = requester.perform(&request()).await.unwrap_err();

    assert!(matches!(err, Error::ClientError { status: 404, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retries_pass_through_rate_limiter() {
    let scripted = ScriptedRequester::new(2, server_error);
    let called_at = scripted.called_at.clone();

    let limiter = RateLimiter::new(&RateLimiterConfig::new(2, Duration::from_secs(30)));
    let requester = RetryingRequester::new(
        RateLimitedRequester::new(scripted, limiter),
        RetryPolicy::new(5, Duration::from_millis(100), Duration::from_secs(1)),
    );

    let response = requester.perform(&request()).await.unwrap();
    assert_eq!(response.status, 200);

    // The third attempt has to wait for the two-request window to roll over
    let times = called_at.lock().unwrap().clone();
    assert_eq!(times.len(), 3);
    assert!(times[2] - times[0] >= Duration::from_secs(30));
}

#[test]
fn test_fetch_client_debug() {
    let client =
        FetchClient::with_requester("https://www.wrike.com/api/v4/", ScriptedRequester::new(0, server_error))
            .unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("FetchClient"));
    assert!(debug_str.contains("wrike.com"));
}
