//! Integration tests for the HTTP service.
//!
//! Serves the router on 127.0.0.1:0 against an in-process fake downstream
//! and talks to it with a real HTTP client.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use smoketest_core::SmokeTestConfig;
use smoketest_core::types::{TestProgress, TestStatus};
use smoketest_daemon::server::SmokeTestServer;

#[derive(Default)]
struct FakeDownstream {
    lookups: AtomicUsize,
}

async fn lookup(State(fake): State<Arc<FakeDownstream>>) -> &'static str {
    fake.lookups.fetch_add(1, Ordering::SeqCst);
    "{}"
}

async fn pong() -> &'static str {
    "pong"
}

async fn start_fake(fake: Arc<FakeDownstream>) -> String {
    let app = Router::new()
        .route("/health/ping", get(pong))
        .route("/lookup", get(lookup))
        .with_state(fake);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}

fn config_for(community_api: &str, prison_api: &str) -> SmokeTestConfig {
    SmokeTestConfig::parse(&format!(
        r#"
[general]
log_level = "debug"

[server]
bind_addr = "127.0.0.1:0"

[downstream.community-api]
base_url = "{community_api}"
timeout_secs = 2

[downstream.prison-api]
base_url = "{prison_api}"
timeout_secs = 2

[[profiles]]
name = "QUICK"
timeout_secs = 30

[[profiles.stages]]
name = "first lookup"
system = "community-api"
path = "/lookup"
interval_secs = 1
timeout_secs = 10

[[profiles.stages]]
name = "second lookup"
system = "community-api"
path = "/lookup"
interval_secs = 1
timeout_secs = 10
"#
    ))
    .unwrap()
}

struct RunningServer {
    base_url: String,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

async fn start_server(config: SmokeTestConfig) -> RunningServer {
    let server = SmokeTestServer::build_from_config(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(listener, async move {
        let _ = stopped.await;
    }));
    RunningServer {
        base_url,
        stop,
        handle,
    }
}

/// Collect the JSON payloads of every SSE `data:` line.
fn parse_events(body: &str) -> Vec<TestStatus> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

async fn run_profile(base_url: &str, profile: &str) -> (reqwest::StatusCode, Option<String>, Vec<TestStatus>) {
    let response = reqwest::Client::new()
        .post(format!(
            "{base_url}/smoke-test/prison-to-probation-update/{profile}"
        ))
        .send()
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await.unwrap();
    (status, content_type, parse_events(&body))
}

#[tokio::test]
async fn test_run_streams_statuses_until_success() {
    // Given: A downstream that answers every lookup with 200
    let fake = Arc::new(FakeDownstream::default());
    let base = start_fake(Arc::clone(&fake)).await;
    let server = start_server(config_for(&base, &base)).await;

    // When
    let (status, content_type, events) = run_profile(&server.base_url, "QUICK").await;

    // Then
    assert_eq!(status, reqwest::StatusCode::OK);
    assert!(
        content_type.is_some_and(|c| c.starts_with("text/event-stream")),
        "run endpoint should stream server-sent events"
    );
    assert_eq!(
        events,
        vec![
            TestStatus::incomplete("first lookup matched"),
            TestStatus::incomplete("second lookup matched"),
            TestStatus::success("test complete"),
        ]
    );
    assert_eq!(fake.lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unknown_profile_streams_single_failure() {
    let fake = Arc::new(FakeDownstream::default());
    let base = start_fake(Arc::clone(&fake)).await;
    let server = start_server(config_for(&base, &base)).await;

    let (status, _, events) = run_profile(&server.base_url, "PTPU_T9").await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(events, vec![TestStatus::fail("Unknown test profile PTPU_T9")]);
    assert_eq!(events[0].progress, TestProgress::Fail);
    assert_eq!(
        fake.lookups.load(Ordering::SeqCst),
        0,
        "unknown profile must not call downstream systems"
    );
}

#[tokio::test]
async fn test_profiles_lists_configured_names() {
    let base = start_fake(Arc::new(FakeDownstream::default())).await;
    let server = start_server(config_for(&base, &base)).await;

    let names: Vec<String> = reqwest::get(format!("{}/smoke-test/profiles", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(names, vec!["QUICK".to_owned()]);
}

#[tokio::test]
async fn test_health_is_ok_when_downstream_reachable() {
    let base = start_fake(Arc::new(FakeDownstream::default())).await;
    let server = start_server(config_for(&base, &base)).await;

    let response = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"]["status"], "healthy");
    assert_eq!(body["components"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_health_is_unavailable_when_downstream_down() {
    // Given: prison-api points at a closed port
    let base = start_fake(Arc::new(FakeDownstream::default())).await;
    let server = start_server(config_for(&base, &closed_port_url())).await;

    // When
    let response = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();

    // Then
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"]["status"], "unhealthy");
    let reason = body["status"]["reason"].as_str().unwrap_or_default();
    assert!(
        reason.contains("prison-api"),
        "reason should name the failing system: {reason}"
    );
}

#[tokio::test]
async fn test_shutdown_signal_stops_server() {
    let base = start_fake(Arc::new(FakeDownstream::default())).await;
    let server = start_server(config_for(&base, &base)).await;

    server.stop.send(()).unwrap();
    let result = server.handle.await.unwrap();

    assert!(result.is_ok(), "graceful shutdown failed: {:?}", result.err());
}

#[test]
fn test_build_rejects_invalid_config() {
    let mut config = SmokeTestConfig::default();
    config.server.bind_addr = "not-an-address".to_owned();

    let result = SmokeTestServer::build_from_config(config);

    assert!(result.is_err(), "invalid bind address should be rejected");
}
