//! HTTP 프로브 통합 테스트
//!
//! 127.0.0.1:0에 띄운 axum 가짜 다운스트림(커뮤니티 API + 토큰 발급자)에 대해
//! 실제 reqwest 클라이언트로 프로파일을 실행합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures::StreamExt;
use reqwest::Method;
use serde_json::json;

use smoketest_core::config::{DownstreamConfig, SmokeTestConfig};
use smoketest_core::types::TestStatus;
use smoketest_engine::{
    DownstreamClient, DownstreamRequest, EngineOptions, Expectation, Fixture,
    HttpDownstreamClient, HttpProbe, ProfileRegistry, SmokeTestEngine, Stage, TestProfile,
};

const TOKEN: &str = "test-token";

#[derive(Default)]
struct FakeDownstream {
    /// 매칭 데이터가 나타나기 전 404를 돌려줄 횟수
    pending_lookups: AtomicUsize,
    lookups: AtomicUsize,
    resets: AtomicUsize,
    token_requests: AtomicUsize,
}

async fn issue_token(State(fake): State<Arc<FakeDownstream>>, headers: HeaderMap) -> Response {
    fake.token_requests.fetch_add(1, Ordering::SeqCst);
    let basic = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if !basic {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "access_token": TOKEN, "token_type": "bearer", "expires_in": 3600 }))
        .into_response()
}

fn authorised(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn reset_details(
    State(fake): State<Arc<FakeDownstream>>,
    headers: HeaderMap,
    Path(_crn): Path<String>,
) -> StatusCode {
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    fake.resets.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn offender_all(
    State(fake): State<Arc<FakeDownstream>>,
    headers: HeaderMap,
    Path(crn): Path<String>,
) -> Response {
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let seen = fake.lookups.fetch_add(1, Ordering::SeqCst);
    if seen < fake.pending_lookups.load(Ordering::SeqCst) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let noms = if crn == "X-WRONG" { "G0000ZZ" } else { "A7742DY" };
    Json(json!({ "otherIds": { "crn": crn, "nomsNumber": noms } })).into_response()
}

async fn server_error() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn health() -> &'static str {
    "pong"
}

async fn start_fake(fake: Arc<FakeDownstream>) -> String {
    let app = Router::new()
        .route("/auth/oauth/token", post(issue_token))
        .route("/auth/health/ping", get(health))
        .route("/health/ping", get(health))
        .route("/secure/smoketest/offenders/crn/{crn}/details", post(reset_details))
        .route("/secure/offenders/crn/{crn}/all", get(offender_all))
        .route("/broken", get(server_error))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config_for(base_url: &str) -> SmokeTestConfig {
    let mut config = SmokeTestConfig::default();
    config.oauth.base_url = format!("{base_url}/auth");
    config.downstream.clear();
    config.downstream.insert(
        "community-api".to_owned(),
        DownstreamConfig {
            client_id: "smoke-test".to_owned(),
            client_secret: "secret".to_owned(),
            timeout_secs: 5,
            ..DownstreamConfig::with_base_url(base_url)
        },
    );
    config
}

fn profile(crn: &str) -> TestProfile {
    let interval = Duration::from_millis(20);
    let deadline = Duration::from_secs(5);
    TestProfile::new(
        "PTPU_T3",
        vec![
            Stage::new("reset test data", "community-api", interval, deadline)
                .with_request(Method::POST, "/secure/smoketest/offenders/crn/{crn}/details"),
            Stage::new("offender match", "community-api", interval, deadline)
                .with_request(Method::GET, "/secure/offenders/crn/{crn}/all")
                .with_expectation(Expectation::JsonEquals {
                    pointer: "/otherIds/nomsNumber".to_owned(),
                    value: "{noms_number}".to_owned(),
                })
                .with_pending_statuses(vec![404])
                .with_on_match("Offender {noms_number} matched")
                .completing_test(),
        ],
        Duration::from_secs(10),
    )
    .with_fixture(Fixture::from([
        ("crn".to_owned(), crn.to_owned()),
        ("noms_number".to_owned(), "A7742DY".to_owned()),
    ]))
}

fn engine_for(
    config: &SmokeTestConfig,
    profile: TestProfile,
) -> SmokeTestEngine<HttpProbe<HttpDownstreamClient>> {
    let client = HttpDownstreamClient::from_config(config).unwrap();
    let mut registry = ProfileRegistry::new();
    registry.register(profile).unwrap();
    SmokeTestEngine::new(
        registry,
        HttpProbe::new(Arc::new(client)),
        EngineOptions::default(),
    )
}

#[tokio::test]
async fn profile_succeeds_after_pending_404s() {
    // Given: 조회가 두 번 404 후 매칭 데이터 반환
    let fake = Arc::new(FakeDownstream::default());
    fake.pending_lookups.store(2, Ordering::SeqCst);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let engine = engine_for(&config_for(&base_url), profile("X360040"));

    // When
    let statuses: Vec<_> = engine.run("PTPU_T3").collect().await;

    // Then
    assert_eq!(
        statuses,
        vec![
            TestStatus::incomplete("reset test data matched"),
            TestStatus::complete("Offender A7742DY matched"),
            TestStatus::success("test complete"),
        ]
    );
    assert_eq!(fake.resets.load(Ordering::SeqCst), 1);
    assert_eq!(fake.lookups.load(Ordering::SeqCst), 3);
    // 토큰은 캐시되어 한 번만 발급
    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn different_value_fails_with_mismatch() {
    let fake = Arc::new(FakeDownstream::default());
    let base_url = start_fake(Arc::clone(&fake)).await;
    let engine = engine_for(&config_for(&base_url), profile("X-WRONG"));

    let statuses: Vec<_> = engine.run("PTPU_T3").collect().await;

    let last = statuses.last().unwrap();
    assert!(last.has_result());
    assert!(
        last.description.starts_with("offender match mismatched:"),
        "unexpected description: {}",
        last.description
    );
    assert!(last.description.contains("G0000ZZ"));
}

#[tokio::test]
async fn unreachable_downstream_fails_run() {
    // Given: 아무도 수신하지 않는 포트
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let mut config = config_for(&base_url);
    if let Some(d) = config.downstream.get_mut("community-api") {
        d.client_id.clear();
        d.client_secret.clear();
    }
    let engine = engine_for(&config, profile("X360040"));

    // When
    let statuses: Vec<_> = engine.run("PTPU_T3").collect().await;

    // Then
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].has_result());
    assert!(
        statuses[0].description.starts_with("reset test data failed:"),
        "unexpected description: {}",
        statuses[0].description
    );
}

#[tokio::test]
async fn client_reports_status_and_body() {
    let fake = Arc::new(FakeDownstream::default());
    let base_url = start_fake(Arc::clone(&fake)).await;
    let client = HttpDownstreamClient::from_config(&config_for(&base_url)).unwrap();

    let response = client
        .call("community-api", &DownstreamRequest::get("/broken"))
        .await
        .unwrap();
    assert_eq!(response.status, 500);

    let response = client
        .call(
            "community-api",
            &DownstreamRequest::get("/secure/offenders/crn/X1/all"),
        )
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["otherIds"]["crn"], "X1");
}

#[tokio::test]
async fn ping_checks_downstream_and_token_issuer() {
    let fake = Arc::new(FakeDownstream::default());
    let base_url = start_fake(Arc::clone(&fake)).await;
    let client = HttpDownstreamClient::from_config(&config_for(&base_url)).unwrap();

    let targets = client.health_targets();
    assert_eq!(targets, vec!["community-api".to_owned(), "oauth".to_owned()]);
    for target in &targets {
        client.ping(target).await.unwrap();
    }
    // 헬스 체크는 토큰을 요구하지 않음
    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 0);
}
