//! Refresh-and-retry contract of the authenticated executor
//!
//! Verifies the two-tier policy: expiry is recovered exactly once per
//! logical call, everything else surfaces untouched, and concurrent
//! expiries share a single refresh request.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{executor, init_tracing, signed_in_store, FRESH_TOKEN, REFRESH_TOKEN, STALE_TOKEN};
use hemolink_auth::{MemorySessionStorage, SessionStore};
use hemolink_client::executor::{ApiExecutor, ExecutorConfig, RequestSpec};
use hemolink_client::ExecutorError;
use hemolink_core::identity::Role;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

async fn mount_refresh(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/user/refresh-token"))
        .and(body_json(json!({"refreshToken": REFRESH_TOKEN})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": FRESH_TOKEN,
            "refreshToken": "refresh-token-2",
            "identity": common::identity_json(),
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn expired_token_refreshes_once_and_retries() {
    init_tracing();
    let server = MockServer::start().await;
    let store = signed_in_store(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/blood-requests/mine"))
        .and(header("authorization", bearer(STALE_TOKEN)))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"code": "TOKEN_EXPIRED"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/blood-requests/mine"))
        .and(header("authorization", bearer(FRESH_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = executor(&server, store.clone());
    let response = api
        .execute(RequestSpec::get("/api/blood-requests/mine"))
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(store.current().unwrap().access_token, FRESH_TOKEN);
    assert_eq!(
        store.current().unwrap().refresh_token.as_deref(),
        Some("refresh-token-2")
    );
}

#[tokio::test]
async fn failed_refresh_surfaces_session_expired() {
    init_tracing();
    let server = MockServer::start().await;
    let store = signed_in_store(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/blood-requests/mine"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"code": "TOKEN_EXPIRED"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/refresh-token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "refresh expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = executor(&server, store.clone());
    let err = api
        .execute(RequestSpec::get("/api/blood-requests/mine"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutorError::SessionExpired));
    // The failed refresh forced a logout.
    assert!(store.current().is_none());
}

#[tokio::test]
async fn concurrent_expiries_share_one_refresh() {
    init_tracing();
    let server = MockServer::start().await;
    let store = signed_in_store(&server).await;

    // Delay the 401s so all callers observe expiry before any refresh
    // completes, then require exactly one refresh request.
    Mock::given(method("GET"))
        .and(path("/api/blood-requests/mine"))
        .and(header("authorization", bearer(STALE_TOKEN)))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"code": "TOKEN_EXPIRED"}))
                .set_delay(Duration::from_millis(100)),
        )
        .up_to_n_times(3)
        .mount(&server)
        .await;
    mount_refresh(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/blood-requests/mine"))
        .and(header("authorization", bearer(FRESH_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let api = executor(&server, store);
    let (a, b, c) = tokio::join!(
        api.execute(RequestSpec::get("/api/blood-requests/mine")),
        api.execute(RequestSpec::get("/api/blood-requests/mine")),
        api.execute(RequestSpec::get("/api/blood-requests/mine")),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
}

#[tokio::test]
async fn plain_401_is_not_retried() {
    init_tracing();
    let server = MockServer::start().await;
    let store = signed_in_store(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/blood-requests/mine"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "bad token"})))
        .expect(1)
        .mount(&server)
        .await;
    // No marker, no refresh.
    Mock::given(method("POST"))
        .and(path("/api/user/refresh-token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let api = executor(&server, store);
    let err = api
        .execute(RequestSpec::get("/api/blood-requests/mine"))
        .await
        .unwrap_err();

    match err {
        ExecutorError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body["error"], "bad token");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn domain_errors_surface_verbatim() {
    init_tracing();
    let server = MockServer::start().await;
    let store = signed_in_store(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/blood-requests/mine"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "no such request"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = executor(&server, store);
    let err = api
        .execute(RequestSpec::get("/api/blood-requests/mine"))
        .await
        .unwrap_err();

    match err {
        ExecutorError::Rejected { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body["error"], "no such request");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn network_failure_maps_to_unreachable() {
    init_tracing();
    let store = Arc::new(
        SessionStore::new(
            "http://127.0.0.1:9",
            Role::User,
            Arc::new(MemorySessionStorage::new()),
        )
        .unwrap(),
    );
    let api = Arc::new(
        ApiExecutor::new(ExecutorConfig::new("http://127.0.0.1:9"), store).unwrap(),
    );

    let err = api
        .execute(RequestSpec::get("/api/blood-requests").unauthenticated())
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutorError::Unreachable(_)));
}

#[tokio::test]
async fn unauthenticated_requests_omit_bearer_header() {
    init_tracing();
    let server = MockServer::start().await;
    let store = signed_in_store(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/blood-requests"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blood-requests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = executor(&server, store);
    api.execute(RequestSpec::get("/api/blood-requests").unauthenticated())
        .await
        .unwrap();
}

#[tokio::test]
async fn health_probe_collapses_errors_to_false() {
    init_tracing();
    let server = MockServer::start().await;
    let store = signed_in_store(&server).await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = executor(&server, store.clone());
    assert!(api.health().await);

    let dead = Arc::new(
        ApiExecutor::new(ExecutorConfig::new("http://127.0.0.1:9"), store).unwrap(),
    );
    assert!(!dead.health().await);
}
