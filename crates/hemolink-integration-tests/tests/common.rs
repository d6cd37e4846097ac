//! Shared setup for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use hemolink_auth::{MemorySessionStorage, SessionStore};
use hemolink_client::executor::{ApiExecutor, ExecutorConfig};
use hemolink_core::identity::Role;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STALE_TOKEN: &str = "stale-access-token";
pub const FRESH_TOKEN: &str = "fresh-access-token";
pub const REFRESH_TOKEN: &str = "refresh-token-1";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn identity_json() -> serde_json::Value {
    json!({"id": "donor-1", "email": "donor@example.com", "role": "user"})
}

/// Mount a login mock issuing `STALE_TOKEN` and sign a store in through it.
pub async fn signed_in_store(server: &MockServer) -> Arc<SessionStore> {
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": STALE_TOKEN,
            "refreshToken": REFRESH_TOKEN,
            "identity": identity_json(),
        })))
        .mount(server)
        .await;

    let store = Arc::new(
        SessionStore::new(server.uri(), Role::User, Arc::new(MemorySessionStorage::new()))
            .unwrap(),
    );
    store.login("donor@example.com", "pw").await.unwrap();
    store
}

pub fn executor(server: &MockServer, store: Arc<SessionStore>) -> Arc<ApiExecutor> {
    Arc::new(ApiExecutor::new(ExecutorConfig::new(server.uri()), store).unwrap())
}

/// A donation request payload in the server's wire shape.
pub fn request_json(request_id: Uuid, accepted: bool, ruling: &str) -> serde_json::Value {
    let mut value = json!({
        "requestId": request_id,
        "hospitalRef": {"id": "h1", "name": "Mayo Hospital"},
        "bloodType": "B+",
        "urgencyLevel": "Urgent",
        "unitsNeeded": 2,
        "location": "Lahore",
        "datePosted": "2024-11-02T10:00:00Z",
        "donorAcceptance": accepted,
    });
    if ruling != "None" {
        value["hospitalRuling"] = json!(ruling);
    }
    if accepted {
        value["acceptedBy"] = identity_json();
    }
    value
}
