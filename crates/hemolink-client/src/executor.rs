//! Authenticated request execution
//!
//! [`ApiExecutor`] wraps every API call with the session's bearer token and
//! recovers exactly one class of failure locally: a 401 carrying the
//! server's `TOKEN_EXPIRED` marker triggers one refresh and one retry, whose
//! outcome is final. Everything else is surfaced to the caller untouched,
//! bounding amplification to two requests per logical call.

use std::sync::Arc;

use hemolink_auth::SessionStore;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::http::{HttpClientConfig, create_client};
use crate::{ExecutorError, Result};

/// Marker the server puts on 401 bodies when the access token has expired,
/// as opposed to being absent or malformed.
const TOKEN_EXPIRED_CODE: &str = "TOKEN_EXPIRED";

/// One logical API call.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub requires_auth: bool,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            requires_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Skip the Authorization header. The server still rejects the call if
    /// it required auth after all.
    pub fn unauthenticated(mut self) -> Self {
        self.requires_auth = false;
        self
    }
}

/// A 2xx response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| ExecutorError::Parse(e.to_string()))
    }
}

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// API origin, e.g. `https://hemolink.example.com`.
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl ExecutorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_config: HttpClientConfig::default(),
        }
    }
}

pub struct ApiExecutor {
    config: ExecutorConfig,
    client: Client,
    sessions: Arc<SessionStore>,
}

impl ApiExecutor {
    pub fn new(config: ExecutorConfig, sessions: Arc<SessionStore>) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            sessions,
        })
    }

    /// Issue one logical call.
    ///
    /// The access token is snapshotted up front; if the server reports it
    /// expired, that exact token is handed to the refresh path so concurrent
    /// expiries de-duplicate to a single refresh request.
    #[instrument(skip(self, spec), fields(method = %spec.method, path = %spec.path))]
    pub async fn execute(&self, spec: RequestSpec) -> Result<ApiResponse> {
        let access = if spec.requires_auth {
            self.sessions.current().map(|session| session.access_token)
        } else {
            None
        };

        let response = self.send(&spec, access.as_deref()).await?;

        if let Some(rejected) = access {
            if is_expired_credential(&response) {
                debug!("Access token expired, refreshing");
                let fresh = match self.sessions.refresh(&rejected).await {
                    Ok(token) => token,
                    Err(e) => {
                        warn!("Refresh failed: {}", e);
                        return Err(ExecutorError::SessionExpired);
                    }
                };
                // One retry with the fresh token; its outcome is final.
                let retried = self.send(&spec, Some(&fresh)).await?;
                return into_result(retried);
            }
        }

        into_result(response)
    }

    /// Execute and deserialize the 2xx body.
    pub async fn execute_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        self.execute(spec).await?.json()
    }

    /// Liveness probe against the API origin. Any failure reads as "down".
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Health probe failed: {}", e);
                false
            }
        }
    }

    async fn send(&self, spec: &RequestSpec, access: Option<&str>) -> Result<RawResponse> {
        let url = format!("{}{}", self.config.base_url, spec.path);
        let mut request = self.client.request(spec.method.clone(), &url);

        if let Some(token) = access {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            // Non-JSON error pages still get surfaced verbatim.
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(RawResponse { status, body })
    }
}

/// Response before success/failure classification.
struct RawResponse {
    status: StatusCode,
    body: Value,
}

fn is_expired_credential(response: &RawResponse) -> bool {
    response.status == StatusCode::UNAUTHORIZED
        && response.body.get("code").and_then(Value::as_str) == Some(TOKEN_EXPIRED_CODE)
}

fn into_result(response: RawResponse) -> Result<ApiResponse> {
    if response.status.is_success() {
        Ok(ApiResponse {
            status: response.status,
            body: response.body,
        })
    } else {
        Err(ExecutorError::Rejected {
            status: response.status.as_u16(),
            body: response.body,
        })
    }
}
