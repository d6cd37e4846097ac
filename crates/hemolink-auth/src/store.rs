//! Session lifecycle: login, signup, refresh, logout

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use hemolink_core::identity::Role;
use reqwest::Client;
use serde_json::json;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use crate::session::{AuthResponse, Session, SessionState};
use crate::storage::SessionStorage;
use crate::{AuthError, Result};

/// Owns the authenticated session for one role and drives the
/// login / refresh / logout lifecycle against the auth endpoints.
///
/// At most one session is live per store. All mutation goes through the
/// methods here, each of which updates memory, the persisted mirror and the
/// subscriber channel together, so no intermediate state is ever observable.
pub struct SessionStore {
    client: Client,
    base_url: String,
    role: Role,
    storage: Arc<dyn SessionStorage>,
    session: RwLock<Option<Session>>,
    // Serializes refresh attempts so a possibly single-use refresh token is
    // never consumed twice (see `refresh`).
    refresh_lock: Mutex<()>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create a store scoped to `role`, re-hydrating any session the storage
    /// layer persisted for that role.
    pub fn new(
        base_url: impl Into<String>,
        role: Role,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let hydrated = storage.load(role)?;
        let initial = match &hydrated {
            Some(session) => SessionState::SignedIn(session.identity.clone()),
            None => SessionState::SignedOut,
        };
        let (state_tx, _) = watch::channel(initial);

        Ok(Self {
            client,
            base_url: base_url.into(),
            role,
            storage,
            session: RwLock::new(hydrated),
            refresh_lock: Mutex::new(()),
            state_tx,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Current session snapshot, if signed in. Synchronous read.
    pub fn current(&self) -> Option<Session> {
        self.session
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// Watch session changes. Receivers see the current state immediately
    /// and every subsequent login/logout, including forced logouts after a
    /// failed refresh.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(format!("{}/api/user/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            debug!("Login rejected with status {}", response.status());
            return Err(AuthError::InvalidCredentials);
        }

        let auth: AuthResponse = response.json().await?;
        self.install(auth)
    }

    /// Register a new account. The server signs the account in on success,
    /// so this installs a session exactly like `login`.
    #[instrument(skip(self, password))]
    pub async fn signup(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(format!("{}/api/user/signup", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::SignupRejected(body));
        }

        let auth: AuthResponse = response.json().await?;
        self.install(auth)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `rejected_access` is the access token the caller saw the server
    /// reject. Refreshes are serialized; a caller that waited on the lock
    /// while another refresh completed finds the live token already changed
    /// and gets it back without a second network call. That keeps N
    /// concurrent expiries at exactly one refresh request, which matters if
    /// the server rotates refresh tokens on use.
    ///
    /// Any refresh failure clears the session entirely and forces re-login.
    #[instrument(skip_all)]
    pub async fn refresh(&self, rejected_access: &str) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        let (refresh_token, live_access) = {
            let guard = self.session.read().expect("session lock poisoned");
            match guard.as_ref() {
                Some(session) => (
                    session.refresh_token.clone(),
                    session.access_token.clone(),
                ),
                None => return Err(AuthError::RefreshInvalid),
            }
        };

        if live_access != rejected_access {
            debug!("Session already refreshed by a concurrent caller");
            return Ok(live_access);
        }

        let Some(refresh_token) = refresh_token else {
            warn!("No refresh token available, clearing session");
            self.clear_session();
            return Err(AuthError::RefreshInvalid);
        };

        let response = self
            .client
            .post(format!("{}/api/user/refresh-token", self.base_url))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!("Refresh request failed: {}", e);
                self.clear_session();
                return Err(AuthError::RefreshInvalid);
            }
        };

        if !response.status().is_success() {
            warn!(
                "Refresh token rejected with status {}, clearing session",
                response.status()
            );
            self.clear_session();
            return Err(AuthError::RefreshInvalid);
        }

        let auth: AuthResponse = match response.json().await {
            Ok(auth) => auth,
            Err(e) => {
                warn!("Unreadable refresh response: {}", e);
                self.clear_session();
                return Err(AuthError::RefreshInvalid);
            }
        };

        debug!("Access token refreshed");
        let session = self.install(auth)?;
        Ok(session.access_token)
    }

    /// Clear the session unconditionally. Idempotent.
    pub fn logout(&self) {
        self.clear_session();
    }

    fn install(&self, auth: AuthResponse) -> Result<Session> {
        let session = Session {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            identity: auth.identity,
            issued_at: Utc::now(),
        };
        {
            let mut guard = self.session.write().expect("session lock poisoned");
            self.storage.store(self.role, &session)?;
            *guard = Some(session.clone());
        }
        self.state_tx
            .send_replace(SessionState::SignedIn(session.identity.clone()));
        Ok(session)
    }

    fn clear_session(&self) {
        {
            let mut guard = self.session.write().expect("session lock poisoned");
            if let Err(e) = self.storage.clear(self.role) {
                warn!("Failed to clear persisted session: {}", e);
            }
            *guard = None;
        }
        self.state_tx.send_replace(SessionState::SignedOut);
    }
}
