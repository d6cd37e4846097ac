//! Session types

use chrono::{DateTime, Utc};
use hemolink_core::identity::Identity;
use serde::{Deserialize, Serialize};

/// An authenticated session for exactly one identity and role.
///
/// Owned by [`crate::SessionStore`]; mutated only through login, refresh and
/// logout. The serialized form mirrors what gets persisted to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    /// Longer-lived token used solely to mint a new access token. Absent for
    /// accounts the server never issued one to.
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub identity: Identity,
    pub issued_at: DateTime<Utc>,
}

/// Snapshot published to subscribers on every session change.
///
/// Tokens are deliberately not part of the published state; consumers that
/// need them go through [`crate::SessionStore::current`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    SignedOut,
    SignedIn(Identity),
}

/// Body returned by the login, signup and refresh-token endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub identity: Identity,
}
