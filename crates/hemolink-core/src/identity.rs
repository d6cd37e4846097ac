//! Identities and roles

use serde::{Deserialize, Serialize};

/// Account roles recognized by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Stable key used to scope persisted sessions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Reference to a signed-in account.
///
/// Also used for the `acceptedBy` field on donation requests, where the
/// server may omit the role; it defaults to [`Role::User`] there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}
