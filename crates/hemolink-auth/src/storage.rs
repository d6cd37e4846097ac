//! Persisted session mirror
//!
//! Sessions survive process restarts through a small JSON file keyed by
//! role. Invariant: at most one role holds a persisted session per profile;
//! persisting a session for one role evicts every other role's entry.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use hemolink_core::identity::Role;
use tracing::warn;

use crate::{AuthError, Result, Session};

/// Durable mirror of the in-memory session.
pub trait SessionStorage: Send + Sync {
    fn load(&self, role: Role) -> Result<Option<Session>>;

    /// Persist `session` under `role`, evicting any other role's entry.
    fn store(&self, role: Role, session: &Session) -> Result<()>;

    fn clear(&self, role: Role) -> Result<()>;
}

/// File-backed storage, one JSON document holding the role → session map.
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's home directory
    /// (`~/.hemolink/session.json`).
    pub fn default_path() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| AuthError::Storage("could not determine home directory".to_string()))?;
        Ok(Self::new(home.join(".hemolink").join("session.json")))
    }

    fn read_all(&self) -> Result<HashMap<String, Session>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            AuthError::Storage(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        match serde_json::from_str(&contents) {
            Ok(sessions) => Ok(sessions),
            Err(e) => {
                // A corrupt file is indistinguishable from being signed out.
                warn!(
                    "Discarding unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(HashMap::new())
            }
        }
    }

    fn write_all(&self, sessions: &HashMap<String, Session>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let contents = serde_json::to_string_pretty(sessions)?;
        fs::write(&self.path, contents).map_err(|e| {
            AuthError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self, role: Role) -> Result<Option<Session>> {
        Ok(self.read_all()?.remove(role.as_str()))
    }

    fn store(&self, role: Role, session: &Session) -> Result<()> {
        // One active role-session per profile: the new entry replaces the
        // whole document, dropping any other role's session.
        let mut sessions = HashMap::new();
        sessions.insert(role.as_str().to_string(), session.clone());
        self.write_all(&sessions)
    }

    fn clear(&self, role: Role) -> Result<()> {
        let mut sessions = self.read_all()?;
        if sessions.remove(role.as_str()).is_some() {
            self.write_all(&sessions)?;
        }
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral processes. Same eviction
/// semantics as the file-backed implementation.
#[derive(Default)]
pub struct MemorySessionStorage {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, role: Role) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .expect("session storage lock poisoned")
            .get(role.as_str())
            .cloned())
    }

    fn store(&self, role: Role, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.lock().expect("session storage lock poisoned");
        sessions.clear();
        sessions.insert(role.as_str().to_string(), session.clone());
        Ok(())
    }

    fn clear(&self, role: Role) -> Result<()> {
        self.sessions
            .lock()
            .expect("session storage lock poisoned")
            .remove(role.as_str());
        Ok(())
    }
}
