//! Hemolink Authentication
//!
//! This crate owns the authenticated session: login, signup, token refresh,
//! logout, persistence across restarts, and change notification. The session
//! is the one shared mutable resource in the client; everything mutating it
//! lives behind [`SessionStore`].

pub mod error;
pub mod session;
pub mod storage;
pub mod store;

pub use error::{AuthError, Result};
pub use session::{Session, SessionState};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use store::SessionStore;
