//! Session State
//!
//! Holds the bearer token and the authenticated user's profile.
//!
//! ## Lifecycle
//!
//! 1. Created empty, or restored from [`TokenStorage`] at startup
//! 2. [`SessionStore::login`] installs a token and persists it
//! 3. The identity watcher validates each new token against the backend
//! 4. [`SessionStore::logout`] (or a failed identity check) clears everything
//!
//! Every token change bumps the session epoch. Results fetched under an
//! older epoch are dropped instead of applied.

mod error;
mod storage;
mod store;
mod watcher;

pub use error::{SessionError, SessionResult, StorageError};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::{IdentityOutcome, Session, SessionEvent, SessionStore};
