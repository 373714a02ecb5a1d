//! # Study Planner
//!
//! Client for a study planner backend: account registration and login, a
//! persisted session, route guarding, and an aggregated dashboard of
//! progress, subjects, tasks and study sessions.
//!
//! ## Modules
//!
//! - [`session`]: Session store, token persistence and the identity watcher
//! - [`api`]: Typed REST client for the backend
//! - [`navigation`]: Route guard and navigator
//! - [`forms`]: Login and registration forms with client-side validation
//! - [`dashboard`]: All-or-nothing dashboard loading and rendering
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use study_planner::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = SessionStore::restore(FileTokenStorage::new(FileTokenStorage::default_path()))?;
//!     let api = Arc::new(ApiClient::new(ClientConfig::default(), session.clone())?);
//!
//!     let mut form = LoginForm::new("ada", "secret1");
//!     form.submit(&*api, &session).await?;
//!
//!     let dashboard = DashboardAggregator::new(api, session);
//!     dashboard.load().await;
//!     print!("{}", dashboard.state().await);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod forms;
pub mod navigation;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use api::{ApiClient, ApiError, ApiResult, ClientConfig, StudyApi};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};

pub use dashboard::{
    AggregateError, Dashboard, DashboardAggregator, DashboardState, DashboardView, LoadOutcome,
};

pub use forms::{FormError, LoginForm, RegisterForm, ValidationError};

pub use navigation::{authorized, Decision, Navigator, Route};

pub use session::{
    FileTokenStorage, IdentityOutcome, MemoryTokenStorage, Session, SessionError, SessionEvent,
    SessionStore, StorageError, TokenStorage,
};
