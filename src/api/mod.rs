//! Study Planner API
//!
//! Client side of the study planner REST API.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /register` - Create an account, returns a token
//! - `POST /login` - Exchange credentials for a token
//!
//! ## Resources (bearer token required)
//! - `GET /profile` - Current user's profile
//! - `GET /progress` - Completed/total task counters
//! - `GET /subjects` - Subjects
//! - `GET /tasks` - Tasks
//! - `GET /study-sessions` - Scheduled study sessions
//!
//! The identity check used to validate a restored token is configurable
//! (see [`ClientConfig::identity_path`]).

pub mod client;
pub mod dto;
pub mod error;

pub use client::{ApiClient, ClientConfig};
pub use dto::{
    AuthResponse, LoginRequest, Profile, Progress, RegisterRequest, StudySession, Subject, Task,
};
pub use error::{ApiError, ApiResult};

use async_trait::async_trait;

/// The backend operations the client depends on
#[async_trait]
pub trait StudyApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse>;

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;

    /// Validate the current token and return the user it belongs to
    async fn current_user(&self) -> ApiResult<Profile>;

    async fn profile(&self) -> ApiResult<Profile>;

    async fn progress(&self) -> ApiResult<Progress>;

    async fn subjects(&self) -> ApiResult<Vec<Subject>>;

    async fn tasks(&self) -> ApiResult<Vec<Task>>;

    async fn study_sessions(&self) -> ApiResult<Vec<StudySession>>;
}
