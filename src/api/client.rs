//! Study Planner REST API Client
//!
//! HTTP client for the study planner backend. The bearer token is read from
//! the session store on every request, never captured at construction.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use super::dto::{
    AuthResponse, ErrorBody, LoginRequest, Profile, Progress, RegisterRequest, StudySession,
    Subject, Task,
};
use super::error::{ApiError, ApiResult};
use super::StudyApi;
use crate::session::SessionStore;

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the API (e.g., "http://localhost:3000/api")
    pub base_url: String,
    /// Path used to validate a token and load the current user
    pub identity_path: String,
    /// Request timeout; `None` keeps the transport default
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            identity_path: "/profile".to_string(),
            request_timeout: None,
        }
    }
}

/// Study planner REST API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    identity_path: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client that authenticates with whatever token `session` holds
    pub fn new(config: ClientConfig, session: SessionStore) -> ApiResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let parsed = Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: config.base_url,
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url,
            identity_path: normalize_path(&config.identity_path),
            session,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, normalize_path(path))
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self.client.get(self.url(path));
        self.execute("GET", path, request).await
    }

    /// POST a JSON body and parse the JSON reply
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        self.execute("POST", path, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: &'static str,
        path: &str,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("api_request", %request_id, method, path);

        async move {
            let token = self.session.token().await;
            let request = if token.is_empty() {
                request
            } else {
                request.bearer_auth(&token)
            };

            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;

            tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

            if status.is_success() {
                serde_json::from_str(&body).map_err(|e| ApiError::Decode {
                    path: path.to_string(),
                    message: e.to_string(),
                })
            } else {
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .ok()
                    .map(|b| b.error)
                    .filter(|m| !m.trim().is_empty());

                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl StudyApi for ApiClient {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.post("/register", request).await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        self.post("/login", request).await
    }

    async fn current_user(&self) -> ApiResult<Profile> {
        self.get(&self.identity_path).await
    }

    async fn profile(&self) -> ApiResult<Profile> {
        self.get("/profile").await
    }

    async fn progress(&self) -> ApiResult<Progress> {
        let progress: Progress = self.get("/progress").await?;
        progress.check().map_err(|message| ApiError::Malformed {
            path: "/progress".to_string(),
            message,
        })?;
        Ok(progress)
    }

    async fn subjects(&self) -> ApiResult<Vec<Subject>> {
        self.get("/subjects").await
    }

    async fn tasks(&self) -> ApiResult<Vec<Task>> {
        self.get("/tasks").await
    }

    async fn study_sessions(&self) -> ApiResult<Vec<StudySession>> {
        self.get("/study-sessions").await
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
