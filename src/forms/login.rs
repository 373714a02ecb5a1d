//! Login form

use std::fmt;

use super::error::{FormError, FormResult, LOGIN_FALLBACK};
use super::validation::validate_login;
use crate::api::{LoginRequest, StudyApi};
use crate::navigation::Route;
use crate::session::SessionStore;

/// Login form state. Entered values survive a failed submission.
#[derive(Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Message from the last failed submission
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            error: None,
        }
    }

    /// Validate, send, and install the returned token.
    ///
    /// Returns where to go next on success. On failure the message is also
    /// left in [`LoginForm::error`].
    pub async fn submit(&mut self, api: &dyn StudyApi, session: &SessionStore) -> FormResult<Route> {
        self.error = None;

        let result = self.try_submit(api, session).await;
        if let Err(e) = &result {
            self.error = Some(e.to_string());
        }
        result
    }

    async fn try_submit(&self, api: &dyn StudyApi, session: &SessionStore) -> FormResult<Route> {
        validate_login(&self.username, &self.password)?;

        let request = LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        };

        let response = api.login(&request).await.map_err(|e| {
            tracing::warn!(username = %self.username, "Login failed: {}", e);
            FormError::Request(
                e.server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| LOGIN_FALLBACK.to_string()),
            )
        })?;

        session.login(&response.token).await?;
        Ok(Route::Dashboard)
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, ClientConfig};
    use crate::session::MemoryTokenStorage;
    use crate::testing::{Endpoint, FakeApi, StubBackend, FAKE_TOKEN};

    #[tokio::test]
    async fn test_success_installs_token() {
        let session = SessionStore::new(MemoryTokenStorage::new());
        let api = FakeApi::new();
        let mut form = LoginForm::new("ada", "secret1");

        let route = form.submit(&api, &session).await.unwrap();

        assert_eq!(route, Route::Dashboard);
        assert_eq!(session.token().await, FAKE_TOKEN);
        assert_eq!(form.error, None);
    }

    #[tokio::test]
    async fn test_missing_field_never_sent() {
        let session = SessionStore::new(MemoryTokenStorage::new());
        let api = FakeApi::new();
        let mut form = LoginForm::new("ada", "");

        let err = form.submit(&api, &session).await.unwrap_err();

        assert!(matches!(err, FormError::Validation(_)));
        assert!(api.calls().is_empty());
        assert!(form.error.is_some());
    }

    #[tokio::test]
    async fn test_fallback_message_without_server_text() {
        let session = SessionStore::new(MemoryTokenStorage::new());
        let api = FakeApi::new().fail(Endpoint::Login, 500, None);
        let mut form = LoginForm::new("ada", "secret1");

        let err = form.submit(&api, &session).await.unwrap_err();

        assert_eq!(err.to_string(), LOGIN_FALLBACK);
        assert_eq!(form.error.as_deref(), Some(LOGIN_FALLBACK));
        assert_eq!(form.username, "ada");
        assert_eq!(form.password, "secret1");
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_error_cleared_on_next_submit() {
        let session = SessionStore::new(MemoryTokenStorage::new());
        let mut form = LoginForm::new("ada", "secret1");

        let failing = FakeApi::new().fail(Endpoint::Login, 401, Some("Invalid username or password"));
        assert!(form.submit(&failing, &session).await.is_err());
        assert_eq!(form.error.as_deref(), Some("Invalid username or password"));

        form.submit(&FakeApi::new(), &session).await.unwrap();
        assert_eq!(form.error, None);
    }

    #[tokio::test]
    async fn test_login_against_backend() {
        let backend = StubBackend::start().await;
        let session = SessionStore::new(MemoryTokenStorage::new());
        let config = ClientConfig {
            base_url: backend.base_url(),
            ..Default::default()
        };
        let client = ApiClient::new(config, session.clone()).unwrap();

        let mut form = LoginForm::new("ada", "wrong-password");
        let err = form.submit(&client, &session).await.unwrap_err();
        assert!(matches!(err, FormError::Request(_)));
        assert_eq!(err.to_string(), "Invalid username or password");

        let mut form = LoginForm::new("ada", "secret1");
        assert_eq!(form.submit(&client, &session).await.unwrap(), Route::Dashboard);
        assert_eq!(session.token().await, backend.valid_token());
    }

    #[test]
    fn test_debug_redacts_password() {
        let form = LoginForm::new("ada", "secret1");
        let debug = format!("{:?}", form);
        assert!(!debug.contains("secret1"));
    }
}
