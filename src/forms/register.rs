//! Registration form

use std::fmt;

use super::error::{FormError, FormResult, REGISTER_FALLBACK};
use super::validation::validate_registration;
use crate::api::{RegisterRequest, StudyApi};
use crate::navigation::Route;
use crate::session::SessionStore;

/// Registration form state. Entered values survive a failed submission.
#[derive(Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Message from the last failed submission
    pub error: Option<String>,
}

impl RegisterForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            error: None,
        }
    }

    /// Validate, create the account, and sign in with the returned token
    pub async fn submit(&mut self, api: &dyn StudyApi, session: &SessionStore) -> FormResult<Route> {
        self.error = None;

        let result = self.try_submit(api, session).await;
        if let Err(e) = &result {
            self.error = Some(e.to_string());
        }
        result
    }

    async fn try_submit(&self, api: &dyn StudyApi, session: &SessionStore) -> FormResult<Route> {
        validate_registration(&self.username, &self.email, &self.password)?;

        let request = RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        };

        let response = api.register(&request).await.map_err(|e| {
            tracing::warn!(username = %self.username, "Registration failed: {}", e);
            FormError::Request(
                e.server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| REGISTER_FALLBACK.to_string()),
            )
        })?;

        tracing::info!(
            id = response.id.as_deref().unwrap_or("?"),
            username = %self.username,
            "Account created"
        );
        session.login(&response.token).await?;
        Ok(Route::Dashboard)
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("error", &self.error)
            .finish()
    }
}
