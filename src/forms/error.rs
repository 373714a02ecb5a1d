use thiserror::Error;

use super::validation::ValidationError;
use crate::session::SessionError;

/// Shown when a failed login carries no server message
pub const LOGIN_FALLBACK: &str = "An unexpected error occurred.";
/// Shown when a failed registration carries no server message
pub const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

/// Why a form submission did not sign the user in
#[derive(Error, Debug)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Request failed; holds the text to show the user
    #[error("{0}")]
    Request(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type FormResult<T> = Result<T, FormError>;
