//! Client-side form validation
//!
//! Fast-fail checks run before anything is sent; the server validates again.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// A form input rejected before submission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username must be at least {min} characters long.")]
    UsernameTooShort { min: usize },

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Password must be at least {min} characters long.")]
    PasswordTooShort { min: usize },

    #[error("Please enter your {field}.")]
    MissingField { field: &'static str },
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Registration rules, first failure wins: username, then email, then password
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort {
            min: MIN_USERNAME_LEN,
        });
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Login only needs both fields present
pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "username" });
    }
    if password.is_empty() {
        return Err(ValidationError::MissingField { field: "password" });
    }
    Ok(())
}
