//! Auth Forms
//!
//! Login and registration: validate locally, call the API, and hand the
//! returned token to the session store.

mod error;
mod login;
mod register;
mod validation;

pub use error::{FormError, FormResult, LOGIN_FALLBACK, REGISTER_FALLBACK};
pub use login::LoginForm;
pub use register::RegisterForm;
pub use validation::{
    is_valid_email, validate_login, validate_registration, ValidationError, MIN_PASSWORD_LEN,
    MIN_USERNAME_LEN,
};
