//! Navigation
//!
//! - [`authorized`]: pure guard deciding allow/redirect per route
//! - [`Navigator`]: current location, re-checked on navigation and session change

mod guard;
mod navigator;

pub use guard::{authorized, resolve, Decision, Route};
pub use navigator::Navigator;
