//! Request/Response DTOs
//!
//! Wire types for the study planner REST API. Every resource here is a
//! read-only mirror of server state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================
// Auth
// ============================================

/// Body of `POST /login`
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /register`
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login or registration.
///
/// Login only returns the token; registration also echoes the new account.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"<redacted>")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish()
    }
}

/// Error body returned by the backend on any non-2xx response
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ============================================
// Resources
// ============================================

/// The authenticated user's profile.
///
/// Fields the client doesn't know about are carried through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Task completion counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Progress {
    pub completed_tasks: i64,
    pub total_tasks: i64,
}

impl Progress {
    /// Check `0 <= completed_tasks <= total_tasks`
    pub fn check(&self) -> Result<(), String> {
        if self.completed_tasks < 0 || self.total_tasks < 0 {
            return Err(format!(
                "negative task counts ({}/{})",
                self.completed_tasks, self.total_tasks
            ));
        }
        if self.completed_tasks > self.total_tasks {
            return Err(format!(
                "completed_tasks ({}) exceeds total_tasks ({})",
                self.completed_tasks, self.total_tasks
            ));
        }
        Ok(())
    }

    /// Completion percentage, rounded down. Zero when there are no tasks.
    pub fn percent(&self) -> u8 {
        if self.total_tasks <= 0 {
            return 0;
        }
        let completed = i128::from(self.completed_tasks.clamp(0, self.total_tasks));
        let pct = completed * 100 / i128::from(self.total_tasks);
        u8::try_from(pct).unwrap_or(100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<i64>,
}

/// A scheduled block of study time
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StudySession {
    pub id: String,
    pub scheduled_at: String,
    /// Minutes
    pub duration: i64,
    pub completed: bool,
}
