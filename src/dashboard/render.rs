//! Dashboard rendering, as text or JSON

use chrono::DateTime;
use std::fmt;

use super::aggregator::{Dashboard, DashboardState};

pub const NO_DESCRIPTION: &str = "No description provided.";
pub const NO_DEADLINE: &str = "No deadline set.";
pub const NOT_AVAILABLE: &str = "N/A";

/// Text view of a loaded dashboard
pub struct DashboardView<'a>(pub &'a Dashboard);

/// Show RFC 3339 timestamps in a readable form, anything else as given
pub fn format_timestamp(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M %:z").to_string(),
        Err(_) => value.to_string(),
    }
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder,
    }
}

fn difficulty(level: Option<i64>) -> String {
    match level {
        Some(level) if level != 0 => level.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;

        writeln!(f, "Welcome, {}!", d.profile.username)?;
        writeln!(f)?;

        writeln!(f, "Your Progress")?;
        writeln!(
            f,
            "  Completed {} of {} tasks ({}%)",
            d.progress.completed_tasks,
            d.progress.total_tasks,
            d.progress.percent()
        )?;
        writeln!(f)?;

        writeln!(f, "Your Subjects")?;
        if d.subjects.is_empty() {
            writeln!(f, "  No subjects yet.")?;
        }
        for subject in &d.subjects {
            writeln!(
                f,
                "  - {}: {}",
                subject.name,
                or_placeholder(subject.description.as_deref(), NO_DESCRIPTION)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Your Tasks")?;
        if d.tasks.is_empty() {
            writeln!(f, "  No tasks yet.")?;
        }
        for task in &d.tasks {
            let deadline = task
                .deadline
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(format_timestamp);

            writeln!(f, "  - {}", task.title)?;
            writeln!(
                f,
                "    Description: {}",
                or_placeholder(task.description.as_deref(), NO_DESCRIPTION)
            )?;
            writeln!(
                f,
                "    Deadline: {}",
                or_placeholder(deadline.as_deref(), NO_DEADLINE)
            )?;
            writeln!(f, "    Difficulty: {}", difficulty(task.difficulty_level))?;
        }
        writeln!(f)?;

        writeln!(f, "Your Study Sessions")?;
        if d.study_sessions.is_empty() {
            writeln!(f, "  No study sessions yet.")?;
        }
        for session in &d.study_sessions {
            let status = if session.completed {
                "Completed"
            } else {
                "Pending"
            };
            writeln!(f, "  - {}", format_timestamp(&session.scheduled_at))?;
            writeln!(f, "    Duration: {} minutes", session.duration)?;
            writeln!(f, "    Status: {}", status)?;
        }

        Ok(())
    }
}

impl fmt::Display for DashboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardState::Loading => writeln!(f, "Loading..."),
            DashboardState::Failed(message) => writeln!(f, "{}", message),
            DashboardState::Ready(dashboard) => fmt::Display::fmt(&DashboardView(dashboard.as_ref()), f),
        }
    }
}

pub fn render_text(dashboard: &Dashboard) -> String {
    DashboardView(dashboard).to_string()
}

pub fn render_json(dashboard: &Dashboard) -> serde_json::Result<String> {
    serde_json::to_string_pretty(dashboard)
}
