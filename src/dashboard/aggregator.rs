//! Dashboard Aggregator
//!
//! Loads the five dashboard resources together and publishes exactly one
//! view state: everything, or a single error.

use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::api::{ApiError, ApiResult, Profile, Progress, StudyApi, StudySession, Subject, Task};
use crate::session::SessionStore;

/// Everything the dashboard page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub profile: Profile,
    pub progress: Progress,
    pub subjects: Vec<Subject>,
    pub tasks: Vec<Task>,
    pub study_sessions: Vec<StudySession>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Failed(String),
    Ready(Box<Dashboard>),
}

/// One of the dashboard reads, in request order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Profile,
    Progress,
    Subjects,
    Tasks,
    StudySessions,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Profile => "profile",
            Resource::Progress => "progress",
            Resource::Subjects => "subjects",
            Resource::Tasks => "tasks",
            Resource::StudySessions => "study sessions",
        };
        f.write_str(name)
    }
}

/// The first read that failed
#[derive(Error, Debug)]
#[error("Failed to fetch data. Could not load {resource}: {source}")]
pub struct AggregateError {
    pub resource: Resource,
    #[source]
    pub source: ApiError,
}

/// What [`DashboardAggregator::load`] did with its results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// State is now `Ready` or `Failed`
    Applied,
    /// Session changed mid-load; results dropped and state left at `Loading`
    Discarded,
    /// No usable token; the session is now signed out
    SignedOut,
}

#[derive(Clone)]
pub struct DashboardAggregator {
    api: Arc<dyn StudyApi>,
    session: SessionStore,
    state: Arc<RwLock<DashboardState>>,
}

impl DashboardAggregator {
    pub fn new(api: Arc<dyn StudyApi>, session: SessionStore) -> Self {
        Self {
            api,
            session,
            state: Arc::new(RwLock::new(DashboardState::Loading)),
        }
    }

    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Fetch all five resources and publish the result.
    ///
    /// The state is reset to `Loading` when the fetch starts. Results are
    /// only applied if the session is still the one the load started under.
    /// A 401 from any read signs the session out.
    pub async fn load(&self) -> LoadOutcome {
        let session = self.session.snapshot().await;
        if !session.is_authenticated() {
            tracing::debug!("Dashboard load skipped, not signed in");
            return LoadOutcome::SignedOut;
        }
        let epoch = session.epoch;

        *self.state.write().await = DashboardState::Loading;
        let result = fetch_all(self.api.as_ref()).await;

        let mut state = self.state.write().await;
        if !self.session.is_current(epoch).await {
            tracing::debug!(epoch, "Discarding dashboard results for replaced session");
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(dashboard) => {
                tracing::debug!(
                    subjects = dashboard.subjects.len(),
                    tasks = dashboard.tasks.len(),
                    sessions = dashboard.study_sessions.len(),
                    "Dashboard loaded"
                );
                *state = DashboardState::Ready(Box::new(dashboard));
                LoadOutcome::Applied
            }
            Err(e) if e.source.is_unauthorized() => {
                drop(state);
                tracing::warn!(resource = %e.resource, "Token rejected while loading dashboard");
                self.session.logout_if_current(epoch).await;
                LoadOutcome::SignedOut
            }
            Err(e) => {
                tracing::warn!("{}", e);
                *state = DashboardState::Failed(e.to_string());
                LoadOutcome::Applied
            }
        }
    }
}

async fn fetch<T>(
    resource: Resource,
    call: impl Future<Output = ApiResult<T>>,
) -> Result<T, AggregateError> {
    call.await
        .map_err(|source| AggregateError { resource, source })
}

/// Run all reads concurrently, started in page order; first failure wins
async fn fetch_all(api: &dyn StudyApi) -> Result<Dashboard, AggregateError> {
    let (profile, progress, subjects, tasks, study_sessions) = tokio::try_join!(
        fetch(Resource::Profile, api.profile()),
        fetch(Resource::Progress, api.progress()),
        fetch(Resource::Subjects, api.subjects()),
        fetch(Resource::Tasks, api.tasks()),
        fetch(Resource::StudySessions, api.study_sessions()),
    )?;

    Ok(Dashboard {
        profile,
        progress,
        subjects,
        tasks,
        study_sessions,
    })
}
