//! Test support: an in-process [`StudyApi`] double and an HTTP stub backend.

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::api::{
    ApiError, ApiResult, AuthResponse, LoginRequest, Profile, Progress, RegisterRequest, StudyApi,
    StudySession, Subject, Task,
};

pub const FAKE_TOKEN: &str = "fake-token";

// ============================================
// Fixtures
// ============================================

pub fn profile() -> Profile {
    Profile {
        id: Some("u-1".to_string()),
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        created_at: Some("2024-01-01T09:00:00Z".to_string()),
        extra: Default::default(),
    }
}

pub fn progress() -> Progress {
    Progress {
        completed_tasks: 3,
        total_tasks: 5,
    }
}

pub fn subjects() -> Vec<Subject> {
    vec![
        Subject {
            id: "s-1".to_string(),
            name: "Mathematics".to_string(),
            description: Some("Linear algebra".to_string()),
        },
        Subject {
            id: "s-2".to_string(),
            name: "History".to_string(),
            description: None,
        },
    ]
}

pub fn tasks() -> Vec<Task> {
    vec![
        Task {
            id: "t-1".to_string(),
            title: "Problem set 4".to_string(),
            description: Some("Eigenvalues".to_string()),
            deadline: Some("2024-06-01T17:00:00Z".to_string()),
            difficulty_level: Some(3),
        },
        Task {
            id: "t-2".to_string(),
            title: "Read chapter 2".to_string(),
            description: None,
            deadline: None,
            difficulty_level: None,
        },
    ]
}

pub fn study_sessions() -> Vec<StudySession> {
    vec![
        StudySession {
            id: "ss-1".to_string(),
            scheduled_at: "2024-05-20T18:00:00Z".to_string(),
            duration: 45,
            completed: true,
        },
        StudySession {
            id: "ss-2".to_string(),
            scheduled_at: "2024-05-22T18:00:00Z".to_string(),
            duration: 60,
            completed: false,
        },
    ]
}

// ============================================
// In-process double
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Register,
    Login,
    Identity,
    Profile,
    Progress,
    Subjects,
    Tasks,
    StudySessions,
}

/// Holds a call until released
#[derive(Clone, Default)]
pub struct Gate {
    started: Arc<Notify>,
    released: Arc<Notify>,
}

impl Gate {
    /// Wait until the gated call has started
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let the gated call finish
    pub fn release(&self) {
        self.released.notify_one();
    }

    async fn pass(&self) {
        self.started.notify_one();
        self.released.notified().await;
    }
}

#[derive(Default)]
struct FakeInner {
    failures: Mutex<HashMap<Endpoint, (u16, Option<String>)>>,
    gates: Mutex<HashMap<Endpoint, Gate>>,
    calls: Mutex<Vec<Endpoint>>,
}

/// [`StudyApi`] that serves the fixtures above, with injectable failures
#[derive(Clone, Default)]
pub struct FakeApi {
    inner: Arc<FakeInner>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `endpoint` answer with `status` and an optional server message
    pub fn fail(self, endpoint: Endpoint, status: u16, message: Option<&str>) -> Self {
        self.inner
            .failures
            .lock()
            .unwrap()
            .insert(endpoint, (status, message.map(str::to_string)));
        self
    }

    pub fn reject_identity(self) -> Self {
        self.fail(Endpoint::Identity, 401, Some("Invalid token"))
    }

    /// Hold the next call to `endpoint` until the returned gate is released
    pub fn gate(&self, endpoint: Endpoint) -> Gate {
        let gate = Gate::default();
        self.inner.gates.lock().unwrap().insert(endpoint, gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls().iter().filter(|e| **e == endpoint).count()
    }

    pub fn identity_calls(&self) -> usize {
        self.call_count(Endpoint::Identity)
    }

    async fn respond<T>(&self, endpoint: Endpoint, value: impl FnOnce() -> T) -> ApiResult<T> {
        self.inner.calls.lock().unwrap().push(endpoint);

        let gate = self.inner.gates.lock().unwrap().remove(&endpoint);
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let failure = self.inner.failures.lock().unwrap().get(&endpoint).cloned();
        match failure {
            Some((status, message)) => Err(ApiError::Status { status, message }),
            None => Ok(value()),
        }
    }
}

fn auth_response(username: Option<&str>) -> AuthResponse {
    AuthResponse {
        token: FAKE_TOKEN.to_string(),
        id: username.map(|_| "u-2".to_string()),
        username: username.map(str::to_string),
        email: None,
        created_at: None,
    }
}

#[async_trait]
impl StudyApi for FakeApi {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        let username = request.username.clone();
        self.respond(Endpoint::Register, || auth_response(Some(&username)))
            .await
    }

    async fn login(&self, _request: &LoginRequest) -> ApiResult<AuthResponse> {
        self.respond(Endpoint::Login, || auth_response(None)).await
    }

    async fn current_user(&self) -> ApiResult<Profile> {
        self.respond(Endpoint::Identity, profile).await
    }

    async fn profile(&self) -> ApiResult<Profile> {
        self.respond(Endpoint::Profile, profile).await
    }

    async fn progress(&self) -> ApiResult<Progress> {
        self.respond(Endpoint::Progress, progress).await
    }

    async fn subjects(&self) -> ApiResult<Vec<Subject>> {
        self.respond(Endpoint::Subjects, subjects).await
    }

    async fn tasks(&self) -> ApiResult<Vec<Task>> {
        self.respond(Endpoint::Tasks, tasks).await
    }

    async fn study_sessions(&self) -> ApiResult<Vec<StudySession>> {
        self.respond(Endpoint::StudySessions, study_sessions).await
    }
}

// ============================================
// HTTP stub backend
// ============================================

const STUB_TOKEN: &str = "stub-token";

struct StubState {
    last_authorization: Mutex<Option<String>>,
    progress: Mutex<Value>,
    failures: Mutex<HashMap<String, (u16, Option<String>)>>,
}

/// Minimal study planner backend listening on an ephemeral local port.
///
/// Accepts `ada` / `secret1` at `/login`, refuses the username `taken` at
/// `/register`, and requires `Bearer stub-token` on every resource.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            last_authorization: Mutex::new(None),
            progress: Mutex::new(serde_json::to_value(progress()).unwrap()),
            failures: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/profile", get(get_profile))
            .route("/progress", get(get_progress))
            .route("/subjects", get(get_subjects))
            .route("/tasks", get(get_tasks))
            .route("/study-sessions", get(get_study_sessions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn valid_token(&self) -> String {
        STUB_TOKEN.to_string()
    }

    /// `Authorization` header of the most recent resource request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    pub fn set_progress(&self, completed_tasks: i64, total_tasks: i64) {
        *self.state.progress.lock().unwrap() = json!({
            "completed_tasks": completed_tasks,
            "total_tasks": total_tasks,
        });
    }

    pub fn fail_with_empty_body(&self, path: &str, status: u16) {
        self.state
            .failures
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, None));
    }

    pub fn fail_with_message(&self, path: &str, status: u16, message: &str) {
        self.state
            .failures
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, Some(message.to_string())));
    }
}

fn error_response(status: u16, message: Option<&str>) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    match message {
        Some(message) => (status, Json(json!({ "error": message }))).into_response(),
        None => status.into_response(),
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    if username == "taken" {
        return error_response(400, Some("Username or email already exists."));
    }

    Json(json!({
        "id": "u-2",
        "username": username,
        "email": body["email"],
        "token": STUB_TOKEN,
        "created_at": "2024-01-02T10:00:00Z",
    }))
    .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "ada" && body["password"] == "secret1" {
        Json(json!({ "token": STUB_TOKEN })).into_response()
    } else {
        error_response(401, Some("Invalid username or password"))
    }
}

type Stub = State<Arc<StubState>>;

async fn get_profile(state: Stub, headers: HeaderMap) -> Response {
    resource(state, headers, "/profile").await
}

async fn get_progress(state: Stub, headers: HeaderMap) -> Response {
    resource(state, headers, "/progress").await
}

async fn get_subjects(state: Stub, headers: HeaderMap) -> Response {
    resource(state, headers, "/subjects").await
}

async fn get_tasks(state: Stub, headers: HeaderMap) -> Response {
    resource(state, headers, "/tasks").await
}

async fn get_study_sessions(state: Stub, headers: HeaderMap) -> Response {
    resource(state, headers, "/study-sessions").await
}

async fn resource(State(state): Stub, headers: HeaderMap, path: &'static str) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_authorization.lock().unwrap() = authorization.clone();

    let expected = format!("Bearer {}", STUB_TOKEN);
    if authorization.as_deref() != Some(expected.as_str()) {
        return error_response(401, Some("Invalid token"));
    }

    let failure = state.failures.lock().unwrap().get(path).cloned();
    if let Some((status, message)) = failure {
        return error_response(status, message.as_deref());
    }

    let body = match path {
        "/profile" => serde_json::to_value(profile()).unwrap(),
        "/progress" => state.progress.lock().unwrap().clone(),
        "/subjects" => serde_json::to_value(subjects()).unwrap(),
        "/tasks" => serde_json::to_value(tasks()).unwrap(),
        _ => serde_json::to_value(study_sessions()).unwrap(),
    };
    Json(body).into_response()
}
