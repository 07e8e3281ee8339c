use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Extension, Form, Json, Router,
};
use hyper::ext::ReasonPhrase;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_TOKEN_LIFETIME: u64 = 3600;
pub const INBOX_PROJECT_ID: &str = "inbox";
/// Reason phrase sent with a rejected token request.
pub const INVALID_CLIENT_REASON: &str = "Invalid Client";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub priority: i32,
    pub status: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub project_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,
    pub content: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<i32>,
    pub project_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenForm {
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenReply {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

#[derive(Default)]
pub struct Db {
    pub tasks: HashMap<String, Task>,
    pub projects: HashMap<String, Project>,
    /// Issued access tokens and when each one expires.
    pub tokens: HashMap<String, Instant>,
}

/// Shared server state: registered credentials plus the in-memory store.
#[derive(Clone)]
pub struct AppState {
    client_id: Arc<str>,
    client_secret: Arc<str>,
    token_lifetime: u64,
    token_requests: Arc<AtomicUsize>,
    db: Arc<RwLock<Db>>,
}

impl AppState {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            token_requests: Arc::new(AtomicUsize::new(0)),
            db: Arc::new(RwLock::new(Db::default())),
        }
    }

    /// Lifetime in seconds reported as `expires_in` for new tokens.
    pub fn with_token_lifetime(mut self, seconds: u64) -> Self {
        self.token_lifetime = seconds;
        self
    }

    /// Number of calls made to the token endpoint, accepted or not.
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn db(&self) -> &Arc<RwLock<Db>> {
        &self.db
    }
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/task", get(list_tasks).post(create_task))
        .route("/task/search", get(search_tasks))
        .route(
            "/task/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/project", get(list_projects).post(create_project))
        .route(
            "/project/{id}",
            patch(update_project).delete(delete_project),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/oauth/token", post(issue_token))
        .merge(api)
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenReply>, (StatusCode, Extension<ReasonPhrase>)> {
    state.token_requests.fetch_add(1, Ordering::SeqCst);
    if form.grant_type != "client_credentials"
        || form.client_id != *state.client_id
        || form.client_secret != *state.client_secret
    {
        info!(client_id = %form.client_id, "rejected token request");
        let reason = ReasonPhrase::from_static(INVALID_CLIENT_REASON.as_bytes());
        return Err((StatusCode::UNAUTHORIZED, Extension(reason)));
    }

    let token = Uuid::new_v4().simple().to_string();
    let now = Instant::now();
    let expires_at = now
        .checked_add(Duration::from_secs(state.token_lifetime))
        .unwrap_or(now + Duration::from_secs(DEFAULT_TOKEN_LIFETIME));
    let mut db = state.db.write().await;
    db.tokens.retain(|_, expiry| *expiry > now);
    db.tokens.insert(token.clone(), expires_at);
    debug!("issued access token");
    Ok(Json(TokenReply {
        access_token: token,
        token_type: "bearer".to_string(),
        expires_in: state.token_lifetime,
    }))
}

async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);
    let authorized = match token {
        Some(token) => state
            .db
            .read()
            .await
            .tokens
            .get(&token)
            .is_some_and(|expiry| Instant::now() < *expiry),
        None => false,
    };
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

/// Accepts the names the client sends as well as raw status integers.
fn parse_status(value: &str) -> Option<i32> {
    match value {
        "done" | "completed" => Some(2),
        "open" | "undone" => Some(0),
        other => other.parse().ok(),
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, StatusCode> {
    let status = match filter.status.as_deref() {
        Some(raw) => Some(parse_status(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let db = state.db.read().await;
    let tasks = db
        .tasks
        .values()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .filter(|t| filter.project_id.as_ref().map_or(true, |p| &t.project_id == p))
        .filter(|t| match (&filter.start_date, &t.due_date) {
            (Some(start), Some(due)) => due >= start,
            (Some(_), None) => false,
            (None, _) => true,
        })
        .filter(|t| match (&filter.end_date, &t.due_date) {
            (Some(end), Some(due)) => due <= end,
            (Some(_), None) => false,
            (None, _) => true,
        })
        .cloned()
        .collect();
    Ok(Json(tasks))
}

async fn search_tasks(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Task>> {
    let needle = query.keyword.to_lowercase();
    let db = state.db.read().await;
    Json(
        db.tasks
            .values()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle) || t.content.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect(),
    )
}

async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> Json<Task> {
    let task = Task {
        id: Uuid::new_v4().simple().to_string(),
        project_id: input
            .project_id
            .unwrap_or_else(|| INBOX_PROJECT_ID.to_string()),
        title: input.title,
        content: input.content,
        due_date: input.due_date,
        priority: input.priority,
        status: 0,
    };
    state.db.write().await.tasks.insert(task.id.clone(), task.clone());
    Json(task)
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, StatusCode> {
    let db = state.db.read().await;
    db.tasks.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Task>, StatusCode> {
    let mut db = state.db.write().await;
    let task = db.tasks.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        task.title = title;
    }
    if let Some(content) = input.content {
        task.content = content;
    }
    if let Some(due_date) = input.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(priority) = input.priority {
        task.priority = priority;
    }
    if let Some(status) = input.status {
        task.status = status;
    }
    if let Some(project_id) = input.project_id {
        task.project_id = project_id;
    }
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut db = state.db.write().await;
    db.tasks.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    let db = state.db.read().await;
    Json(db.projects.values().cloned().collect())
}

async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> Json<Project> {
    let project = Project {
        id: Uuid::new_v4().simple().to_string(),
        name: input.name,
        color: input.color,
    };
    state
        .db
        .write()
        .await
        .projects
        .insert(project.id.clone(), project.clone());
    Json(project)
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProject>,
) -> Result<Json<Project>, StatusCode> {
    let mut db = state.db.write().await;
    let project = db.projects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        project.name = name;
    }
    if let Some(color) = input.color {
        project.color = Some(color);
    }
    Ok(Json(project.clone()))
}

/// Removing a project removes the tasks it contains.
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut db = state.db.write().await;
    db.projects.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    db.tasks.retain(|_, task| task.project_id != id);
    Ok(StatusCode::NO_CONTENT)
}
