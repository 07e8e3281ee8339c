//! Authenticated client for the TickTick API.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `ApiCall` (method, relative endpoint, JSON body) and an async method that
//! runs it through `request`. Builders touch neither the network nor the
//! token, so the shape of every call is deterministic.
//!
//! `request` authenticates first, so an expired token is replaced on the
//! next call. The cached session sits behind an async mutex that is held for
//! the whole refresh: concurrent callers wait for the in-flight token request
//! instead of issuing their own.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{ApiCall, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::session::{Session, TokenResponse};
use crate::transport::ReqwestTransport;
use crate::types::{
    NewProject, NewTask, Project, ProjectUpdate, Task, TaskQuery, TaskStatus, TaskUpdate,
};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Async client for the task and project endpoints.
///
/// Holds the credentials and, once authenticated, a bearer token with its
/// expiry. Nothing else is cached; every read is a live call.
pub struct TickTickClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
    session: Mutex<Option<Session>>,
}

impl TickTickClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    /// Build a client from `TICKTICK_CLIENT_ID` / `TICKTICK_CLIENT_SECRET`.
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }
}

impl<T: Transport> TickTickClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Make sure a valid bearer token is cached, fetching one if needed.
    pub async fn authenticate(&self) -> Result<(), ApiError> {
        self.bearer_token().await.map(|_| ())
    }

    async fn bearer_token(&self) -> Result<String, ApiError> {
        let mut session = self.session.lock().await;
        if let Some(current) = session.as_ref().filter(|s| s.is_valid_at(Instant::now())) {
            return Ok(current.token().to_string());
        }

        debug!(url = %self.config.token_url(), "requesting access token");
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.config.token_url(),
            headers: vec![("Content-Type".to_string(), FORM.to_string())],
            body: Some(form_body(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])),
        };
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "token request rejected");
            return Err(ApiError::Authentication {
                status_text: response.status_text,
            });
        }

        let token: TokenResponse = parse_json(&response.body)?;
        debug!(expires_in = token.expires_in, "access token refreshed");
        let fresh = Session::from_response(token, Instant::now());
        let bearer = fresh.token().to_string();
        *session = Some(fresh);
        Ok(bearer)
    }

    /// Send an authorized request to `endpoint` (relative to the base URL)
    /// and parse the JSON reply.
    ///
    /// Use `serde_json::Value` as `R` for untyped pass-through.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<R, ApiError> {
        let response = self.send(method, endpoint, body).await?;
        parse_json(&response.body)
    }

    /// Run a call produced by one of the `build_*` methods.
    pub async fn execute<R: DeserializeOwned>(&self, call: &ApiCall) -> Result<R, ApiError> {
        self.request(call.method, &call.endpoint, call.body.as_ref()).await
    }

    /// Run a call whose reply body is ignored.
    async fn execute_empty(&self, call: &ApiCall) -> Result<(), ApiError> {
        self.send(call.method, &call.endpoint, call.body.as_ref())
            .await
            .map(|_| ())
    }

    async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        let token = self.bearer_token().await?;
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        debug!(method = method.as_str(), endpoint, "sending request");
        let request = HttpRequest {
            method,
            url: format!("{}{endpoint}", self.config.base_url),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {token}")),
                ("Content-Type".to_string(), JSON.to_string()),
            ],
            body,
        };
        let response = self.transport.execute(request).await?;
        check_status(&response)?;
        Ok(response)
    }

    // --- builders ---

    pub fn build_add_task(&self, task: &NewTask) -> Result<ApiCall, ApiError> {
        Ok(ApiCall::with_body(HttpMethod::Post, "/task", to_body(task)?))
    }

    pub fn build_update_task(&self, id: &str, updates: &TaskUpdate) -> Result<ApiCall, ApiError> {
        Ok(ApiCall::with_body(
            HttpMethod::Patch,
            task_path(id),
            to_body(updates)?,
        ))
    }

    pub fn build_delete_task(&self, id: &str) -> ApiCall {
        ApiCall::delete(task_path(id))
    }

    pub fn build_get_task(&self, id: &str) -> ApiCall {
        ApiCall::get(task_path(id))
    }

    pub fn build_list_tasks(&self, query: &TaskQuery) -> ApiCall {
        ApiCall::get(query.to_endpoint())
    }

    pub fn build_search_tasks(&self, keyword: &str) -> ApiCall {
        ApiCall::get(format!(
            "/task/search?keyword={}",
            urlencoding::encode(keyword)
        ))
    }

    pub fn build_create_list(&self, title: &str) -> Result<ApiCall, ApiError> {
        let body = to_body(&NewProject {
            name: title.to_string(),
        })?;
        Ok(ApiCall::with_body(HttpMethod::Post, "/project", body))
    }

    pub fn build_update_list(&self, id: &str, updates: &ProjectUpdate) -> Result<ApiCall, ApiError> {
        Ok(ApiCall::with_body(
            HttpMethod::Patch,
            project_path(id),
            to_body(updates)?,
        ))
    }

    pub fn build_delete_list(&self, id: &str) -> ApiCall {
        ApiCall::delete(project_path(id))
    }

    pub fn build_get_lists(&self) -> ApiCall {
        ApiCall::get("/project")
    }

    // --- tasks ---

    pub async fn add_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.execute(&self.build_add_task(task)?).await
    }

    pub async fn update_task(&self, id: &str, updates: &TaskUpdate) -> Result<Task, ApiError> {
        self.execute(&self.build_update_task(id, updates)?).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.execute_empty(&self.build_delete_task(id)).await
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        self.execute(&self.build_get_task(id)).await
    }

    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
        self.execute(&self.build_list_tasks(query)).await
    }

    pub async fn search_tasks(&self, keyword: &str) -> Result<Vec<Task>, ApiError> {
        self.execute(&self.build_search_tasks(keyword)).await
    }

    pub async fn complete_task(&self, id: &str) -> Result<Task, ApiError> {
        self.update_task(id, &TaskUpdate::status(TaskStatus::Completed))
            .await
    }

    pub async fn uncomplete_task(&self, id: &str) -> Result<Task, ApiError> {
        self.update_task(id, &TaskUpdate::status(TaskStatus::Open)).await
    }

    pub async fn move_task(&self, id: &str, to_list_id: &str) -> Result<Task, ApiError> {
        self.update_task(id, &TaskUpdate::move_to(to_list_id)).await
    }

    // --- lists ---

    pub async fn create_list(&self, title: &str) -> Result<Project, ApiError> {
        self.execute(&self.build_create_list(title)?).await
    }

    pub async fn update_list(&self, id: &str, updates: &ProjectUpdate) -> Result<Project, ApiError> {
        self.execute(&self.build_update_list(id, updates)?).await
    }

    pub async fn delete_list(&self, id: &str) -> Result<(), ApiError> {
        self.execute_empty(&self.build_delete_list(id)).await
    }

    pub async fn get_lists(&self) -> Result<Vec<Project>, ApiError> {
        self.execute(&self.build_get_lists()).await
    }
}

fn task_path(id: &str) -> String {
    format!("/task/{}", urlencoding::encode(id))
}

fn project_path(id: &str) -> String {
    format!("/project/{}", urlencoding::encode(id))
}

fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn parse_json<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Any non-2xx reply becomes `ApiError::Http`; 4xx and 5xx are not told apart.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
    })
}
