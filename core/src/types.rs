//! Domain DTOs for the TickTick API.
//!
//! # Design
//! Responses are typed but lenient: every field the client does not rely on
//! defaults when missing, and unknown fields are kept in `extra` so a task
//! read from the server can be inspected without loss. Request payloads only
//! serialize the fields the caller set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Completion status as the remote API encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum TaskStatus {
    Open = 0,
    Completed = 2,
}

/// A task returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: i32,
    /// Raw status; the server may use values beyond `TaskStatus`.
    #[serde(default)]
    pub status: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed as i32
    }
}

/// Payload for `POST /task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Passed through verbatim; the format is whatever the server accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: i32,
    /// An empty id counts as no list.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub project_id: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            due_date: None,
            priority: 0,
            project_id: None,
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Place the task in the list with this id.
    pub fn list(mut self, list_id: impl Into<String>) -> Self {
        self.project_id = Some(list_id.into());
        self
    }
}

/// Partial update for `PATCH /task/{id}`. Omitted fields stay unchanged on
/// the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn move_to(list_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(list_id.into()),
            ..Self::default()
        }
    }
}

/// A list (the API calls it a project).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `POST /project`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
}

/// Partial update for `PATCH /project/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Filters for `GET /task`. Each parameter is sent only when set; a filter
/// of `"all"` sends no `status` parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub filter: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub list_id: Option<String>,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            filter: "all".to_string(),
            start_date: None,
            end_date: None,
            list_id: None,
        }
    }
}

impl TaskQuery {
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    pub fn list(mut self, list_id: impl Into<String>) -> Self {
        self.list_id = Some(list_id.into());
        self
    }

    /// `/task` with the query string, in the order status, startDate,
    /// endDate, projectId.
    pub fn to_endpoint(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if self.filter != "all" {
            params.push(format!("status={}", urlencoding::encode(&self.filter)));
        }
        let optional = [
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("projectId", &self.list_id),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push(format!("{key}={}", urlencoding::encode(value)));
            }
        }

        if params.is_empty() {
            "/task".to_string()
        } else {
            format!("/task?{}", params.join("&"))
        }
    }
}
