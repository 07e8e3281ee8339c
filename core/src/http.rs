//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are described as plain data. `TickTickClient`
//! builds `HttpRequest` values and interprets `HttpResponse` values; the
//! round-trip itself goes through a `Transport`. The default transport is
//! `ReqwestTransport`; tests plug in a recording transport instead, which is
//! how token caching and header shape are observed without a network.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// `status_text` is the reason phrase ("Unauthorized", ...), surfaced in
/// authentication errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A domain call relative to the API base URL, before authorization.
///
/// Produced by the `TickTickClient::build_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: HttpMethod,
    pub endpoint: String,
    pub body: Option<Value>,
}

impl ApiCall {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            endpoint: endpoint.into(),
            body: None,
        }
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            endpoint: endpoint.into(),
            body: None,
        }
    }

    pub fn with_body(method: HttpMethod, endpoint: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: Some(body),
        }
    }
}

/// Executes a single HTTP round-trip.
///
/// Implementations return non-2xx responses as data; only failures that
/// prevent a response (DNS, connection, TLS) become `ApiError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}
