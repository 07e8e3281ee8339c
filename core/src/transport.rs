//! `reqwest`-backed implementation of `Transport`.

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::{Client, Method, StatusCode};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Default transport used by `TickTickClient::new`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing `reqwest::Client` (custom TLS, proxies, timeouts).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// The reason phrase the server sent, or the standard one for `status`.
///
/// hyper only records the phrase when it differs from the standard text.
fn status_text(status: StatusCode, reason: Option<&ReasonPhrase>) -> String {
    reason
        .and_then(|r| std::str::from_utf8(r.as_bytes()).ok())
        .or(status.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.client.request(to_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let status_text = status_text(status, response.extensions().get::<ReasonPhrase>());
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_reason_phrase_wins() {
        let reason = ReasonPhrase::from_static(b"Invalid Client");
        assert_eq!(
            status_text(StatusCode::UNAUTHORIZED, Some(&reason)),
            "Invalid Client"
        );
    }

    #[test]
    fn missing_phrase_falls_back_to_standard_text() {
        assert_eq!(status_text(StatusCode::UNAUTHORIZED, None), "Unauthorized");
        assert_eq!(status_text(StatusCode::from_u16(599).unwrap(), None), "");
    }
}
