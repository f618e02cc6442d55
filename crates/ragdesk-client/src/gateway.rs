//! Authenticated request gateway.
//!
//! Attaches the current bearer token to every backend call and normalizes
//! failed responses into [`ClientError`]. A call without a live session
//! fails before anything is sent.

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::api::{
    ChatRequest, ChatResponse, DeleteFileRequest, DeleteFileResponse, FileListResponse, FileQuery,
    FileRecord, HealthResponse, UploadPayload,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionProvider;

/// Outgoing request body.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Sent as `multipart/form-data`; the transport sets the boundary.
    Multipart(UploadPayload),
}

/// Per-call credentials derived from the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    authorization: String,
}

impl RequestContext {
    fn from_token(token: &str) -> Self {
        Self {
            authorization: format!("Bearer {}", token),
        }
    }

    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

/// HTTP gateway to the RAG backend.
#[derive(Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base_url: Option<String>,
    session: Arc<SessionProvider>,
}

impl Gateway {
    pub fn new(config: &ClientConfig, session: Arc<SessionProvider>) -> Self {
        let base_url = config.api_base_url().ok();
        if base_url.is_none() {
            tracing::warn!("api.base_url is not configured; backend calls will fail");
        }
        Self::build(base_url, session, Duration::from_secs(config.api.timeout_secs))
    }

    pub fn with_base_url(base_url: &str, session: Arc<SessionProvider>) -> Self {
        Self::build(
            Some(base_url.trim_end_matches('/').to_string()),
            session,
            Duration::from_secs(30),
        )
    }

    fn build(base_url: Option<String>, session: Arc<SessionProvider>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionProvider> {
        &self.session
    }

    fn url(&self, path: &str) -> ClientResult<String> {
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| ClientError::Config("api.base_url is not set".to_string()))?;
        Ok(format!("{}/{}", base, path.trim_start_matches('/')))
    }

    async fn request_context(&self) -> ClientResult<RequestContext> {
        let token = self
            .session
            .get_token()
            .await
            .filter(|token| !token.is_empty())
            .ok_or_else(ClientError::no_token)?;
        Ok(RequestContext::from_token(&token))
    }

    /// Issue an authenticated call and return the parsed JSON body.
    pub async fn authorized_request(
        &self,
        path: &str,
        method: Method,
        body: RequestBody,
    ) -> ClientResult<serde_json::Value> {
        let context = self.request_context().await?;
        let url = self.url(path)?;

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, context.authorization());

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(payload) => request.multipart(payload.into_form()?),
        };

        tracing::debug!(%method, path, "Sending backend request");
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = ClientError::from_response(status.as_u16(), &text);
            tracing::warn!(%method, path, status = status.as_u16(), kind = err.kind(), error = %err, "Backend request failed");
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Schema {
            endpoint: path.to_string(),
            reason: format!("response is not JSON: {}", e),
        })
    }

    /// Authenticated call decoded into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: RequestBody,
    ) -> ClientResult<T> {
        let value = self.authorized_request(path, method, body).await?;
        decode(path, value)
    }

    /// `POST /chat`
    pub async fn chat(&self, message: &str) -> ClientResult<ChatResponse> {
        let body = serde_json::to_value(ChatRequest {
            message: message.to_string(),
        })
        .map_err(|e| ClientError::Validation(e.to_string()))?;
        self.request("/chat", Method::POST, RequestBody::Json(body)).await
    }

    /// `GET /admin/files`
    pub async fn list_files(&self, query: &FileQuery) -> ClientResult<FileListResponse> {
        let path = format!("/admin/files{}", query.to_query_string());
        self.request(&path, Method::GET, RequestBody::Empty).await
    }

    /// `POST /admin/upload`
    pub async fn upload_file(&self, payload: UploadPayload) -> ClientResult<FileRecord> {
        self.request("/admin/upload", Method::POST, RequestBody::Multipart(payload))
            .await
    }

    /// `POST /admin/delete`
    pub async fn delete_file(&self, file_id: Uuid) -> ClientResult<DeleteFileResponse> {
        let body = serde_json::to_value(DeleteFileRequest { file_id })
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        self.request("/admin/delete", Method::POST, RequestBody::Json(body))
            .await
    }

    /// `GET /health`, unauthenticated.
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let url = self.url("/health")?;
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::from_response(status.as_u16(), &text));
        }

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| ClientError::Schema {
            endpoint: "/health".to_string(),
            reason: e.to_string(),
        })?;
        decode("/health", value)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: serde_json::Value) -> ClientResult<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Schema {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}
