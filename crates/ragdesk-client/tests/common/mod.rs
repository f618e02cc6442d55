//! In-process fake of the identity service and the RAG backend.
//!
//! One axum server on an ephemeral port answers both `/auth/v1/*` and the
//! backend routes, counting hits and recording every backend request.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ragdesk_client::{ClientConfig, Gateway, MemoryStore, SessionProvider};

pub const PASSWORD: &str = "secret";
pub const FILE_ID: &str = "0b9ab0a4-2d3c-4a43-9c55-0a0c4d0e8a11";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Default)]
pub struct FakeState {
    pub identity_hits: AtomicUsize,
    pub backend_hits: AtomicUsize,
    pub logout_hits: AtomicUsize,
    pub fail_logout: AtomicBool,
    /// Served once instead of the normal backend response.
    pub next_failure: Mutex<Option<(u16, String)>>,
    /// Served for every request to this path.
    pub failing_path: Mutex<Option<(String, u16, String)>>,
    pub requests: Mutex<Vec<Recorded>>,
    email: Mutex<String>,
}

impl FakeState {
    pub fn fail_next(&self, status: u16, body: &str) {
        *self.next_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn fail_path(&self, path: &str, status: u16, body: &str) {
        *self.failing_path.lock().unwrap() = Some((path.to_string(), status, body.to_string()));
    }

    pub fn backend_hits(&self) -> usize {
        self.backend_hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Recorded {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

pub struct FakeServer {
    pub url: String,
    pub state: Arc<FakeState>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/user", get(user))
            .route("/auth/v1/logout", post(logout))
            .fallback(backend)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self, admins: &str) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.identity.url = Some(self.url.clone());
        config.identity.anon_key = Some("anon-key".to_string());
        config.api.base_url = Some(self.url.clone());
        config.admin.emails = admins.to_string();
        config
    }
}

/// Wired client against a fresh fake server.
pub struct Harness {
    pub server: FakeServer,
    pub store: Arc<MemoryStore>,
    pub session: Arc<SessionProvider>,
    pub gateway: Arc<Gateway>,
}

pub async fn harness(admins: &str) -> Harness {
    let server = FakeServer::start().await;
    let config = server.config(admins);
    let store = Arc::new(MemoryStore::new());
    let session = Arc::new(SessionProvider::new(&config, store.clone()));
    let gateway = Arc::new(Gateway::new(&config, session.clone()));
    Harness {
        server,
        store,
        session,
        gateway,
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn token_body(access: &str, refresh: &str, email: &str) -> Value {
    json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": refresh,
        "user": { "id": "8f1c2d3e-0000-4000-8000-000000000001", "email": email }
    })
}

async fn token(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    state.identity_hits.fetch_add(1, Ordering::SeqCst);
    let grant = query.get("grant_type").map(String::as_str);

    match grant {
        Some("password") => {
            let email = body["email"].as_str().unwrap_or_default().to_string();
            if body["password"] != PASSWORD {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "invalid_grant", "error_description": "Invalid login credentials"})),
                )
                    .into_response();
            }
            *state.email.lock().unwrap() = email.clone();
            Json(token_body("access-1", "refresh-1", &email)).into_response()
        }
        Some("refresh_token") if body["refresh_token"] == "refresh-1" => {
            let email = state.email.lock().unwrap().clone();
            Json(token_body("access-2", "refresh-2", &email)).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Invalid Refresh Token"})),
        )
            .into_response(),
    }
}

async fn user(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    state.identity_hits.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers).as_deref() {
        Some("access-1") | Some("access-2") => {
            let email = state.email.lock().unwrap().clone();
            Json(json!({ "id": "8f1c2d3e-0000-4000-8000-000000000001", "email": email })).into_response()
        }
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"msg": "invalid JWT"}))).into_response(),
    }
}

async fn logout(State(state): State<Arc<FakeState>>) -> Response {
    state.identity_hits.fetch_add(1, Ordering::SeqCst);
    state.logout_hits.fetch_add(1, Ordering::SeqCst);
    if state.fail_logout.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"msg": "logout failed"}))).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn file_record(name: &str, status: &str) -> Value {
    json!({
        "id": FILE_ID,
        "file_name": name,
        "created_at": "2024-05-01T10:00:00+00:00",
        "status": status,
        "chunk_count": 3,
        "embedding_count": 3
    })
}

async fn backend(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.backend_hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    if let Some((status, body)) = state.next_failure.lock().unwrap().take() {
        return (StatusCode::from_u16(status).unwrap(), body).into_response();
    }
    if let Some((_, status, body)) = state
        .failing_path
        .lock()
        .unwrap()
        .clone()
        .filter(|(path, _, _)| path == uri.path())
    {
        return (StatusCode::from_u16(status).unwrap(), body).into_response();
    }

    match (method.as_str(), uri.path()) {
        ("GET", "/health") => Json(json!({"status": "healthy", "timestamp": "2024-05-01T10:00:00"})).into_response(),
        ("POST", "/chat") => Json(json!({
            "answer": "Paris is the capital of France.",
            "sources": [
                {"file_name": "geography.md", "similarity": 0.823, "chunk_id": "c1"},
                {"file_name": "atlas.pdf", "similarity": 0.5}
            ]
        }))
        .into_response(),
        ("GET", "/admin/files") => Json(json!({
            "files": [file_record("handbook.pdf", "indexed")],
            "total": 1
        }))
        .into_response(),
        ("POST", "/admin/upload") => Json(file_record("notes.md", "indexing")).into_response(),
        ("POST", "/admin/delete") => {
            let request: Value = serde_json::from_slice(&body).unwrap_or_default();
            Json(json!({
                "message": "File deleted successfully",
                "file_id": request["file_id"]
            }))
            .into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not Found"}))).into_response(),
    }
}
