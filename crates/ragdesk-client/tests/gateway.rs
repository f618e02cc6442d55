mod common;

use ragdesk_client::api::{FileQuery, FileStatus, UploadPayload};
use ragdesk_client::config::UploadConfig;
use ragdesk_client::{ClientError, RequestBody, FALLBACK_ERROR_MESSAGE};
use reqwest::Method;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use common::{harness, PASSWORD};

#[tokio::test]
async fn no_session_sends_nothing() {
    let h = harness("").await;

    let err = h
        .gateway
        .authorized_request("/chat", Method::POST, RequestBody::Json(json!({"message": "hi"})))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Authentication(_)));
    assert_eq!(err.to_string(), "no token available");
    assert_eq!(h.server.state.backend_hits(), 0);

    assert_err!(h.gateway.list_files(&FileQuery::default()).await);
    assert_eq!(h.server.state.backend_hits(), 0);
}

#[tokio::test]
async fn bearer_token_attached() {
    let h = harness("").await;
    assert_ok!(h.session.login("user@example.com", PASSWORD).await);

    let value = h
        .gateway
        .authorized_request("/admin/files", Method::GET, RequestBody::Empty)
        .await
        .unwrap();

    assert_eq!(value["total"], 1);
    let request = h.server.state.last_request();
    assert_eq!(request.authorization.as_deref(), Some("Bearer access-1"));
    assert_eq!(request.method, "GET");
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn detail_message_passed_through() {
    let h = harness("").await;
    h.session.login("user@example.com", PASSWORD).await.unwrap();
    h.server
        .state
        .fail_next(400, r#"{"detail":"Message must not exceed 2000 characters"}"#);

    let err = h.gateway.chat("hello").await.unwrap_err();
    match err {
        ClientError::BackendRequest { status, ref message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Message must not exceed 2000 characters");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn fallback_message_without_detail() {
    let h = harness("").await;
    h.session.login("user@example.com", PASSWORD).await.unwrap();

    h.server.state.fail_next(500, "Internal Server Error");
    let err = h.gateway.chat("hello").await.unwrap_err();
    assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);

    h.server.state.fail_next(502, r#"{"error":"bad gateway"}"#);
    let err = h.gateway.chat("hello").await.unwrap_err();
    assert!(matches!(err, ClientError::BackendRequest { status: 502, .. }));
    assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);
}

#[tokio::test]
async fn status_classification() {
    let h = harness("").await;
    h.session.login("user@example.com", PASSWORD).await.unwrap();

    h.server.state.fail_next(401, r#"{"detail":"Invalid token"}"#);
    let err = h.gateway.chat("hello").await.unwrap_err();
    assert!(matches!(err, ClientError::Authentication(ref m) if m == "Invalid token"));

    h.server.state.fail_next(403, r#"{"detail":"Admin access required"}"#);
    let err = h.gateway.list_files(&FileQuery::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Authorization(ref m) if m == "Admin access required"));
}

#[tokio::test]
async fn chat_sends_message_body() {
    let h = harness("").await;
    h.session.login("user@example.com", PASSWORD).await.unwrap();

    let response = h.gateway.chat("test question").await.unwrap();
    assert_eq!(response.answer, "Paris is the capital of France.");
    assert_eq!(response.sources.len(), 2);
    assert_eq!(response.sources[0].similarity_percent(), "82.3%");

    let request = h.server.state.last_request();
    assert_eq!(request.path, "/chat");
    assert_eq!(request.json(), json!({"message": "test question"}));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn list_files_with_status_filter() {
    let h = harness("").await;
    h.session.login("user@example.com", PASSWORD).await.unwrap();

    let listing = h
        .gateway
        .list_files(&FileQuery::with_status(FileStatus::Indexed))
        .await
        .unwrap();
    assert_eq!(listing.files[0].file_name, "handbook.pdf");

    let request = h.server.state.last_request();
    assert_eq!(request.path, "/admin/files");
    assert_eq!(request.query.as_deref(), Some("status=indexed"));
}

#[tokio::test]
async fn upload_is_multipart_with_boundary() {
    let h = harness("").await;
    h.session.login("admin@example.com", PASSWORD).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# Notes\n").unwrap();
    let payload = UploadPayload::read(&path, &UploadConfig::default()).await.unwrap();

    let record = h.gateway.upload_file(payload).await.unwrap();
    assert_eq!(record.status, FileStatus::Indexing);

    let request = h.server.state.last_request();
    let content_type = request.content_type.unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains(r#"name="file"; filename="notes.md""#));
    assert!(body.contains("# Notes"));
}

#[tokio::test]
async fn delete_sends_file_id() {
    let h = harness("").await;
    h.session.login("admin@example.com", PASSWORD).await.unwrap();

    let id = common::FILE_ID.parse().unwrap();
    let response = h.gateway.delete_file(id).await.unwrap();
    assert_eq!(response.file_id, id);
    assert_eq!(h.server.state.last_request().json(), json!({"file_id": common::FILE_ID}));
}

#[tokio::test]
async fn unknown_path_reports_detail() {
    let h = harness("").await;
    h.session.login("user@example.com", PASSWORD).await.unwrap();

    let err = h
        .gateway
        .authorized_request("/unknown", Method::GET, RequestBody::Empty)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::BackendRequest { status: 404, ref message } if message == "Not Found"));
}

#[tokio::test]
async fn health_needs_no_session() {
    let h = harness("").await;
    let health = h.gateway.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(h.server.state.last_request().authorization, None);
}
