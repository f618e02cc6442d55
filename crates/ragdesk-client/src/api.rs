//! Typed request and response schemas for the RAG backend.
//!
//! The gateway decodes every successful response into one of these types;
//! a mismatch surfaces as [`ClientError::Schema`](crate::ClientError::Schema).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{ClientError, ClientResult};

/// `POST /chat` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
}

/// `POST /chat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// A chunk the answer was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub file_name: String,
    /// Cosine similarity in [0.0, 1.0].
    pub similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Source {
    /// Similarity as a percentage with one decimal, e.g. `82.3%`.
    pub fn similarity_percent(&self) -> String {
        format_similarity(self.similarity)
    }
}

pub fn format_similarity(similarity: f64) -> String {
    format!("{:.1}%", similarity * 100.0)
}

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploaded,
    Indexing,
    Indexed,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploaded => "uploaded",
            FileStatus::Indexing => "indexing",
            FileStatus::Indexed => "indexed",
            FileStatus::Error => "error",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(FileStatus::Uploaded),
            "indexing" => Ok(FileStatus::Indexing),
            "indexed" => Ok(FileStatus::Indexed),
            "error" => Ok(FileStatus::Error),
            other => Err(ClientError::Validation(format!(
                "unknown file status '{}' (expected uploaded, indexing, indexed or error)",
                other
            ))),
        }
    }
}

/// File metadata as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub file_name: String,
    pub created_at: String,
    pub status: FileStatus,
    #[serde(default)]
    pub chunk_count: u64,
    #[serde(default)]
    pub embedding_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// `GET /admin/files` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `GET /admin/files` filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub status: Option<FileStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl FileQuery {
    pub fn with_status(status: FileStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Query string including the leading `?`, empty without filters.
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(format!("status={}", status));
        }
        if let Some(limit) = self.limit {
            pairs.push(format!("limit={}", limit));
        }
        if let Some(offset) = self.offset {
            pairs.push(format!("offset={}", offset));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

/// `POST /admin/delete` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileRequest {
    pub file_id: Uuid,
}

/// `POST /admin/delete` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub message: String,
    pub file_id: Uuid,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// File contents staged for `POST /admin/upload`.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadPayload {
    /// Read `path`, applying the local extension and size checks.
    pub async fn read(path: &Path, rules: &UploadConfig) -> ClientResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Validation(format!("not a file: {}", path.display())))?
            .to_string();

        let extension = extension_of(&file_name);
        if !rules.allowed_extensions.iter().any(|ext| ext.eq_ignore_ascii_case(&extension)) {
            return Err(ClientError::Validation(format!(
                "unsupported file type: {} (allowed: {})",
                if extension.is_empty() { "unknown" } else { extension.as_str() },
                rules.allowed_extensions.join(", ")
            )));
        }

        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > rules.max_file_size {
            return Err(ClientError::Validation(format!(
                "file too large: {} bytes (max: {} bytes)",
                metadata.len(),
                rules.max_file_size
            )));
        }

        let bytes = tokio::fs::read(path).await?;
        Ok(Self {
            mime_type: mime_for(&extension).to_string(),
            file_name,
            bytes,
        })
    }

    pub(crate) fn into_form(self) -> ClientResult<reqwest::multipart::Form> {
        let part = reqwest::multipart::Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime_type)?;
        Ok(reqwest::multipart::Form::new().part("file", part))
    }
}

/// Lower-cased extension including the dot, or empty.
fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{}", ext.to_ascii_lowercase()),
        _ => String::new(),
    }
}

fn mime_for(extension: &str) -> &'static str {
    match extension {
        ".txt" => "text/plain",
        ".md" => "text/markdown",
        ".pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
