use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::{Action, Outcome, Workflow};
use crate::api::{FileQuery, FileStatus, UploadPayload};
use crate::config::UploadConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::Gateway;
use crate::page::{Control, Page, PageEvent, StatusLevel};

pub(super) const NAME: &str = "admin";

/// Asks the user to confirm a destructive step.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// File listing, upload and deletion for the admin entry point.
pub struct AdminWorkflow {
    gateway: Arc<Gateway>,
    rules: UploadConfig,
    confirm: Arc<dyn Confirm>,
}

impl AdminWorkflow {
    pub fn new(gateway: Arc<Gateway>, rules: UploadConfig, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            gateway,
            rules,
            confirm,
        }
    }

    async fn refresh(&self, status: Option<FileStatus>, page: &Page) -> ClientResult<Outcome> {
        let query = FileQuery {
            status,
            ..Default::default()
        };
        let listing = self.gateway.list_files(&query).await?;
        tracing::debug!(files = listing.files.len(), total = ?listing.total, "File list loaded");
        page.emit(PageEvent::FileTable(listing.files));
        Ok(Outcome::Completed)
    }

    /// Re-list after a change. The change already went through, so a
    /// failed listing is only a warning.
    async fn relist(&self, page: &Page) {
        if let Err(e) = self.refresh(None, page).await {
            tracing::warn!(kind = e.kind(), error = %e, "File list refresh failed after change");
            page.status(
                StatusLevel::Warning,
                format!("Could not refresh the file list: {}", e),
            );
        }
    }

    async fn upload(&self, path: &Path, page: &Page) -> ClientResult<Outcome> {
        let payload = UploadPayload::read(path, &self.rules).await?;
        let file_name = payload.file_name.clone();
        page.status(StatusLevel::Info, format!("Uploading {}...", file_name));

        page.set_enabled(Control::Upload, false);
        let result = self.gateway.upload_file(payload).await;
        page.set_enabled(Control::Upload, true);

        let record = result?;
        tracing::info!(file = %record.file_name, id = %record.id, status = %record.status, "File uploaded");
        page.status(
            StatusLevel::Success,
            format!("Uploaded {} ({})", record.file_name, record.status),
        );
        self.relist(page).await;
        Ok(Outcome::Completed)
    }

    async fn delete(&self, raw_id: &str, page: &Page) -> ClientResult<Outcome> {
        let file_id = Uuid::parse_str(raw_id.trim())
            .map_err(|e| ClientError::Validation(format!("invalid file id '{}': {}", raw_id, e)))?;

        if !self.confirm.confirm(&format!("Delete file {}?", file_id)) {
            tracing::debug!(%file_id, "Delete declined");
            return Ok(Outcome::Skipped);
        }

        page.set_enabled(Control::Delete, false);
        let result = self.gateway.delete_file(file_id).await;
        page.set_enabled(Control::Delete, true);

        let response = result?;
        tracing::info!(file_id = %response.file_id, "File deleted");
        page.status(StatusLevel::Success, response.message);
        self.relist(page).await;
        Ok(Outcome::Completed)
    }
}

#[async_trait]
impl Workflow for AdminWorkflow {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn handle(&self, action: Action, page: &Page) -> ClientResult<Outcome> {
        match action {
            Action::RefreshFiles { status } => self.refresh(status, page).await,
            Action::UploadFile { path: None } => Ok(Outcome::Skipped),
            Action::UploadFile { path: Some(path) } => self.upload(&path, page).await,
            Action::DeleteFile { file_id } => self.delete(&file_id, page).await,
            other => Err(ClientError::Validation(format!(
                "{} actions are not handled by admin",
                other.workflow()
            ))),
        }
    }
}
