//! Feature workflows and dispatch.
//!
//! Each workflow handles the [`Action`]s of one entry point. The registry
//! routes an action to its workflow and turns any error into a rendered
//! status message, so a failed call never escapes as a panic or an
//! unhandled error.

mod admin;
mod chat;
mod login;

pub use admin::{AdminWorkflow, AutoConfirm, Confirm};
pub use chat::ChatWorkflow;
pub use login::LoginWorkflow;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::FileStatus;
use crate::error::{ClientError, ClientResult};
use crate::page::Page;

/// User interactions.
#[derive(Debug, Clone)]
pub enum Action {
    Login { email: String, password: String },
    Logout,
    SubmitChat { message: String },
    RefreshFiles { status: Option<FileStatus> },
    /// `None` when no file was selected.
    UploadFile { path: Option<PathBuf> },
    DeleteFile { file_id: String },
}

impl Action {
    /// Name of the workflow that handles this action.
    pub fn workflow(&self) -> &'static str {
        match self {
            Action::Login { .. } | Action::Logout => login::NAME,
            Action::SubmitChat { .. } => chat::NAME,
            Action::RefreshFiles { .. } | Action::UploadFile { .. } | Action::DeleteFile { .. } => {
                admin::NAME
            }
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Completed,
    /// Nothing to do, no call was made.
    Skipped,
    /// The error was rendered on the page.
    Failed(ClientError),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

#[async_trait]
pub trait Workflow: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, action: Action, page: &Page) -> ClientResult<Outcome>;
}

/// Routes actions to registered workflows.
pub struct WorkflowRegistry {
    workflows: HashMap<String, Arc<dyn Workflow>>,
    page: Page,
}

impl WorkflowRegistry {
    pub fn new(page: Page) -> Self {
        Self {
            workflows: HashMap::new(),
            page,
        }
    }

    pub fn register<W: Workflow + 'static>(&mut self, workflow: W) {
        let name = workflow.name().to_string();
        self.workflows.insert(name, Arc::new(workflow));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Workflow>> {
        self.workflows.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.workflows.contains_key(name)
    }

    pub fn list(&self) -> Vec<&str> {
        self.workflows.keys().map(|s| s.as_str()).collect()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Run `action` and render any failure.
    pub async fn dispatch(&self, action: Action) -> Outcome {
        let name = action.workflow();
        let Some(workflow) = self.get(name) else {
            let err = ClientError::Config(format!("no workflow registered for '{}'", name));
            self.page.error(err.to_string());
            return Outcome::Failed(err);
        };

        match workflow.handle(action, &self.page).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(workflow = name, kind = err.kind(), error = %err, "Workflow failed");
                self.page.error(err.to_string());
                Outcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageEvent, StatusLevel};

    struct MockChat {
        fail: bool,
    }

    #[async_trait]
    impl Workflow for MockChat {
        fn name(&self) -> &'static str {
            chat::NAME
        }

        async fn handle(&self, _action: Action, _page: &Page) -> ClientResult<Outcome> {
            if self.fail {
                Err(ClientError::BackendRequest {
                    status: 500,
                    message: "index unavailable".to_string(),
                })
            } else {
                Ok(Outcome::Completed)
            }
        }
    }

    fn chat_action() -> Action {
        Action::SubmitChat {
            message: "hello".to_string(),
        }
    }

    #[test]
    fn test_action_routing() {
        assert_eq!(Action::Logout.workflow(), "login");
        assert_eq!(chat_action().workflow(), "chat");
        assert_eq!(Action::UploadFile { path: None }.workflow(), "admin");
    }

    #[test]
    fn test_registry_register() {
        let (page, _rx) = Page::channel();
        let mut registry = WorkflowRegistry::new(page);
        registry.register(MockChat { fail: false });

        assert!(registry.has("chat"));
        assert!(!registry.has("admin"));
        assert_eq!(registry.list(), vec!["chat"]);
    }

    #[tokio::test]
    async fn test_dispatch_renders_errors() {
        let (page, mut rx) = Page::channel();
        let mut registry = WorkflowRegistry::new(page);
        registry.register(MockChat { fail: true });

        let outcome = registry.dispatch(chat_action()).await;
        assert!(matches!(outcome, Outcome::Failed(ClientError::BackendRequest { status: 500, .. })));
        assert!(matches!(
            rx.try_recv().unwrap(),
            PageEvent::Status { level: StatusLevel::Error, ref text } if text == "index unavailable"
        ));
    }

    #[tokio::test]
    async fn test_dispatch_unregistered() {
        let (page, mut rx) = Page::channel();
        let registry = WorkflowRegistry::new(page);

        let outcome = registry.dispatch(Action::Logout).await;
        assert!(matches!(outcome, Outcome::Failed(ClientError::Config(_))));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_completed() {
        let (page, _rx) = Page::channel();
        let mut registry = WorkflowRegistry::new(page);
        registry.register(MockChat { fail: false });

        assert!(registry.dispatch(chat_action()).await.is_completed());
    }
}
