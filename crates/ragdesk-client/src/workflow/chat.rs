use async_trait::async_trait;
use std::sync::Arc;

use super::{Action, Outcome, Workflow};
use crate::error::{ClientError, ClientResult};
use crate::gateway::Gateway;
use crate::page::{Control, Page, PageEvent, SourceLine};

pub(super) const NAME: &str = "chat";

/// Sends a question and renders the answer with its sources.
pub struct ChatWorkflow {
    gateway: Arc<Gateway>,
}

impl ChatWorkflow {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    async fn submit(&self, message: &str, page: &Page) -> ClientResult<Outcome> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(Outcome::Skipped);
        }

        page.emit(PageEvent::UserMessage(message.to_string()));

        // Submit stays disabled for the whole call, success or failure.
        page.set_enabled(Control::ChatSubmit, false);
        let result = self.gateway.chat(message).await;
        page.set_enabled(Control::ChatSubmit, true);

        let response = result?;
        tracing::debug!(sources = response.sources.len(), "Chat answer received");
        page.emit(PageEvent::Answer {
            sources: response.sources.iter().map(SourceLine::from).collect(),
            text: response.answer,
        });
        Ok(Outcome::Completed)
    }
}

#[async_trait]
impl Workflow for ChatWorkflow {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn handle(&self, action: Action, page: &Page) -> ClientResult<Outcome> {
        match action {
            Action::SubmitChat { message } => self.submit(&message, page).await,
            other => Err(ClientError::Validation(format!(
                "{} actions are not handled by chat",
                other.workflow()
            ))),
        }
    }
}
