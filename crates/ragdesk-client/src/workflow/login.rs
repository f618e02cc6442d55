use async_trait::async_trait;
use std::sync::Arc;

use super::{Action, Outcome, Workflow};
use crate::error::{ClientError, ClientResult};
use crate::page::{Control, Navigator, Page, Route, StatusLevel};
use crate::session::SessionProvider;

pub(super) const NAME: &str = "login";

pub struct LoginWorkflow {
    session: Arc<SessionProvider>,
}

impl LoginWorkflow {
    pub fn new(session: Arc<SessionProvider>) -> Self {
        Self { session }
    }

    async fn login(&self, email: &str, password: &str, page: &Page) -> ClientResult<Outcome> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "email and password are required".to_string(),
            ));
        }

        page.set_enabled(Control::Login, false);
        let result = self.session.login(email, password).await;
        page.set_enabled(Control::Login, true);

        let session = result?;
        page.status(
            StatusLevel::Success,
            format!("Signed in as {}", session.user.email),
        );
        page.redirect(Route::Chat);
        Ok(Outcome::Completed)
    }

    /// Always ends on the login entry point. A failed remote sign-out is
    /// shown as a warning since the local session is already gone.
    async fn logout(&self, page: &Page) -> ClientResult<Outcome> {
        match self.session.logout().await {
            Ok(()) => page.status(StatusLevel::Info, "Signed out"),
            Err(e) => page.status(
                StatusLevel::Warning,
                format!("Signed out locally, but the identity service reported: {}", e),
            ),
        }
        page.redirect(Route::Login);
        Ok(Outcome::Completed)
    }
}

#[async_trait]
impl Workflow for LoginWorkflow {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn handle(&self, action: Action, page: &Page) -> ClientResult<Outcome> {
        match action {
            Action::Login { email, password } => self.login(&email, &password, page).await,
            Action::Logout => self.logout(page).await,
            other => Err(ClientError::Validation(format!(
                "{} actions are not handled by login",
                other.workflow()
            ))),
        }
    }
}
