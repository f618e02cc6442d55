//! Page guard.
//!
//! Point-in-time checks run when a protected entry point is opened. There is
//! no background re-check: a session that expires later is noticed by the
//! next failing call.

use std::sync::Arc;

use crate::page::{Navigator, Route};
use crate::session::SessionProvider;

pub struct PageGuard {
    session: Arc<SessionProvider>,
    navigator: Arc<dyn Navigator>,
}

impl PageGuard {
    pub fn new(session: Arc<SessionProvider>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    /// Redirects to the login entry point unless a user is resolvable.
    pub async fn require_auth(&self) -> bool {
        match self.session.get_current_user().await {
            Some(user) => {
                tracing::debug!(user = %user.email, "Page guard passed");
                true
            }
            None => {
                tracing::info!("No authenticated user, redirecting to login");
                self.navigator.redirect(Route::Login);
                false
            }
        }
    }

    /// As [`require_auth`](Self::require_auth), then redirects non-admins to
    /// the chat entry point. Client-side gating only.
    pub async fn require_admin(&self) -> bool {
        if !self.require_auth().await {
            return false;
        }
        if self.session.is_admin().await {
            return true;
        }
        tracing::info!("User is not on the admin allow-list, redirecting to chat");
        self.navigator.redirect(Route::Chat);
        false
    }
}
