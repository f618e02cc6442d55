use async_trait::async_trait;

use super::types::{Session, UserIdentity};
use crate::error::ClientResult;

/// Remote identity service.
///
/// Implementations talk to the provider only; session storage and expiry
/// decisions belong to [`super::SessionProvider`].
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session>;

    /// Resolve the user that owns `access_token`.
    async fn get_user(&self, access_token: &str) -> ClientResult<UserIdentity>;

    /// Exchange a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> ClientResult<Session>;

    /// Invalidate the remote session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> ClientResult<()>;
}
