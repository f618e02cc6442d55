//! Session provider.
//!
//! Single source of truth for who the current actor is and whether they are
//! authenticated. Holds one lazily created identity client handle, reused
//! for the provider's lifetime, plus the session store the handle persists
//! into.

mod backend;
mod store;
mod supabase;
mod types;

pub use backend::IdentityBackend;
pub use store::{FileStore, MemoryStore, SessionStore};
pub use supabase::SupabaseAuth;
pub use types::{Session, UserIdentity, EXPIRY_MARGIN_SECS};

use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AdminAllowList, ClientConfig, IdentityConfig};
use crate::error::{ClientError, ClientResult};
use crate::result_ext::{OptionResultExt, ResultExt};

pub struct SessionProvider {
    identity: IdentityConfig,
    timeout: Duration,
    admins: AdminAllowList,
    store: Arc<dyn SessionStore>,
    handle: OnceCell<Arc<dyn IdentityBackend>>,
}

impl SessionProvider {
    /// Provider whose identity client is built from `config` on first use.
    pub fn new(config: &ClientConfig, store: Arc<dyn SessionStore>) -> Self {
        let admins = config.admin_allow_list();
        if admins.is_empty() {
            tracing::debug!("No admin emails configured, admin page is unreachable");
        }
        Self {
            identity: config.identity.clone(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            admins,
            store,
            handle: OnceCell::new(),
        }
    }

    /// Provider with an already constructed identity client.
    pub fn with_backend(
        backend: Arc<dyn IdentityBackend>,
        store: Arc<dyn SessionStore>,
        admins: AdminAllowList,
    ) -> Self {
        Self {
            identity: IdentityConfig::default(),
            timeout: Duration::from_secs(30),
            admins,
            store,
            handle: OnceCell::with_value(backend),
        }
    }

    fn client(&self) -> ClientResult<&Arc<dyn IdentityBackend>> {
        self.handle.get_or_try_init(|| {
            let url = non_empty(&self.identity.url)
                .ok_or_else(|| ClientError::Config("identity.url is not set".to_string()))?;
            let anon_key = non_empty(&self.identity.anon_key)
                .ok_or_else(|| ClientError::Config("identity.anon_key is not set".to_string()))?;

            tracing::debug!(url, "Creating identity client");
            let backend: Arc<dyn IdentityBackend> =
                Arc::new(SupabaseAuth::new(url, anon_key, self.timeout));
            Ok(backend)
        })
    }

    /// Current session from the store, refreshed when expired.
    ///
    /// A refresh the provider rejects discards the stored session. Transport
    /// failures are returned so that an offline client is not logged out.
    async fn current_session(&self) -> ClientResult<Option<Session>> {
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            tracing::info!(user = %session.user.email, "Session expired without refresh token");
            self.store.clear()?;
            return Ok(None);
        };

        match self.client()?.refresh_session(refresh_token).await {
            Ok(renewed) => {
                tracing::debug!(user = %renewed.user.email, expires_at = %renewed.expires_at, "Session refreshed");
                self.store.save(&renewed)?;
                Ok(Some(renewed))
            }
            Err(ClientError::Authentication(reason)) => {
                tracing::info!(%reason, "Session refresh rejected, discarding session");
                self.store.clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The authenticated user, verified against the identity service.
    ///
    /// Never errors: failures are logged and reported as `None`.
    pub async fn get_current_user(&self) -> Option<UserIdentity> {
        let session = self
            .current_session()
            .await
            .warn_ok("resolving current session")
            .flatten()?;
        let client = self.client().warn_ok("creating identity client")?;
        client
            .get_user(&session.access_token)
            .await
            .warn_ok("verifying session with identity service")
    }

    /// Sign in with email and password, storing the new session.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let session = self.client()?.sign_in_with_password(email, password).await?;
        self.store.save(&session)?;
        tracing::info!(user = %session.user.email, user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Sign out. The local session is cleared before the remote call, so
    /// callers can treat the user as logged out even when this errors.
    pub async fn logout(&self) -> ClientResult<()> {
        let session = self.store.load().warn_ok("reading session for logout").flatten();
        self.store.clear()?;

        let Some(session) = session else {
            return Ok(());
        };

        self.client()?
            .sign_out(&session.access_token)
            .await
            .map_err(|e| match e {
                ClientError::Authentication(_) => e,
                other => ClientError::Authentication(other.to_string()),
            })
            .log("signing out")?;

        tracing::info!(user = %session.user.email, "Signed out");
        Ok(())
    }

    /// Access token of a live session, re-read on every call.
    pub async fn get_token(&self) -> Option<String> {
        self.current_session()
            .await
            .warn_ok("resolving session for token")
            .flatten()
            .map(|session| session.access_token)
            .log_none("no active session")
    }

    /// Whether the current user is on the admin allow-list.
    pub async fn is_admin(&self) -> bool {
        match self.get_current_user().await {
            Some(user) => self.admins.contains(&user.email),
            None => false,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
