//! Supabase Auth (GoTrue) client.
//!
//! Speaks the GoTrue REST API directly:
//! - `POST {url}/auth/v1/token?grant_type=password`
//! - `POST {url}/auth/v1/token?grant_type=refresh_token`
//! - `GET  {url}/auth/v1/user`
//! - `POST {url}/auth/v1/logout`
//!
//! Every call carries the project's public key in the `apikey` header.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::backend::IdentityBackend;
use super::types::{Session, UserIdentity};
use crate::error::{ClientError, ClientResult};

/// GoTrue HTTP client.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: reqwest::Client,
    auth_url: String,
    anon_key: String,
}

/// Lifetime assumed when the token response carries no usable expiry.
const DEFAULT_TTL_SECS: i64 = 3600;

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserIdentity,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| {
                self.expires_in
                    .and_then(ChronoDuration::try_seconds)
                    .and_then(|ttl| now.checked_add_signed(ttl))
            })
            .unwrap_or_else(|| now + ChronoDuration::seconds(DEFAULT_TTL_SECS));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

impl SupabaseAuth {
    /// Create a new client for the project at `project_url`.
    pub fn new(project_url: &str, anon_key: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            auth_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    async fn token_grant(&self, grant_type: &str, payload: serde_json::Value) -> ClientResult<Session> {
        let response = self
            .client
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ClientError::Authentication(auth_error_message(status.as_u16(), &body)));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| ClientError::Schema {
            endpoint: format!("/auth/v1/token?grant_type={}", grant_type),
            reason: e.to_string(),
        })?;
        Ok(token.into_session(Utc::now()))
    }
}

#[async_trait]
impl IdentityBackend for SupabaseAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session> {
        self.token_grant(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn get_user(&self, access_token: &str) -> ClientResult<UserIdentity> {
        let response = self
            .client
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ClientError::Authentication(auth_error_message(status.as_u16(), &body)));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Schema {
            endpoint: "/auth/v1/user".to_string(),
            reason: e.to_string(),
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> ClientResult<Session> {
        self.token_grant(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Authentication(auth_error_message(status.as_u16(), &body)));
        }
        Ok(())
    }
}

/// The provider's own error message, verbatim.
///
/// GoTrue has used `msg`, `error_description`, `message` and `error` across
/// versions; the first non-empty one wins.
fn auth_error_message(status: u16, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
                .find(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Identity service returned status {}", status))
}
