//! Client configuration.
//!
//! Supports loading configuration from:
//! 1. Config file (TOML, JSON, or YAML)
//! 2. Environment variables prefixed with `RAGDESK_`
//!
//! Environment variables take precedence over config file values. Every
//! endpoint setting is optional: a missing value fails the operation that
//! needs it with [`ClientError::Config`] instead of failing startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::admin::AdminAllowList;
use crate::error::{ClientError, ClientResult};

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Identity service (Supabase Auth)
    pub identity: IdentityConfig,
    /// RAG backend API
    pub api: ApiConfig,
    /// Client-side admin gating
    pub admin: AdminConfig,
    /// Local upload checks
    pub upload: UploadConfig,
    /// Session persistence
    pub session: SessionConfig,
}

/// Identity service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Project URL, e.g. "https://your-project.supabase.co"
    pub url: Option<String>,
    /// Public (anon) key sent as the `apikey` header
    pub anon_key: Option<String>,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the RAG backend, e.g. "http://localhost:7071/api"
    pub base_url: Option<String>,
    /// Transport timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

/// Admin allow-list configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Comma-separated admin email addresses
    pub emails: String,
}

/// Upload pre-check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum file size in bytes (default: 10 MiB)
    pub max_file_size: u64,
    /// Accepted extensions including the dot (default: .txt, .md, .pdf)
    pub allowed_extensions: Vec<String>,
}

/// Session persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session file path (default: ~/.ragdesk/session.yaml)
    pub store_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            allowed_extensions: vec![".txt".to_string(), ".md".to_string(), ".pdf".to_string()],
        }
    }
}

/// Environment overrides, read with `envy` under the `RAGDESK_` prefix.
#[derive(Debug, Default, Deserialize)]
pub struct EnvOverrides {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub api_base_url: Option<String>,
    pub api_timeout_secs: Option<u64>,
    pub admin_emails: Option<String>,
    pub max_file_size: Option<u64>,
    pub session_file: Option<PathBuf>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> ClientResult<Self> {
        Ok(envy::prefixed("RAGDESK_").from_env::<EnvOverrides>()?)
    }
}

impl ClientConfig {
    /// Load configuration from an optional file and the environment.
    ///
    /// The file is taken from `path`, then from `RAGDESK_CONFIG`. With
    /// neither, defaults are used.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("RAGDESK_CONFIG").map(PathBuf::from));

        let mut config = match file {
            Some(file) => {
                let config = Self::from_file(&file)?;
                tracing::info!(path = %file.display(), "Loaded configuration");
                config
            }
            None => Self::default(),
        };

        config.apply_overrides(EnvOverrides::from_env()?);
        Ok(config)
    }

    /// Load configuration from a file (supports TOML, JSON, YAML)
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parsed = match extension {
            "toml" => Self::parse_toml(&content),
            "json" => Self::parse_json(&content),
            "yaml" | "yml" => Self::parse_yaml(&content),
            _ => {
                if content.trim().starts_with('{') {
                    Self::parse_json(&content)
                } else if content.contains("---") || content.contains(": ") {
                    Self::parse_yaml(&content)
                } else {
                    Self::parse_toml(&content)
                }
            }
        };

        parsed.map_err(|reason| ClientError::Config(format!("{}: {}", path.display(), reason)))
    }

    fn parse_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn parse_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    fn parse_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Apply environment overrides on top of file values.
    pub fn apply_overrides(&mut self, env: EnvOverrides) {
        if let Some(val) = env.supabase_url {
            self.identity.url = Some(val);
        }
        if let Some(val) = env.supabase_anon_key {
            self.identity.anon_key = Some(val);
        }
        if let Some(val) = env.api_base_url {
            self.api.base_url = Some(val);
        }
        if let Some(secs) = env.api_timeout_secs {
            self.api.timeout_secs = secs;
        }
        if let Some(val) = env.admin_emails {
            self.admin.emails = val;
        }
        if let Some(size) = env.max_file_size {
            self.upload.max_file_size = size;
        }
        if let Some(path) = env.session_file {
            self.session.store_path = Some(path);
        }
    }

    /// Parsed admin allow-list.
    pub fn admin_allow_list(&self) -> AdminAllowList {
        AdminAllowList::parse(&self.admin.emails)
    }

    /// Backend base URL without a trailing slash.
    pub fn api_base_url(&self) -> ClientResult<String> {
        self.api
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| ClientError::Config("api.base_url is not set".to_string()))
    }

    /// Session file location, defaulting to `~/.ragdesk/session.yaml`.
    pub fn session_store_path(&self) -> ClientResult<PathBuf> {
        if let Some(ref path) = self.session.store_path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| ClientError::Config("could not find home directory".to_string()))?;
        Ok(home.join(".ragdesk").join("session.yaml"))
    }
}
