//! Configuration module for the ragdesk client.
//!
//! Read once at startup by the composition root and handed to the session
//! provider and gateway.

mod admin;
mod client_config;

pub use admin::AdminAllowList;
pub use client_config::{
    AdminConfig,
    ApiConfig,
    ClientConfig,
    EnvOverrides,
    IdentityConfig,
    SessionConfig,
    UploadConfig,
};
