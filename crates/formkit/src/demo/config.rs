//! Demo server configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};
use formkit::RenderConfig;

/// Demo server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "lax").
    pub cookie_same_site: String,

    /// Whether the session cookie is marked Secure (default: false).
    pub cookie_secure: bool,

    /// Strings and classes written into rendered forms.
    pub render: RenderConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or_else(|_| "lax".to_string())
            .to_lowercase();

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            cookie_same_site,
            cookie_secure,
            render: RenderConfig::from_env(),
        })
    }
}
