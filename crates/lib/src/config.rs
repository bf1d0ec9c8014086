//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.messenger-bot/config.json`); secrets may be
//! supplied or overridden through the environment.

use crate::credentials::Credentials;
use crate::error::CredentialsError;
use crate::messenger::DEFAULT_API_BASE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const VERIFY_TOKEN_ENV: &str = "MESSENGER_VERIFY_TOKEN";
pub const PAGE_ACCESS_TOKEN_ENV: &str = "MESSENGER_PAGE_ACCESS_TOKEN";
pub const APP_SECRET_ENV: &str = "MESSENGER_APP_SECRET";
pub const CONFIG_PATH_ENV: &str = "MESSENGER_BOT_CONFIG_PATH";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Platform secrets and API endpoint.
    #[serde(default)]
    pub messenger: MessengerConfig,
}

/// Listener bind address and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook listener (default 5000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1"). Use "0.0.0.0" behind a public tunnel or proxy.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_port() -> u16 {
    5000
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// Messenger platform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessengerConfig {
    /// Token the platform echoes back during the subscription handshake. Overridden by MESSENGER_VERIFY_TOKEN.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// Page access token for the Send API. Overridden by MESSENGER_PAGE_ACCESS_TOKEN.
    #[serde(default)]
    pub page_access_token: Option<String>,

    /// When set, deliveries must carry a valid X-Hub-Signature-256. Overridden by MESSENGER_APP_SECRET.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Graph API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            verify_token: None,
            page_access_token: None,
            app_secret: None,
            api_base: default_api_base(),
        }
    }
}

/// Trimmed, non-empty value.
fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Build credentials from config, letting `env` override each secret.
/// `env` is a lookup function so tests do not touch the process environment.
pub fn resolve_credentials_with<E>(config: &Config, env: E) -> Result<Credentials, CredentialsError>
where
    E: Fn(&str) -> Option<String>,
{
    let pick = |key: &str, configured: &Option<String>| {
        env(key)
            .as_deref()
            .and_then(non_empty)
            .or_else(|| configured.as_deref().and_then(non_empty))
    };
    let m = &config.messenger;
    let verify_token =
        pick(VERIFY_TOKEN_ENV, &m.verify_token).ok_or(CredentialsError::MissingVerifyToken)?;
    let access_token = pick(PAGE_ACCESS_TOKEN_ENV, &m.page_access_token)
        .ok_or(CredentialsError::MissingAccessToken)?;
    let credentials = Credentials::new(verify_token, access_token)?;
    Ok(match pick(APP_SECRET_ENV, &m.app_secret) {
        Some(secret) => credentials.with_app_secret(secret),
        None => credentials,
    })
}

/// Build credentials from config and the process environment.
pub fn resolve_credentials(config: &Config) -> Result<Credentials, CredentialsError> {
    resolve_credentials_with(config, |key| std::env::var(key).ok())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".messenger-bot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
