//! Service configuration.
//!
//! Everything is read from the process environment (optionally seeded from a
//! `.env` file by the binary). Missing values fall back to defaults; only a
//! malformed `PORT` is fatal at startup. Missing login credentials are
//! reported per request by the authenticator instead.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

/// Upstream base URL used when `NODE_API_URL` is unset
pub const DEFAULT_API_URL: &str = "http://localhost:5007/api/v1";

/// Upstream request timeout used when `API_REQUEST_TIMEOUT` is unset or invalid
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGINS: &str = "*";
const DEFAULT_CORS_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const DEFAULT_CORS_HEADERS: &str = "Content-Type, Authorization";

#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub auth_email: Option<String>,
    pub auth_password: Option<String>,
    pub port: u16,
    pub cors: CorsConfig,
    pub log_dir: Option<PathBuf>,
}

// Keeps the password out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("request_timeout", &self.request_timeout)
            .field("auth_email", &self.auth_email)
            .field("auth_password", &self.auth_password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .field("cors", &self.cors)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

/// Raw CORS header values, applied by the server's CORS layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: String,
    pub allowed_methods: String,
    pub allowed_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_CORS_ORIGINS.to_string(),
            allowed_methods: DEFAULT_CORS_METHODS.to_string(),
            allowed_headers: DEFAULT_CORS_HEADERS.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auth_email: None,
            auth_password: None,
            port: DEFAULT_PORT,
            cors: CorsConfig::default(),
            log_dir: None,
        }
    }
}

/// `LOG_DIR` on its own, so logging can start before the rest of the config is read.
pub fn log_dir_from_env() -> Option<PathBuf> {
    log_dir_from_lookup(|key| std::env::var(key).ok())
}

fn log_dir_from_lookup<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup("LOG_DIR")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let request_timeout = match get("API_REQUEST_TIMEOUT") {
            Some(raw) => parse_timeout(&raw).unwrap_or_else(|| {
                warn!(value = %raw, default = ?DEFAULT_REQUEST_TIMEOUT, "Invalid API_REQUEST_TIMEOUT, using default");
                DEFAULT_REQUEST_TIMEOUT
            }),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", raw))?,
            None => defaults.port,
        };

        Ok(Self {
            api_url: get("NODE_API_URL").unwrap_or(defaults.api_url),
            request_timeout,
            auth_email: get("AUTH_EMAIL"),
            auth_password: get("AUTH_PASSWORD"),
            port,
            cors: CorsConfig {
                allowed_origins: get("CORS_ALLOWED_ORIGINS")
                    .unwrap_or(defaults.cors.allowed_origins),
                allowed_methods: get("CORS_ALLOWED_METHODS")
                    .unwrap_or(defaults.cors.allowed_methods),
                allowed_headers: get("CORS_ALLOWED_HEADERS")
                    .unwrap_or(defaults.cors.allowed_headers),
            },
            log_dir: log_dir_from_lookup(&lookup),
        })
    }
}

/// Parse an `API_REQUEST_TIMEOUT` value such as `10s`, `500ms` or `1m 30s`.
///
/// Zero is rejected: the HTTP client would fail every request immediately.
pub fn parse_timeout(input: &str) -> Option<Duration> {
    humantime::parse_duration(input.trim())
        .ok()
        .filter(|timeout| !timeout.is_zero())
}
