//! Client configuration loaded from the environment.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const API_URL_ENV: &str = "SHOPNO_API_URL";
pub const TIMEOUT_ENV: &str = "SHOPNO_API_TIMEOUT_SECS";
pub const LOGIN_ROUTE_ENV: &str = "SHOPNO_LOGIN_ROUTE";
pub const CSRF_TOKEN_ENV: &str = "SHOPNO_CSRF_TOKEN";
pub const AUTH_TOKEN_ENV: &str = "SHOPNO_AUTH_TOKEN";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Connection settings for [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Duration,
    login_route: String,
    csrf_token: Option<String>,
    auth_token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            csrf_token: None,
            auth_token: None,
        })
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup (tests, config files).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get(API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&base_url).map_err(|e| match e {
            ConfigError::Invalid { reason, .. } => ConfigError::Invalid {
                var: API_URL_ENV,
                reason,
            },
        })?;

        if let Some(raw) = get(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: TIMEOUT_ENV,
                reason: e.to_string(),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: TIMEOUT_ENV,
                    reason: "must be at least 1 second".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(route) = get(LOGIN_ROUTE_ENV) {
            config.login_route = route;
        }
        config.csrf_token = get(CSRF_TOKEN_ENV);
        config.auth_token = get(AUTH_TOKEN_ENV);

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Absolute URL of `/api/<path>`.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        var: "base_url",
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            var: "base_url",
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
