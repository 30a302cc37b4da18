use crate::errors::ConfigError;
use dotenv::dotenv;
use log::debug;
use std::env;
use url::Url;

// Local development backend
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

pub const BACKEND_URL_VAR: &str = "NEWSLETTER_BACKEND_URL";
pub const SESSION_COOKIE_VAR: &str = "NEWSLETTER_SESSION_COOKIE";

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, always ending in `/`.
    pub backend_url: Url,
    /// `name=value` session cookie to seed the client with.
    pub session_cookie: Option<String>,
}

impl Config {
    pub fn new(backend_url: &str) -> Result<Self, ConfigError> {
        Ok(Config {
            backend_url: parse_backend_url(backend_url)?,
            session_cookie: None,
        })
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file if present
        // If DOTENV_PATH is set, use that path, otherwise use default
        if let Ok(path) = env::var("DOTENV_PATH") {
            let _ = dotenv::from_path(path);
        } else {
            let _ = dotenv();
        }

        debug!("Loading backend configuration from environment");

        let backend_url = match env::var(BACKEND_URL_VAR) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => {
                debug!("{} not set, using {}", BACKEND_URL_VAR, DEFAULT_BACKEND_URL);
                DEFAULT_BACKEND_URL.to_string()
            }
        };

        let session_cookie = env::var(SESSION_COOKIE_VAR)
            .ok()
            .filter(|c| !c.trim().is_empty());

        let config = Config {
            backend_url: parse_backend_url(&backend_url)?,
            session_cookie,
        };

        debug!(
            "Backend configuration loaded: {} (session cookie: {})",
            config.backend_url,
            config.session_cookie.is_some()
        );

        Ok(config)
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }

    // Keep any path prefix when joining endpoint paths
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
