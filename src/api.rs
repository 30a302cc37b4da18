use crate::config::Config;
use crate::errors::{body_detail, ApiError, ApiResult};
use crate::logging::truncate_secret;
use crate::models::{
    parse_auth_status, parse_search_response, parse_setup_state, parse_summary, AuthStatus,
    AuthUrlResponse, Email, EmailId, SetupFolderRequest, SetupState, Summary,
};
use log::{debug, error, info};
use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

pub const CHECK_AUTH_PATH: &str = "check-auth";
pub const AUTH_START_PATH: &str = "auth/gmail";
pub const LOGOUT_PATH: &str = "logout";
pub const CHECK_SETUP_PATH: &str = "check-setup";
pub const SETUP_FOLDER_PATH: &str = "setup-folder";
pub const SEARCH_PATH: &str = "search-emails/";
pub const SUMMARIZE_PATH: &str = "summarize-email/";

/// Thin wrapper around the newsletter backend's REST endpoints.
///
/// Every request carries the shared cookie jar, so a session cookie set by
/// the backend (or seeded from the config) is replayed automatically. Each
/// call is a single attempt: no retries, no timeout beyond the transport's.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            debug!(
                "Seeding session cookie {} for {}",
                truncate_secret(cookie),
                config.backend_url
            );
            jar.add_cookie_str(cookie, &config.backend_url);
        }

        // Redirects are surfaced, not followed: /auth/gmail answers with one
        let client = Client::builder()
            .cookie_provider(jar)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint path relative to the backend origin.
    pub fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Parse(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    /// Issues one request and returns the parsed JSON body.
    ///
    /// Non-success statuses become `ApiError::Status`, carrying the JSON
    /// error body when the backend sent one.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ApiResult<Value> {
        let response = self.send(method, path, query, body).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {}", e)))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse response from {}: {}", path, e);
            ApiError::Parse(format!("invalid JSON from {}: {}", path, e))
        })
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ApiResult<Response> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            // .json() also sets Content-Type: application/json
            request = request.json(body);
        }

        request.send().await.map_err(|e| {
            error!("{} {} failed: {}", method, path, e);
            ApiError::Network(e.to_string())
        })
    }

    pub async fn check_auth(&self) -> ApiResult<AuthStatus> {
        let value = self
            .request::<()>(Method::GET, CHECK_AUTH_PATH, &[], None)
            .await?;
        let status = parse_auth_status(value)?;
        debug!("Auth status: {:?}", status);
        Ok(status)
    }

    /// URL the browser is sent to in order to start the Gmail OAuth flow.
    pub fn auth_start_url(&self) -> ApiResult<Url> {
        self.endpoint(AUTH_START_PATH)
    }

    /// Asks the backend where the OAuth flow starts.
    ///
    /// The backend either redirects (the `Location` target is returned) or
    /// answers with `{"auth_url": ...}`.
    pub async fn auth_url(&self) -> ApiResult<Url> {
        let response = self
            .send::<()>(Method::GET, AUTH_START_PATH, &[], None)
            .await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| ApiError::Parse("redirect without Location header".to_string()))?;
            let start = self.auth_start_url()?;
            return start
                .join(location)
                .map_err(|e| ApiError::Parse(format!("invalid redirect target: {}", e)));
        }

        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let parsed: AuthUrlResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("unexpected auth URL response: {}", e)))?;
        Url::parse(&parsed.auth_url)
            .map_err(|e| ApiError::Parse(format!("invalid auth_url '{}': {}", parsed.auth_url, e)))
    }

    /// Ends the backend session. Only a 2xx answer counts as success.
    pub async fn logout(&self) -> ApiResult<()> {
        self.request::<()>(Method::POST, LOGOUT_PATH, &[], None)
            .await?;
        info!("Logged out");
        Ok(())
    }

    pub async fn check_setup(&self) -> ApiResult<SetupState> {
        let value = self
            .request::<()>(Method::GET, CHECK_SETUP_PATH, &[], None)
            .await?;
        parse_setup_state(value)
    }

    pub async fn setup_folder(&self, folder_name: &str) -> ApiResult<()> {
        let body = SetupFolderRequest {
            folder_name: folder_name.to_string(),
        };
        self.request(Method::POST, SETUP_FOLDER_PATH, &[], Some(&body))
            .await?;
        info!("Folder '{}' saved", folder_name);
        Ok(())
    }

    pub async fn search_emails(&self, query: &str) -> ApiResult<Vec<Email>> {
        let value = self
            .request::<()>(Method::GET, SEARCH_PATH, &[("query", query)], None)
            .await?;
        let emails = parse_search_response(value)?;
        debug!("Search '{}' returned {} emails", query, emails.len());
        Ok(emails)
    }

    pub async fn summarize_email(&self, email_id: &EmailId) -> ApiResult<Summary> {
        let value = self
            .request::<()>(
                Method::GET,
                SUMMARIZE_PATH,
                &[("email_id", email_id.as_str())],
                None,
            )
            .await?;
        parse_summary(email_id, value)
    }
}

async fn status_error(status: StatusCode, response: Response) -> ApiError {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("json"))
        .unwrap_or(false);
    let text = response.text().await.unwrap_or_default();

    // Tolerate a missing content type as long as the body parses
    let body = serde_json::from_str::<Value>(&text)
        .ok()
        .filter(|v| is_json || v.is_object());

    let detail = body.as_ref().and_then(body_detail);
    let message = detail
        .map(str::to_string)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "request failed".to_string());

    error!("Backend returned {}: {}", status, message);

    ApiError::Status {
        status: status.as_u16(),
        message,
        body,
    }
}
