use crate::errors::{ApiError, ApiResult};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of an indexed email.
///
/// The backend hands out integer ids but nothing in the client depends on
/// that, so both JSON numbers and strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailId(String);

impl EmailId {
    pub fn new(id: impl Into<String>) -> Self {
        EmailId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmailId {
    fn from(id: &str) -> Self {
        EmailId::new(id)
    }
}

impl From<u64> for EmailId {
    fn from(id: u64) -> Self {
        EmailId(id.to_string())
    }
}

impl<'de> Deserialize<'de> for EmailId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => EmailId(n.to_string()),
            RawId::Text(s) => EmailId(s),
        })
    }
}

/// One search hit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Email {
    pub id: EmailId,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, alias = "snippet")]
    pub preview: Option<String>,
    #[serde(default, alias = "receivedAt")]
    pub received_at: Option<String>,
}

impl Email {
    /// Parses `received_at`, accepting RFC 3339 as well as the naive ISO
    /// timestamps the backend emits for database datetimes.
    pub fn received_at_parsed(&self) -> Option<NaiveDateTime> {
        let raw = self.received_at.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub email_id: EmailId,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    Unauthenticated,
}

impl AuthStatus {
    pub fn is_authenticated(self) -> bool {
        self == AuthStatus::Authenticated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetupState {
    pub folder_configured: bool,
    pub folder_name: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SetupFolderRequest {
    pub folder_name: String,
}

// Wire shapes. Everything below is normalized into the public types above
// and any unexpected shape is reported as a parse error.

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthCheckResponse {
    Flag {
        #[serde(rename = "isAuthenticated")]
        is_authenticated: bool,
    },
    Status {
        status: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    List(Vec<Email>),
    Results { results: Vec<Email> },
    Emails { emails: Vec<Email> },
    // Sent by the backend in place of an empty list
    NoMatches {
        #[allow(dead_code)]
        message: String,
    },
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
    #[serde(default)]
    email_id: Option<EmailId>,
}

#[derive(Deserialize)]
struct SetupCheckResponse {
    is_setup: bool,
    #[serde(default)]
    folder_name: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct AuthUrlResponse {
    pub auth_url: String,
}

fn shape_error(what: &str, value: &Value, err: impl fmt::Display) -> ApiError {
    let preview: String = value.to_string().chars().take(200).collect();
    ApiError::Parse(format!("unexpected {} response ({}): {}", what, err, preview))
}

pub fn parse_auth_status(value: Value) -> ApiResult<AuthStatus> {
    let parsed: AuthCheckResponse =
        serde_json::from_value(value.clone()).map_err(|e| shape_error("auth status", &value, e))?;

    match parsed {
        AuthCheckResponse::Flag { is_authenticated: true } => Ok(AuthStatus::Authenticated),
        AuthCheckResponse::Flag { is_authenticated: false } => Ok(AuthStatus::Unauthenticated),
        AuthCheckResponse::Status { status } => match status.as_str() {
            "authenticated" => Ok(AuthStatus::Authenticated),
            "unauthenticated" => Ok(AuthStatus::Unauthenticated),
            other => Err(shape_error(
                "auth status",
                &value,
                format!("unknown status '{}'", other),
            )),
        },
    }
}

pub fn parse_search_response(value: Value) -> ApiResult<Vec<Email>> {
    let parsed: SearchResponse =
        serde_json::from_value(value.clone()).map_err(|e| shape_error("search", &value, e))?;

    Ok(match parsed {
        SearchResponse::List(emails)
        | SearchResponse::Results { results: emails }
        | SearchResponse::Emails { emails } => emails,
        SearchResponse::NoMatches { .. } => Vec::new(),
    })
}

pub fn parse_summary(requested: &EmailId, value: Value) -> ApiResult<Summary> {
    let parsed: SummaryResponse =
        serde_json::from_value(value.clone()).map_err(|e| shape_error("summary", &value, e))?;

    if let Some(returned) = &parsed.email_id {
        if returned != requested {
            return Err(ApiError::Parse(format!(
                "summary for email {} returned for request {}",
                returned, requested
            )));
        }
    }

    Ok(Summary {
        email_id: requested.clone(),
        text: parsed.summary,
    })
}

pub fn parse_setup_state(value: Value) -> ApiResult<SetupState> {
    let parsed: SetupCheckResponse =
        serde_json::from_value(value.clone()).map_err(|e| shape_error("setup check", &value, e))?;

    Ok(SetupState {
        folder_configured: parsed.is_setup,
        folder_name: parsed.folder_name,
    })
}
