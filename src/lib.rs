/// Newsletter summarizer client
///
/// Talks to the newsletter summarizer backend, which owns the Gmail OAuth
/// session, the email index and the summaries. This crate holds the client
/// side of that conversation.
///
/// # Features
///
/// - Check whether the browser session is signed in (fail-closed auth gate)
/// - Start Gmail sign-in through the backend's OAuth page
/// - One-time selection of the Gmail folder holding newsletters
/// - Search newsletters by sender or subject
/// - Summarize a single email, ignoring answers that arrive too late
/// - Log out
///
/// Views are plain state machines driven through [`api::BackendClient`] and
/// a [`navigation::Navigator`], so they run unchanged from the CLI or tests.
pub use crate::api::BackendClient;
pub use crate::config::Config;
pub use crate::errors::{ApiError, ConfigError, NavigationError};
pub use crate::gate::{AuthGate, GatePolicy, GateState};
pub use crate::logging::setup_logging;
pub use crate::models::{AuthStatus, Email, EmailId, SetupState, Summary};
pub use crate::navigation::{BrowserNavigator, Navigator, Route};
pub use crate::status::OpState;

pub mod api;
pub mod config;
pub mod errors;
pub mod gate;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod status;
pub mod views;
