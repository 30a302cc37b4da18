use crate::api::BackendClient;
use crate::errors::{ApiError, NavigationError};
use crate::gate::{AuthGate, GateState};
use crate::navigation::Navigator;
use log::info;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignInError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Sign-in view.
///
/// The only action is a full browser navigation to the backend's OAuth
/// start page. The backend finishes the OAuth exchange and sets the session
/// cookie before sending the browser back, so nothing here parses OAuth
/// responses.
pub struct LoginView {
    client: BackendClient,
    navigator: Arc<dyn Navigator>,
    gate: AuthGate,
}

impl LoginView {
    pub fn new(client: BackendClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            navigator,
            gate: AuthGate::login_page(),
        }
    }

    /// Runs the auth check; a signed-in user is sent to the root view.
    pub async fn mount(&mut self) -> GateState {
        self.gate
            .check(&self.client, self.navigator.as_ref())
            .await
            .clone()
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Text shown in place of the sign-in button, if any.
    pub fn status_text(&self) -> Option<&str> {
        match self.gate.state() {
            GateState::Checking => Some("Checking authentication status..."),
            GateState::Error(msg) => Some(msg),
            GateState::Authenticated | GateState::Unauthenticated => None,
        }
    }

    pub fn sign_in(&self) -> Result<(), SignInError> {
        let url = self.client.auth_start_url()?;
        info!("Starting Gmail sign-in at {}", url);
        self.navigator.open_external(&url)?;
        Ok(())
    }
}
