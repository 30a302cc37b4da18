use crate::api::BackendClient;
use crate::errors::{ApiError, ApiResult};
use crate::gate::{AuthGate, GateState};
use crate::models::SetupState;
use crate::navigation::{Navigator, Route};
use crate::status::OpState;
use log::{debug, info, warn};
use std::sync::Arc;

pub const EMPTY_FOLDER_NAME: &str = "Please enter a folder name";
pub const SAVE_FOLDER_FAILED: &str = "Failed to save folder settings";
pub const SAVE_FAILED: &str = "Failed to save settings";
pub const UNANSWERED: &str = "Please say whether the folder already exists";
pub const ALREADY_CONFIGURED: &str = "Setup is already complete";

pub const CREATE_LABEL_INSTRUCTIONS: &[&str] = &[
    "Open Gmail",
    "On the left sidebar, scroll down and click \"Create new label\"",
    "Enter a name for your newsletter folder",
    "Click Create",
    "Move your newsletter emails to this folder",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    /// "Do you have a Gmail folder for newsletters?"
    AskExisting,
    EnterName { has_folder: bool },
    Done,
}

/// One-time setup wizard: pick the Gmail label holding newsletters.
pub struct SetupView {
    client: BackendClient,
    navigator: Arc<dyn Navigator>,
    gate: AuthGate,
    step: SetupStep,
    folder_name: String,
    submit: OpState,
    setup: SetupState,
}

impl SetupView {
    pub fn new(client: BackendClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            navigator,
            gate: AuthGate::protected(),
            step: SetupStep::AskExisting,
            folder_name: String::new(),
            submit: OpState::Idle,
            setup: SetupState::default(),
        }
    }

    /// Runs the auth gate, then skips straight to the root view when a
    /// folder is already configured.
    pub async fn mount(&mut self) -> GateState {
        let gate_state = self
            .gate
            .check(&self.client, self.navigator.as_ref())
            .await
            .clone();
        if gate_state != GateState::Authenticated {
            return gate_state;
        }

        match self.client.check_setup().await {
            Ok(state) => {
                debug!("Setup state: {:?}", state);
                if state.folder_configured {
                    info!("Folder already configured, skipping setup");
                    self.step = SetupStep::Done;
                    self.navigator.navigate(Route::Root);
                }
                self.setup = state;
            }
            // The wizard stays usable without the check
            Err(e) => warn!("Setup check failed: {}", e),
        }

        gate_state
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn setup_state(&self) -> &SetupState {
        &self.setup
    }

    pub fn submit_state(&self) -> &OpState {
        &self.submit
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn answer_has_folder(&mut self, has_folder: bool) {
        if self.step != SetupStep::Done {
            self.step = SetupStep::EnterName { has_folder };
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.step {
            SetupStep::AskExisting => "Do you have a Gmail folder for newsletters?",
            SetupStep::EnterName { has_folder: true } => "Enter Folder Name",
            SetupStep::EnterName { has_folder: false } => "Create a Folder",
            SetupStep::Done => "Setup complete",
        }
    }

    /// Label-creation steps, shown to users without a folder yet.
    pub fn instructions(&self) -> Option<&'static [&'static str]> {
        match self.step {
            SetupStep::EnterName { has_folder: false } => Some(CREATE_LABEL_INSTRUCTIONS),
            _ => None,
        }
    }

    pub fn set_folder_name(&mut self, name: impl Into<String>) {
        self.folder_name = name.into();
    }

    /// Saves the folder name; on success the app continues at the root view.
    pub async fn submit(&mut self) -> ApiResult<()> {
        match self.step {
            SetupStep::EnterName { .. } => {}
            SetupStep::AskExisting => return self.reject(UNANSWERED),
            // Leaves the saved outcome in place
            SetupStep::Done => {
                return Err(ApiError::Validation(ALREADY_CONFIGURED.to_string()));
            }
        }

        let name = self.folder_name.trim().to_string();
        if name.is_empty() {
            return self.reject(EMPTY_FOLDER_NAME);
        }

        self.submit = OpState::Pending;
        match self.client.setup_folder(&name).await {
            Ok(()) => {
                self.submit = OpState::Succeeded;
                self.setup = SetupState {
                    folder_configured: true,
                    folder_name: Some(name),
                };
                self.step = SetupStep::Done;
                self.navigator.navigate(Route::Root);
                Ok(())
            }
            Err(e) => {
                let fallback = match e {
                    ApiError::Status { .. } => SAVE_FOLDER_FAILED,
                    _ => SAVE_FAILED,
                };
                self.submit = OpState::Failed(e.user_message(fallback));
                Err(e)
            }
        }
    }

    fn reject(&mut self, msg: &str) -> ApiResult<()> {
        self.submit = OpState::Failed(msg.to_string());
        Err(ApiError::Validation(msg.to_string()))
    }
}
