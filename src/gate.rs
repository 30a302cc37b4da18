use crate::api::BackendClient;
use crate::errors::ApiResult;
use crate::models::AuthStatus;
use crate::navigation::{Navigator, Route};
use log::{debug, info, warn};

pub const AUTH_CHECK_FAILED: &str = "Failed to check authentication status";

/// Which kind of view the gate is mounted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Content may only render once the backend confirms the session.
    Protected,
    /// The login view: an existing session is sent on to the root view.
    LoginPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Authenticated,
    Unauthenticated,
    Error(String),
}

/// Mount-time authentication check shared by every view.
///
/// One status request per `check` call, no polling. Any failure is treated
/// as "not signed in".
#[derive(Debug, Clone)]
pub struct AuthGate {
    policy: GatePolicy,
    state: GateState,
}

impl AuthGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self {
            policy,
            state: GateState::Checking,
        }
    }

    pub fn protected() -> Self {
        Self::new(GatePolicy::Protected)
    }

    pub fn login_page() -> Self {
        Self::new(GatePolicy::LoginPage)
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// True only after a confirmed authenticated status.
    pub fn can_render_protected(&self) -> bool {
        self.policy == GatePolicy::Protected && self.state == GateState::Authenticated
    }

    pub async fn check(&mut self, client: &BackendClient, navigator: &dyn Navigator) -> &GateState {
        self.state = GateState::Checking;
        debug!("Checking authentication ({:?})", self.policy);
        let result = client.check_auth().await;
        self.settle(result, navigator)
    }

    /// Applies the outcome of a status request and performs the navigation
    /// it implies.
    pub fn settle(&mut self, result: ApiResult<AuthStatus>, navigator: &dyn Navigator) -> &GateState {
        self.state = match (self.policy, result) {
            (GatePolicy::Protected, Ok(AuthStatus::Authenticated)) => GateState::Authenticated,
            (GatePolicy::Protected, Ok(AuthStatus::Unauthenticated)) => {
                info!("Not signed in, redirecting to {}", Route::Login);
                navigator.navigate(Route::Login);
                GateState::Unauthenticated
            }
            (GatePolicy::Protected, Err(e)) => {
                warn!("Auth check failed, redirecting to {}: {}", Route::Login, e);
                navigator.navigate(Route::Login);
                GateState::Error(e.user_message(AUTH_CHECK_FAILED))
            }
            (GatePolicy::LoginPage, Ok(AuthStatus::Authenticated)) => {
                info!("Already signed in, redirecting to {}", Route::Root);
                navigator.navigate(Route::Root);
                GateState::Authenticated
            }
            (GatePolicy::LoginPage, Ok(AuthStatus::Unauthenticated)) => GateState::Unauthenticated,
            (GatePolicy::LoginPage, Err(e)) => {
                warn!("Auth check failed: {}", e);
                GateState::Error(AUTH_CHECK_FAILED.to_string())
            }
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ApiError, NavigationError};
    use std::sync::Mutex;
    use url::Url;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Route>>);

    impl Navigator for Recorder {
        fn navigate(&self, route: Route) {
            self.0.lock().unwrap().push(route);
        }

        fn open_external(&self, _url: &Url) -> Result<(), NavigationError> {
            Ok(())
        }
    }

    #[test]
    fn starts_checking_and_blocks_render() {
        let gate = AuthGate::protected();
        assert_eq!(gate.state(), &GateState::Checking);
        assert!(!gate.can_render_protected());
    }

    #[test]
    fn protected_unauthenticated_goes_to_login() {
        let nav = Recorder::default();
        let mut gate = AuthGate::protected();
        gate.settle(Ok(AuthStatus::Unauthenticated), &nav);
        assert_eq!(gate.state(), &GateState::Unauthenticated);
        assert!(!gate.can_render_protected());
        assert_eq!(*nav.0.lock().unwrap(), vec![Route::Login]);
    }

    #[test]
    fn protected_failure_is_fail_closed() {
        let nav = Recorder::default();
        let mut gate = AuthGate::protected();
        gate.settle(Err(ApiError::Network("refused".into())), &nav);
        assert!(matches!(gate.state(), GateState::Error(_)));
        assert!(!gate.can_render_protected());
        assert_eq!(*nav.0.lock().unwrap(), vec![Route::Login]);
    }

    #[test]
    fn login_page_redirects_signed_in_users() {
        let nav = Recorder::default();
        let mut gate = AuthGate::login_page();
        gate.settle(Ok(AuthStatus::Authenticated), &nav);
        assert_eq!(*nav.0.lock().unwrap(), vec![Route::Root]);
        // The login view never renders protected content itself
        assert!(!gate.can_render_protected());
    }

    #[test]
    fn login_page_failure_stays_put() {
        let nav = Recorder::default();
        let mut gate = AuthGate::login_page();
        gate.settle(Err(ApiError::Parse("bad".into())), &nav);
        assert_eq!(gate.state(), &GateState::Error(AUTH_CHECK_FAILED.to_string()));
        assert!(nav.0.lock().unwrap().is_empty());
    }
}
