use crate::errors::NavigationError;
use log::info;
use std::fmt;
use url::Url;

/// In-app destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The protected search view
    Root,
    Login,
    Setup,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Setup => "/setup",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where views send the user next.
///
/// `navigate` switches views inside the app; `open_external` is a full
/// navigation away from it, used for the backend-hosted OAuth start page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);

    fn open_external(&self, url: &Url) -> Result<(), NavigationError>;
}

/// Navigator for the terminal: routes are logged and recorded, external
/// URLs open in the system browser.
#[derive(Debug, Default)]
pub struct BrowserNavigator {
    last_route: std::sync::Mutex<Option<Route>>,
}

impl BrowserNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_route(&self) -> Option<Route> {
        self.last_route.lock().ok().and_then(|r| *r)
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, route: Route) {
        info!("Navigating to {}", route);
        if let Ok(mut last) = self.last_route.lock() {
            *last = Some(route);
        }
    }

    fn open_external(&self, url: &Url) -> Result<(), NavigationError> {
        info!("Opening {} in browser", url);
        webbrowser::open(url.as_str()).map_err(|e| NavigationError::Browser(e.to_string()))
    }
}
