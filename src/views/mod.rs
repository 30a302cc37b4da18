//! Views of the newsletter app, modelled without a UI toolkit.
//!
//! Each view owns its own request state. Backend calls go through a shared
//! [`BackendClient`](crate::api::BackendClient) and navigation goes through
//! a [`Navigator`](crate::navigation::Navigator).

pub mod login;
pub mod search;
pub mod setup;

pub use login::LoginView;
pub use search::{SearchState, SearchView};
pub use setup::{SetupStep, SetupView};
