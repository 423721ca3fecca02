//! OAuth 2.0 authorization-code login against common identity providers.
//!
//! A [`Registry`] of enabled providers is built once from `oauth2.*`
//! settings. A [`UserResolver`] exchanges an authorization code for an access
//! token, fetches the provider's profile, and normalizes it into a [`User`].

#[cfg(feature = "local-server")]
mod callback;
mod client;
pub mod config;
mod error;
mod profile;
mod providers;
mod registry;
mod state;
mod types;

#[cfg(feature = "local-server")]
pub use callback::CallbackServer;
pub use client::UserResolver;
pub use config::{ConfigSource, Env, ProviderConfig};
pub use error::{AuthError, ConfigError, Stage};
pub use profile::User;
pub use providers::{Endpoint, Provider};
pub use registry::Registry;
pub use state::State;
pub use types::{AuthorizationResponse, TokenResponse};
