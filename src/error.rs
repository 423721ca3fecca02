use std::fmt;

use thiserror::Error;

/// Startup failures while building the provider registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown OAuth2.0 endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("invalid timeout (expected positive whole seconds): {value}")]
    InvalidTimeout { value: String },

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Which outbound call of a user resolution produced a response error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TokenExchange,
    ProfileFetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::TokenExchange => f.write_str("token exchange"),
            Stage::ProfileFetch => f.write_str("profile fetch"),
        }
    }
}

/// Request-time failures while resolving a user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("os rng error: {message}")]
    OsRng { message: String },

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{stage} returned http status {status}: {body}")]
    HttpStatus {
        stage: Stage,
        status: u16,
        body: String,
    },

    #[error("invalid {stage} response: {message}")]
    InvalidResponse {
        stage: Stage,
        message: String,
        body: String,
    },

    #[error("token endpoint returned error {error}: {}", .description.as_deref().unwrap_or(""))]
    TokenError {
        error: String,
        description: Option<String>,
    },

    #[error("token response is missing access_token")]
    MissingAccessToken,

    #[error("unknown OAuth2.0 endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("malformed {provider} profile: field `{field}` is not {expected}")]
    MalformedProfile {
        provider: &'static str,
        field: String,
        expected: &'static str,
    },

    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[error("missing authorization code in callback url")]
    MissingAuthorizationCode,

    #[error("authorization denied ({error}): {}", .description.as_deref().unwrap_or(""))]
    AuthorizationDenied {
        error: String,
        description: Option<String>,
    },

    #[error("state mismatch (expected={expected}, received={received})")]
    StateMismatch { expected: String, received: String },

    #[cfg(feature = "local-server")]
    #[error("callback server timed out after {timeout:?}")]
    CallbackTimeout { timeout: std::time::Duration },
}
