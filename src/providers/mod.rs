mod endpoints;
mod provider;

pub use provider::Provider;

/// Authorization and token endpoint pair of one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub auth_url: String,
    pub token_url: String,
}

impl Endpoint {
    pub fn new(auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            token_url: token_url.into(),
        }
    }
}
