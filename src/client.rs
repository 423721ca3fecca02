use std::sync::Arc;
use std::time::Duration;

use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{self, ConfigSource, Env};
use crate::{AuthError, ConfigError, ProviderConfig, Registry, Stage, TokenResponse, User};

/// Resolves authorization codes into normalized users.
///
/// Holds the provider registry and one HTTP client shared by every token
/// exchange and profile fetch. Cloning is cheap and clones share both.
#[derive(Debug, Clone)]
pub struct UserResolver {
    registry: Arc<Registry>,
    http: Client,
}

impl UserResolver {
    pub fn new(registry: Registry, timeout: Duration) -> Result<Self, ConfigError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(registry, http))
    }

    pub fn with_http_client(registry: Registry, http: Client) -> Self {
        Self {
            registry: Arc::new(registry),
            http,
        }
    }

    /// Builds the registry and client from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&Env)
    }

    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let registry = Registry::from_source(source)?;
        Self::new(registry, config::timeout(source)?)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves `code` for the provider registered under `provider_name`.
    pub async fn get_user(&self, provider_name: &str, code: &str) -> Result<User, AuthError> {
        let config = self
            .registry
            .lookup(provider_name)
            .ok_or_else(|| AuthError::UnknownEndpoint(provider_name.to_string()))?;
        self.get_user_with(config, code).await
    }

    /// Exchanges `code`, fetches the profile, and normalizes it. No retries.
    pub async fn get_user_with(
        &self,
        config: &ProviderConfig,
        code: &str,
    ) -> Result<User, AuthError> {
        let token = self.exchange_code(config, code).await?;
        let profile = self.fetch_profile(config, &token.access_token).await?;

        if !config.provider.has_profile_mapping() {
            warn!(provider = %config.provider, "no profile mapping for provider");
        }
        config.provider.extract_user(&profile)
    }

    pub async fn exchange_code(
        &self,
        config: &ProviderConfig,
        code: &str,
    ) -> Result<TokenResponse, AuthError> {
        let mut payload = vec![("grant_type", "authorization_code"), ("code", code)];
        if !config.redirect_url.is_empty() {
            payload.push(("redirect_uri", config.redirect_url.as_str()));
        }
        payload.push(("client_id", config.client_id.as_str()));
        payload.push(("client_secret", config.client_secret.as_str()));

        debug!(
            provider = %config.provider,
            token_url = %config.endpoint.token_url,
            "exchanging authorization code"
        );

        let response = self
            .http
            .post(&config.endpoint.token_url)
            .header(ACCEPT, "application/json")
            .form(&payload)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        if !status.is_success() {
            warn!(provider = %config.provider, status = status.as_u16(), "token exchange failed");
            return Err(AuthError::HttpStatus {
                stage: Stage::TokenExchange,
                status: status.as_u16(),
                body,
            });
        }

        TokenResponse::parse(content_type.as_deref(), body)
    }

    /// GETs `user_info_url + access_token` with the token as bearer credential.
    pub async fn fetch_profile(
        &self,
        config: &ProviderConfig,
        access_token: &str,
    ) -> Result<Value, AuthError> {
        let url = Url::parse(&format!("{}{access_token}", config.user_info_url))?;

        debug!(
            provider = %config.provider,
            host = url.host_str().unwrap_or_default(),
            "fetching profile"
        );

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(provider = %config.provider, status = status.as_u16(), "profile fetch failed");
            return Err(AuthError::HttpStatus {
                stage: Stage::ProfileFetch,
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(profile @ Value::Object(_)) => Ok(profile),
            Ok(_) => Err(AuthError::InvalidResponse {
                stage: Stage::ProfileFetch,
                message: "profile is not a JSON object".to_string(),
                body,
            }),
            Err(err) => Err(AuthError::InvalidResponse {
                stage: Stage::ProfileFetch,
                message: err.to_string(),
                body,
            }),
        }
    }
}
