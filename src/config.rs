use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::{AuthError, ConfigError, Endpoint, Provider};

pub const ENDPOINT_NAMES_KEY: &str = "oauth2.endpoint-names";
pub const REDIRECT_URI_KEY: &str = "oauth2.redirect-uri";
pub const TIMEOUT_KEY: &str = "oauth2.timeout-secs";

const DEFAULT_SCOPES: &str = "openid email";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Key/value lookup for `oauth2.*` settings.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment, keys taken verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Env;

impl ConfigSource for Env {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Everything needed to talk to one identity provider.
#[derive(Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
    pub endpoint: Endpoint,
    /// Prefix of the profile URL; the access token is appended verbatim.
    pub user_info_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.client_secret.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("client_id", &self.client_id)
            .field("client_secret", &secret)
            .field("redirect_url", &self.redirect_url)
            .field("scopes", &self.scopes)
            .field("endpoint", &self.endpoint)
            .field("user_info_url", &self.user_info_url)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: String::new(),
            scopes: split_list(DEFAULT_SCOPES),
            endpoint: provider.endpoint(),
            user_info_url: String::new(),
        }
    }

    /// Reads `oauth2.<id>.*` keys plus the shared redirect uri.
    pub fn load(provider: Provider, source: &impl ConfigSource) -> Self {
        let key = |field: &str| format!("oauth2.{}.{field}", provider.id());
        let value = |field: &str| source.get(&key(field)).unwrap_or_default();

        let defaults = provider.endpoint();
        let scopes = source
            .get(&key("scopes"))
            .unwrap_or_else(|| DEFAULT_SCOPES.to_string());

        Self {
            provider,
            client_id: value("client-id"),
            client_secret: value("secret"),
            redirect_url: source.get(REDIRECT_URI_KEY).unwrap_or_default(),
            scopes: split_list(&scopes),
            endpoint: Endpoint {
                auth_url: source.get(&key("auth-url")).unwrap_or(defaults.auth_url),
                token_url: source.get(&key("token-url")).unwrap_or(defaults.token_url),
            },
            user_info_url: value("data-url"),
        }
    }

    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = redirect_url.into();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_user_info_url(mut self, user_info_url: impl Into<String>) -> Self {
        self.user_info_url = user_info_url.into();
        self
    }

    /// Consent page URL the user agent is sent to before a code is issued.
    pub fn authorization_url(&self, state: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.endpoint.auth_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("response_type", "code");
            pairs.append_pair("client_id", &self.client_id);
            if !self.redirect_url.is_empty() {
                pairs.append_pair("redirect_uri", &self.redirect_url);
            }
            if !self.scopes.is_empty() {
                pairs.append_pair("scope", &self.scopes.join(" "));
            }
            pairs.append_pair("state", state);
        }
        Ok(url)
    }
}

/// Request timeout shared by every outbound call.
pub fn timeout(source: &impl ConfigSource) -> Result<Duration, ConfigError> {
    let Some(value) = source.get(TIMEOUT_KEY) else {
        return Ok(DEFAULT_TIMEOUT);
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout { value }),
    }
}

pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn load_applies_defaults() {
        let source = source(&[("oauth2.google.client-id", "abc")]);
        let config = ProviderConfig::load(Provider::Google, &source);

        assert_eq!(config.client_id, "abc");
        assert_eq!(config.client_secret, "");
        assert_eq!(config.redirect_url, "");
        assert_eq!(config.user_info_url, "");
        assert_eq!(config.scopes, vec!["openid", "email"]);
        assert_eq!(config.endpoint, Provider::Google.endpoint());
    }

    #[test]
    fn load_reads_provider_scoped_keys() {
        let source = source(&[
            ("oauth2.redirect-uri", "https://app.example/callback"),
            ("oauth2.github.client-id", "id"),
            ("oauth2.github.secret", "shh"),
            ("oauth2.github.scopes", "read:user, user:email"),
            ("oauth2.github.data-url", "https://api.github.com/user?access_token="),
            ("oauth2.google.client-id", "other"),
        ]);
        let config = ProviderConfig::load(Provider::GitHub, &source);

        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "shh");
        assert_eq!(config.redirect_url, "https://app.example/callback");
        assert_eq!(config.scopes, vec!["read:user", "user:email"]);
        assert_eq!(
            config.user_info_url,
            "https://api.github.com/user?access_token="
        );
    }

    #[test]
    fn load_honors_endpoint_overrides() {
        let source = source(&[("oauth2.facebook.token-url", "http://127.0.0.1:9/token")]);
        let config = ProviderConfig::load(Provider::Facebook, &source);

        assert_eq!(config.endpoint.token_url, "http://127.0.0.1:9/token");
        assert_eq!(
            config.endpoint.auth_url,
            Provider::Facebook.endpoint().auth_url
        );
    }

    #[test]
    fn authorization_url_includes_required_params() {
        let config = ProviderConfig::new(Provider::Google)
            .with_client_credentials("client-id", "secret")
            .with_redirect_url("http://localhost:8765/callback");
        let url = config.authorization_url("xyz").unwrap();

        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(pairs.get("response_type"), Some(&"code".to_string()));
        assert_eq!(pairs.get("client_id"), Some(&"client-id".to_string()));
        assert_eq!(
            pairs.get("redirect_uri"),
            Some(&"http://localhost:8765/callback".to_string())
        );
        assert_eq!(pairs.get("scope"), Some(&"openid email".to_string()));
        assert_eq!(pairs.get("state"), Some(&"xyz".to_string()));
        assert!(!pairs.contains_key("client_secret"));
    }

    #[test]
    fn authorization_url_skips_empty_optional_params() {
        let config = ProviderConfig::new(Provider::Vk).with_scopes(Vec::<String>::new());
        let url = config.authorization_url("s").unwrap();

        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert!(!pairs.contains_key("redirect_uri"));
        assert!(!pairs.contains_key("scope"));
    }

    #[test]
    fn debug_output_redacts_client_secret() {
        let config = ProviderConfig::new(Provider::GitHub)
            .with_client_credentials("gh-client", "very-secret-value");
        let output = format!("{config:?}");

        assert!(output.contains("gh-client"));
        assert!(output.contains("<redacted>"));
        assert!(!output.contains("very-secret-value"));
    }

    #[test]
    fn timeout_defaults_to_five_seconds() {
        assert_eq!(timeout(&source(&[])).unwrap(), Duration::from_secs(5));
        assert_eq!(
            timeout(&source(&[(TIMEOUT_KEY, "12")])).unwrap(),
            Duration::from_secs(12)
        );
    }

    #[test]
    fn timeout_rejects_garbage() {
        for value in ["0", "-1", "5s"] {
            let err = timeout(&source(&[(TIMEOUT_KEY, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
        }
    }
}
