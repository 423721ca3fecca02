use std::collections::HashMap;

use tracing::debug;

use crate::config::{ConfigSource, ENDPOINT_NAMES_KEY, Env, ProviderConfig};
use crate::{ConfigError, Provider};

/// Enabled providers keyed by name, built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    providers: HashMap<Provider, ProviderConfig>,
}

impl Registry {
    /// Builds the registry from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&Env)
    }

    /// Builds the registry from the comma-separated `oauth2.endpoint-names` of `source`.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let names = source.get(ENDPOINT_NAMES_KEY).unwrap_or_default();
        Self::build(names.split(','), source)
    }

    /// Builds a config for every name, aborting on the first unknown one.
    ///
    /// A name listed twice is loaded twice; the later entry wins.
    pub fn build<I, S>(names: I, source: &impl ConfigSource) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut providers = HashMap::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let provider: Provider = name.parse()?;
            let config = ProviderConfig::load(provider, source);
            debug!(
                provider = %provider,
                token_url = %config.endpoint.token_url,
                scopes = ?config.scopes,
                "registered oauth2 provider"
            );
            providers.insert(provider, config);
        }
        Ok(Self { providers })
    }

    pub fn insert(&mut self, config: ProviderConfig) {
        self.providers.insert(config.provider, config);
    }

    pub fn get(&self, provider: Provider) -> Option<&ProviderConfig> {
        self.providers.get(&provider)
    }

    /// Looks a provider up by its configuration name.
    pub fn lookup(&self, name: &str) -> Option<&ProviderConfig> {
        let provider = name.parse::<Provider>().ok()?;
        self.get(provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn builds_each_known_provider_alone() {
        for provider in Provider::ALL {
            let registry = Registry::build([provider.id()], &source(&[])).unwrap();
            assert_eq!(registry.len(), 1);
            let config = registry.get(provider).unwrap();
            assert_eq!(config.provider, provider);
            assert_eq!(config.endpoint, provider.endpoint());
        }
    }

    #[test]
    fn unknown_provider_aborts_build() {
        let result = Registry::build(["google", "unknown-provider"], &source(&[]));
        match result {
            Err(ConfigError::UnknownEndpoint(name)) => assert_eq!(name, "unknown-provider"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn google_gets_default_scopes_and_empty_secret() {
        let source = source(&[("oauth2.google.client-id", "abc")]);
        let registry = Registry::build(["google"], &source).unwrap();
        let config = registry.lookup("google").unwrap();

        assert_eq!(config.client_id, "abc");
        assert_eq!(config.client_secret, "");
        assert_eq!(config.scopes, vec!["openid", "email"]);
    }

    #[test]
    fn from_source_splits_endpoint_names() {
        let source = source(&[
            (ENDPOINT_NAMES_KEY, "google, github,,vk"),
            ("oauth2.github.client-id", "gh"),
        ]);
        let registry = Registry::from_source(&source).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(Provider::GitHub).unwrap().client_id, "gh");
        assert!(registry.get(Provider::Facebook).is_none());
    }

    #[test]
    fn endpoint_names_are_split_on_commas_only() {
        let source = source(&[(ENDPOINT_NAMES_KEY, "google github")]);
        match Registry::from_source(&source) {
            Err(ConfigError::UnknownEndpoint(name)) => assert_eq!(name, "google github"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_endpoint_names_yield_empty_registry() {
        let registry = Registry::from_source(&source(&[])).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_names_are_harmless() {
        let registry = Registry::build(["github", "github"], &source(&[])).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_ignores_unregistered_and_unknown_names() {
        let registry = Registry::build(["google"], &source(&[])).unwrap();
        assert!(registry.lookup("github").is_none());
        assert!(registry.lookup("nope").is_none());
    }
}
