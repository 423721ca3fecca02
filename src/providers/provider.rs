use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::profile::{self, User};
use crate::{AuthError, ConfigError};

use super::Endpoint;
use super::endpoints::*;

/// Identity providers this crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    Facebook,
    GitHub,
    Vk,
    Odnoklassniki,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Google,
        Provider::Facebook,
        Provider::GitHub,
        Provider::Vk,
        Provider::Odnoklassniki,
    ];

    /// Name used in configuration keys, e.g. `oauth2.<id>.client-id`.
    pub fn id(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
            Provider::GitHub => "github",
            Provider::Vk => "vk",
            Provider::Odnoklassniki => "odnoklassniki",
        }
    }

    pub fn endpoint(self) -> Endpoint {
        match self {
            Provider::Google => Endpoint::new(GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL),
            Provider::Facebook => Endpoint::new(FACEBOOK_AUTH_URL, FACEBOOK_TOKEN_URL),
            Provider::GitHub => Endpoint::new(GITHUB_AUTH_URL, GITHUB_TOKEN_URL),
            Provider::Vk => Endpoint::new(VK_AUTH_URL, VK_TOKEN_URL),
            Provider::Odnoklassniki => {
                Endpoint::new(ODNOKLASSNIKI_AUTH_URL, ODNOKLASSNIKI_TOKEN_URL)
            }
        }
    }

    /// Whether a profile payload of this provider can be normalized.
    pub fn has_profile_mapping(self) -> bool {
        match self {
            Provider::Google | Provider::Facebook | Provider::GitHub => true,
            Provider::Vk | Provider::Odnoklassniki => false,
        }
    }

    /// Maps a raw profile payload into a [`User`].
    ///
    /// VK and Odnoklassniki can be registered and complete a token exchange,
    /// but their profile shapes are not mapped, so they fail here.
    pub fn extract_user(self, profile: &Value) -> Result<User, AuthError> {
        match self {
            Provider::Google => profile::google_user(profile),
            Provider::Facebook => profile::facebook_user(profile),
            Provider::GitHub => profile::github_user(profile),
            Provider::Vk | Provider::Odnoklassniki => {
                Err(AuthError::UnknownEndpoint(self.id().to_string()))
            }
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|provider| provider.id() == name)
            .ok_or_else(|| ConfigError::UnknownEndpoint(name.to_string()))
    }
}
