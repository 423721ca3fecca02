use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::{AuthError, Stage};

/// Query parameters a provider appends to the redirect uri.
#[derive(Debug, Clone)]
pub struct AuthorizationResponse {
    pub code: String,
    pub state: Option<String>,
}

impl AuthorizationResponse {
    pub fn from_url(callback_url: &str) -> Result<Self, AuthError> {
        let url = Url::parse(callback_url)?;
        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut description = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.to_string()),
                "state" => state = Some(value.to_string()),
                "error" => error = Some(value.to_string()),
                "error_description" => description = Some(value.to_string()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Err(AuthError::AuthorizationDenied { error, description });
        }

        let code = code
            .filter(|code| !code.is_empty())
            .ok_or(AuthError::MissingAuthorizationCode)?;
        Ok(Self { code, state })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TokenResponse {
    /// Parses a token endpoint body, JSON or form-encoded depending on `content_type`.
    pub(crate) fn parse(content_type: Option<&str>, body: String) -> Result<Self, AuthError> {
        let token = if is_form_encoded(content_type) {
            Self::from_form(&body)
        } else {
            serde_json::from_str::<Self>(&body).map_err(|err| AuthError::InvalidResponse {
                stage: Stage::TokenExchange,
                message: err.to_string(),
                body,
            })?
        };

        if let Some(error) = token.extra_str("error") {
            return Err(AuthError::TokenError {
                error: error.to_string(),
                description: token.extra_str("error_description").map(str::to_string),
            });
        }
        if token.access_token.is_empty() {
            return Err(AuthError::MissingAccessToken);
        }
        Ok(token)
    }

    fn from_form(body: &str) -> Self {
        let mut token = Self {
            access_token: String::new(),
            refresh_token: None,
            token_type: None,
            scope: None,
            expires_in: None,
            extra: HashMap::new(),
        };

        for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "access_token" => token.access_token = value,
                "refresh_token" => token.refresh_token = Some(value),
                "token_type" => token.token_type = Some(value),
                "scope" => token.scope = Some(value),
                "expires_in" => token.expires_in = value.parse().ok(),
                _ => {
                    token.extra.insert(key.to_string(), Value::String(value));
                }
            }
        }
        token
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

fn is_form_encoded(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/x-www-form-urlencoded" || mime == "text/plain"
}

// Some providers send `expires_in` as a numeric string.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(secs)) => Ok(Some(secs)),
        Some(Seconds::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
