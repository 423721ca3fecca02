//! Normalization of provider profile payloads into a common [`User`].
//!
//! Absent or `null` fields become empty strings. A field present with an
//! unexpected JSON type is reported as [`AuthError::MalformedProfile`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AuthError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub picture: String,
}

pub(crate) fn google_user(profile: &Value) -> Result<User, AuthError> {
    let fields = Fields::new("google", profile)?;
    Ok(User {
        name: fields.string("name")?,
        email: fields.string("email")?,
        picture: fields.string("picture")?,
    })
}

pub(crate) fn facebook_user(profile: &Value) -> Result<User, AuthError> {
    let fields = Fields::new("facebook", profile)?;
    let picture = match fields.object("picture")? {
        Some(picture) => match picture.object("data")? {
            Some(data) => data.string("url")?,
            None => String::new(),
        },
        None => String::new(),
    };

    Ok(User {
        name: fields.string("name")?,
        email: fields.string("email")?,
        picture,
    })
}

/// GitHub's public profile does not reliably expose an email, so it stays empty.
pub(crate) fn github_user(profile: &Value) -> Result<User, AuthError> {
    let fields = Fields::new("github", profile)?;
    Ok(User {
        name: fields.string("login")?,
        email: String::new(),
        picture: fields.string("avatar_url")?,
    })
}

/// Typed view over one JSON object, remembering its path for error messages.
struct Fields<'a> {
    provider: &'static str,
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(provider: &'static str, profile: &'a Value) -> Result<Self, AuthError> {
        match profile {
            Value::Object(map) => Ok(Self {
                provider,
                path: String::new(),
                map,
            }),
            _ => Err(AuthError::MalformedProfile {
                provider,
                field: "$".to_string(),
                expected: "an object",
            }),
        }
    }

    fn field_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn string(&self, key: &str) -> Result<String, AuthError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(value)) => Ok(value.clone()),
            Some(_) => Err(AuthError::MalformedProfile {
                provider: self.provider,
                field: self.field_path(key),
                expected: "a string",
            }),
        }
    }

    fn object(&self, key: &str) -> Result<Option<Fields<'a>>, AuthError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Fields {
                provider: self.provider,
                path: self.field_path(key),
                map,
            })),
            Some(_) => Err(AuthError::MalformedProfile {
                provider: self.provider,
                field: self.field_path(key),
                expected: "an object",
            }),
        }
    }
}
