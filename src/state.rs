use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

use crate::AuthError;

const STATE_BYTES: usize = 32;

/// Opaque CSRF token carried through the consent redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State(String);

impl State {
    pub fn generate() -> Result<Self, AuthError> {
        let mut bytes = [0u8; STATE_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| AuthError::OsRng {
                message: err.to_string(),
            })?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares a state echoed back by the provider.
    pub fn verify(&self, received: Option<&str>) -> Result<(), AuthError> {
        match received {
            Some(received) if received == self.0 => Ok(()),
            received => Err(AuthError::StateMismatch {
                expected: self.0.clone(),
                received: received.unwrap_or_default().to_string(),
            }),
        }
    }
}
