use url::Url;

use crate::AuthError;

#[derive(Debug, Clone)]
pub(super) struct RedirectTarget {
    pub(super) host: String,
    pub(super) port: u16,
    pub(super) path: String,
}

impl RedirectTarget {
    pub(super) fn parse(redirect_uri: &str) -> Result<Self, AuthError> {
        let url = Url::parse(redirect_uri)?;
        if url.scheme() != "http" {
            return Err(AuthError::InvalidRedirectUri(format!(
                "{redirect_uri}: only http loopback redirects can be served locally"
            )));
        }

        let host = url.host_str().ok_or_else(|| {
            AuthError::InvalidRedirectUri(format!("{redirect_uri}: missing host"))
        })?;

        Ok(Self {
            host: host.trim_matches(['[', ']']).to_string(),
            port: url.port_or_known_default().unwrap_or(80),
            path: url.path().to_string(),
        })
    }

    /// Rebuilds the full callback url seen by the listener.
    pub(super) fn callback_url(&self, query: &str) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if query.is_empty() {
            format!("http://{host}:{}{}", self.port, self.path)
        } else {
            format!("http://{host}:{}{}?{query}", self.port, self.path)
        }
    }
}
