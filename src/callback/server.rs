use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::debug;

use crate::{AuthError, AuthorizationResponse};

use super::target::RedirectTarget;

const SUCCESS_HTML: &str = "<!doctype html><html><head><meta charset=\"utf-8\" /><title>Signed in</title></head><body><p>Sign-in complete. You may close this window.</p></body></html>";
const ERROR_HTML: &str = "<!doctype html><html><head><meta charset=\"utf-8\" /><title>Sign-in failed</title></head><body><p>Sign-in failed. You may close this window and try again.</p></body></html>";

type CallbackResult = Result<AuthorizationResponse, AuthError>;
type SharedSender = Arc<Mutex<Option<oneshot::Sender<CallbackResult>>>>;

#[derive(Clone)]
struct CallbackState {
    target: RedirectTarget,
    sender: SharedSender,
}

/// Serves the redirect uri path until one callback arrives.
#[derive(Debug, Clone)]
pub struct CallbackServer {
    target: RedirectTarget,
    timeout: Option<Duration>,
}

impl CallbackServer {
    pub fn new(redirect_uri: &str) -> Result<Self, AuthError> {
        Ok(Self {
            target: RedirectTarget::parse(redirect_uri)?,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn bind(&self) -> Result<TcpListener, AuthError> {
        let listener = TcpListener::bind((self.target.host.as_str(), self.target.port)).await?;
        Ok(listener)
    }

    /// Waits for the first callback carrying a code or a provider error.
    pub async fn listen(&self, listener: TcpListener) -> CallbackResult {
        let mut target = self.target.clone();
        let addr: SocketAddr = listener.local_addr()?;
        target.port = addr.port();
        debug!(%addr, path = %target.path, "waiting for oauth2 callback");

        let (sender, receiver) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let state = CallbackState {
            target: target.clone(),
            sender: Arc::new(Mutex::new(Some(sender))),
        };

        let app = Router::new()
            .route(&target.path, get(callback_handler))
            .fallback(|| async { (StatusCode::NOT_FOUND, Html(ERROR_HTML)) })
            .with_state(state);

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, receiver)
                .await
                .map_err(|_| AuthError::CallbackTimeout { timeout })?,
            None => receiver.await,
        };

        let _ = shutdown_tx.send(());
        let _ = server.await;

        result.map_err(|_| {
            AuthError::Io(std::io::Error::other("callback server stopped before a callback arrived"))
        })?
    }
}

async fn callback_handler(
    State(state): State<CallbackState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let callback_url = state.target.callback_url(&query.unwrap_or_default());
    let result = AuthorizationResponse::from_url(&callback_url);

    let (status, page) = match &result {
        Ok(_) => (StatusCode::OK, SUCCESS_HTML),
        Err(AuthError::MissingAuthorizationCode) => (StatusCode::BAD_REQUEST, ERROR_HTML),
        Err(AuthError::AuthorizationDenied { .. }) => (StatusCode::FORBIDDEN, ERROR_HTML),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, ERROR_HTML),
    };

    // Stray requests without a code keep the listener waiting.
    if status == StatusCode::BAD_REQUEST {
        return (status, Html(page));
    }

    if let Ok(mut guard) = state.sender.lock() {
        if let Some(sender) = guard.take() {
            let _ = sender.send(result);
        }
    }

    (status, Html(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_code_and_state() {
        let server = CallbackServer::new("http://127.0.0.1:0/callback")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        let listener = server.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move { server.listen(listener).await });

        let client = reqwest::Client::new();
        let missing = client
            .get(format!("http://{addr}/callback?state=s"))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 400);

        let ok = client
            .get(format!("http://{addr}/callback?code=abc&state=s"))
            .send()
            .await
            .unwrap();
        assert_eq!(ok.status().as_u16(), 200);

        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.code, "abc");
        assert_eq!(response.state.as_deref(), Some("s"));
    }

    #[tokio::test]
    async fn reports_denied_consent() {
        let server = CallbackServer::new("http://127.0.0.1:0/cb").unwrap();
        let listener = server.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move { server.listen(listener).await });

        let denied = reqwest::get(format!("http://{addr}/cb?error=access_denied"))
            .await
            .unwrap();
        assert_eq!(denied.status().as_u16(), 403);

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AuthError::AuthorizationDenied { .. })));
    }

    #[tokio::test]
    async fn times_out_without_callback() {
        let server = CallbackServer::new("http://127.0.0.1:0/callback")
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        let listener = server.bind().await.unwrap();

        let result = server.listen(listener).await;
        assert!(matches!(result, Err(AuthError::CallbackTimeout { .. })));
    }
}
