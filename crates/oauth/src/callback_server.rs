use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tokio::sync::{Mutex, oneshot};

/// How long to wait for the user to complete the browser consent step before
/// giving the port back.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const SUCCESS_BODY: &str = "Authorization successful! You can close this window.";
const MISSING_CODE_BODY: &str = "Missing authorization code in the callback URL.";
const BAD_STATE_BODY: &str = "State mismatch in the callback URL.";

struct Pending {
    expected_state: String,
    tx: Mutex<Option<oneshot::Sender<anyhow::Result<String>>>>,
}

/// One-shot local listener that captures the authorization code from the
/// provider's redirect.
///
/// The listener is a scoped resource: it serves exactly one callback request,
/// then shuts down, timeout or not.
pub struct CallbackServer {
    listener: tokio::net::TcpListener,
}

impl CallbackServer {
    /// Bind the listener on the given local port. Port 0 picks a free one.
    pub async fn bind(port: u16) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind callback listener on port {port}"))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Bind on `port` and capture a single authorization code.
    pub async fn wait_for_code(port: u16, expected_state: &str) -> anyhow::Result<String> {
        Self::bind(port).await?.capture(expected_state).await
    }

    /// Serve until exactly one callback request has been handled, then shut
    /// down and return the captured code. A request without a `code`
    /// parameter or with a mismatched `state` resolves to an error after the
    /// 400 response is sent.
    pub async fn capture(self, expected_state: &str) -> anyhow::Result<String> {
        let (tx, rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let pending = Arc::new(Pending {
            expected_state: expected_state.to_string(),
            tx: Mutex::new(Some(tx)),
        });

        let app = Router::new()
            .route("/", get(handle_callback))
            .with_state(pending);

        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = tokio::time::timeout(CALLBACK_TIMEOUT, rx).await;
        let _ = shutdown_tx.send(());
        let _ = server.await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => anyhow::bail!("callback listener closed before a request arrived"),
            Err(_) => anyhow::bail!("timed out waiting for the OAuth callback"),
        }
    }
}

async fn handle_callback(
    State(pending): State<Arc<Pending>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(tx) = pending.tx.lock().await.take() else {
        // A stray request raced in after the code was already captured.
        return (StatusCode::BAD_REQUEST, Html(MISSING_CODE_BODY)).into_response();
    };

    let state_ok = params
        .get("state")
        .is_some_and(|s| *s == pending.expected_state);

    match params.get("code") {
        Some(code) if state_ok => {
            tracing::debug!("authorization code received on callback");
            let _ = tx.send(Ok(code.clone()));
            Html(SUCCESS_BODY).into_response()
        },
        Some(_) => {
            tracing::warn!("callback carried an unexpected state token");
            let _ = tx.send(Err(anyhow::anyhow!("state mismatch in OAuth callback")));
            (StatusCode::BAD_REQUEST, Html(BAD_STATE_BODY)).into_response()
        },
        None => {
            tracing::warn!("callback arrived without an authorization code");
            let _ = tx.send(Err(anyhow::anyhow!(
                "authorization code missing from callback"
            )));
            (StatusCode::BAD_REQUEST, Html(MISSING_CODE_BODY)).into_response()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_callback_with_code_captures_and_responds_200() {
        let server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr().unwrap();
        let handle = tokio::spawn(async move { server.capture("xyz789").await });

        let resp = reqwest::get(format!("http://{addr}/?code=ABC&state=xyz789"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert!(
            resp.text()
                .await
                .unwrap()
                .contains("Authorization successful")
        );

        let code = handle.await.unwrap().unwrap();
        assert_eq!(code, "ABC");
    }

    #[tokio::test]
    async fn test_callback_without_code_responds_400() {
        let server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr().unwrap();
        let handle = tokio::spawn(async move { server.capture("xyz789").await });

        let resp = reqwest::get(format!("http://{addr}/?state=xyz789"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert!(resp.text().await.unwrap().contains("Missing authorization code"));

        assert!(handle.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_callback_with_wrong_state_responds_400() {
        let server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr().unwrap();
        let handle = tokio::spawn(async move { server.capture("expected").await });

        let resp = reqwest::get(format!("http://{addr}/?code=ABC&state=forged"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        assert!(handle.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_listener_shuts_down_after_one_request() {
        let server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr().unwrap();
        let handle = tokio::spawn(async move { server.capture("xyz").await });

        reqwest::get(format!("http://{addr}/?code=ABC&state=xyz"))
            .await
            .unwrap();
        handle.await.unwrap().unwrap();

        // The port is released once the code has been captured.
        let err = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
            .get(format!("http://{addr}/"))
            .send()
            .await;
        assert!(err.is_err());
    }
}
