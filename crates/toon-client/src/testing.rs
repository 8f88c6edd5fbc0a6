//! Test utilities for toon-client
//!
//! Runs a stand-in for the Toon API on a local port and hands out a client
//! pointed at it.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::client::{ToonClient, ToonClientBuilder};
use crate::retry::RetryPolicy;

/// Token the test client authenticates with
pub const TEST_TOKEN: &str = "test-token";

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: ToonClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Serve `router` and build a client for it
    ///
    /// The client retries with 1 ms delays, without jitter, and times out
    /// after 2 seconds.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use toon_client::testing::TestServer;
    ///
    /// let router = Router::new().route(
    ///     "/toon/v3/agreements",
    ///     get(|| async { Json(serde_json::json!([{"agreementId": "A1"}])) }),
    /// );
    /// let mut server = TestServer::start(router).await?;
    /// server.client.activate_agreement(AgreementSelector::id("A1")).await?;
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> anyhow::Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        Self::start_with(router, |builder| builder).await
    }

    /// Like [`TestServer::start`], with a hook to adjust the client builder
    pub async fn start_with<S, F>(router: axum::Router<S>, configure: F) -> anyhow::Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
        F: FnOnce(ToonClientBuilder) -> ToonClientBuilder,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let fast = RetryPolicy::new(3, Duration::from_millis(1)).with_jitter(false);
        let builder = ToonClient::builder(TEST_TOKEN)
            .base_url(format!("http://{}/", addr))
            .request_timeout(Duration::from_secs(2))
            .retry_policies(fast, RetryPolicy { max_tries: 6, ..fast });
        let client = configure(builder).build()?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
