//! Access token capability

use std::future::Future;

use async_trait::async_trait;

/// Supplies a fresh bearer token before every request
///
/// Implemented for any `Fn() -> impl Future<Output = anyhow::Result<String>>`,
/// so an async closure can be handed to the builder directly:
///
/// ```rust,no_run
/// use toon_client::ToonClient;
///
/// let client = ToonClient::builder("initial-token")
///     .token_provider(|| async { Ok::<_, anyhow::Error>("rotated-token".to_string()) })
///     .build()?;
/// # Ok::<(), toon_client::ToonError>(())
/// ```
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> anyhow::Result<String>;
}

#[async_trait]
impl<F, Fut> TokenProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    async fn token(&self) -> anyhow::Result<String> {
        (self)().await
    }
}
