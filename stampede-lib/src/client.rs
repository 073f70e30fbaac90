use std::time::Duration;

use crate::error::ClientError;

/// Default cap on how long a single request may take.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP collaborator the engine issues requests through.
///
/// The engine only needs a GET resolving to a status code; response
/// bodies play no role in the measurements taken. Implementations are
/// cloned once per simulated user and must share state cheaply.
pub trait RequestClient: Clone + Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = Result<http::StatusCode, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct WebClientConfig {
    /// Cap on how long a single request may take, connect time included.
    pub request_timeout: Duration,
}

impl Default for WebClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// reqwest backed [`RequestClient`].
///
/// Clones share one connection pool, so simulated users reuse
/// connections the way a keep alive browser would.
#[derive(Debug, Clone)]
pub struct WebClient {
    inner: reqwest::Client,
}

impl WebClient {
    pub fn try_new(cfg: WebClientConfig) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|err| ClientError::Transport(err.into()))?;
        Ok(Self { inner })
    }
}

impl RequestClient for WebClient {
    async fn get(&self, url: &str) -> Result<http::StatusCode, ClientError> {
        let response = self.inner.get(url).send().await.map_err(|err| {
            if err.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Transport(err.into())
            }
        })?;
        Ok(response.status())
    }
}
