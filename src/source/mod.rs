//! Upstream playlist retrieval.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::errors::FetchError;

/// Abstraction over playlist retrieval so refresh and serving logic can be
/// exercised without a live upstream.
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    /// Fetch the raw playlist text from the upstream source.
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Fetches the playlist over HTTP(S) with a shared reqwest client.
pub struct HttpPlaylistFetcher {
    client: Client,
    url: String,
}

impl HttpPlaylistFetcher {
    pub fn new(url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("m3u-sieve/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, url }
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch(&self) -> Result<String, FetchError> {
        debug!("Fetching playlist from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body)
    }
}
