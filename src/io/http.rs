use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::{Fetch, FetchError};

/// Downloads a resource with a single HTTP GET and buffers the body
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the client's default redirect and timeout policy
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url, "sending GET request");
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = resp.bytes().await?;
        info!(url, bytes = body.len(), "download finished");
        Ok(body.to_vec())
    }
}
