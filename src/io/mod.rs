mod http;
mod memory;

pub use http::HttpFetcher;
pub use memory::MemoryReader;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::io;
use thiserror::Error;

/// Errors raised while downloading a resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("{status} for url: {url}")]
    Status { status: StatusCode, url: String },

    /// The request could not be completed
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Trait for retrieving a whole resource into memory
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Download `url` and return the full response body
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill the whole buffer from `offset`, failing with `UnexpectedEof` on a short read
    async fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let n = self.read_at(offset, buf).await?;
        if n < buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("needed {} bytes at offset {}, got {}", buf.len(), offset, n),
            ));
        }
        Ok(())
    }
}
