//! Content-addressed storage access
//!
//! Metadata files and schema bundles live in IPFS; the sync pass only needs
//! "give me the bytes behind this locator".

pub mod bundle;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};

pub use bundle::extract;

/// Trait for fetching content by hash or URI
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolve a locator (`ipfs://<cid>` or a bare CID) to its bytes.
    async fn get_file(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Strip NUL padding, whitespace and an `ipfs://` scheme from a locator.
pub fn normalize_locator(locator: &str) -> String {
    let cleaned = locator.replace('\0', "");
    let trimmed = cleaned.trim();
    trimmed
        .strip_prefix("ipfs://")
        .unwrap_or(trimmed)
        .trim_start_matches('/')
        .to_string()
}

/// IPFS HTTP API client (`/api/v0/cat`)
pub struct IpfsClient {
    client: reqwest::Client,
    api_url: String,
}

impl IpfsClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContentStore for IpfsClient {
    async fn get_file(&self, locator: &str) -> Result<Vec<u8>> {
        let hash = normalize_locator(locator);
        if hash.is_empty() {
            return Err(Error::Content("empty content locator".to_string()));
        }

        let response = self
            .client
            .post(format!("{}/api/v0/cat", self.api_url))
            .query(&[("arg", hash.as_str())])
            .send()
            .await
            .map_err(|e| Error::Content(format!("fetching {}: {}", hash, e)))?;

        if !response.status().is_success() {
            return Err(Error::Content(format!(
                "fetching {}: HTTP {}",
                hash,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Content(format!("reading {}: {}", hash, e)))?;

        debug!(hash = %hash, bytes = bytes.len(), "Fetched content");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locator() {
        assert_eq!(normalize_locator("ipfs://QmHash"), "QmHash");
        assert_eq!(normalize_locator("QmHash"), "QmHash");
        assert_eq!(normalize_locator("ipfs://QmHash\0\0\0"), "QmHash");
        assert_eq!(normalize_locator("  QmHash \n"), "QmHash");
        assert_eq!(normalize_locator("\0\0"), "");
    }
}
