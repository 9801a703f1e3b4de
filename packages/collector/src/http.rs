//! HTTP fetching for the cache store.
//!
//! The source gives no retry or backoff guidance, so nothing here retries.
//! A failed request is reported once and the caller decides what to do.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};

/// Retrieve the raw body behind a URL.
///
/// The cache store calls this on a miss. Implementations must not cache.
pub trait Fetch {
    /// Fetch the body of `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Create a configured HTTP client.
///
/// # Arguments
/// * `config` - Supplies the request timeout and user agent
///
/// # Returns
/// * `Ok(Client)` ready for blocking requests
/// * `Err(CollectorError::Client)` if the TLS backend cannot be initialized
pub fn create_client(config: &CollectorConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(CollectorError::Client)
}

/// Blocking HTTP fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the collector configuration.
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_error = |source| CollectorError::Fetch {
            url: url.to_string(),
            source,
        };

        tracing::debug!(url, "Fetching");
        let response = self.client.get(url).send().map_err(fetch_error)?;
        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            tracing::warn!(url, status = %status, "Source returned an error status");
            fetch_error(e)
        })?;
        let bytes = response.bytes().map_err(fetch_error)?;
        Ok(bytes.to_vec())
    }
}
