//! Content-addressed on-disk cache of fetched documents.
//!
//! Each URL maps to one file named by the SHA-256 of the URL. Entries are
//! never expired; staleness is the caller's concern.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};
use crate::http::Fetch;

/// A document as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDocument {
    /// URL the document was fetched from.
    pub url: String,
    /// Storage key derived from the URL.
    pub key: String,
    /// Verbatim response body.
    pub content: Vec<u8>,
    /// True when this resolve had to go to the network.
    pub fetched: bool,
}

/// Compute the storage key for a URL.
///
/// # Examples
/// ```
/// use nhlstats_collector::cache::cache_key;
///
/// let key = cache_key("http://www.nhl.com/ice/teams.htm");
/// assert_eq!(key.len(), 64);
/// assert_eq!(key, cache_key("http://www.nhl.com/ice/teams.htm"));
/// ```
#[must_use]
pub fn cache_key(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

/// On-disk cache in front of a [`Fetch`] implementation.
#[derive(Debug)]
pub struct CacheStore<F> {
    dir: PathBuf,
    use_cache: bool,
    fetcher: F,
}

impl<F: Fetch> CacheStore<F> {
    /// Create a store using the configured directory and cache policy.
    pub fn new(config: &CollectorConfig, fetcher: F) -> Self {
        Self {
            dir: config.cache_dir.clone(),
            use_cache: config.use_cache,
            fetcher,
        }
    }

    /// Directory holding the cached files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The fetcher used on a miss.
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Location a URL is (or would be) cached at.
    #[must_use]
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(cache_key(url))
    }

    /// Whether a cached copy of the URL exists.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.path_for(url).is_file()
    }

    /// Return the document behind a URL, fetching and storing it on a miss.
    ///
    /// A fetch failure is returned as is and nothing is written.
    ///
    /// # Arguments
    /// * `url` - Absolute URL of the document
    ///
    /// # Returns
    /// * `Ok(CachedDocument)` with `fetched` set when the network was used
    /// * `Err(CollectorError::Fetch)` if the fetcher fails
    /// * `Err(CollectorError::Cache)` if the cache directory cannot be read or written
    pub fn resolve(&self, url: &str) -> Result<CachedDocument> {
        let key = cache_key(url);
        let path = self.dir.join(&key);

        if self.use_cache {
            match fs::read(&path) {
                Ok(content) => {
                    tracing::debug!(url, key = %key, "Cache hit");
                    return Ok(CachedDocument {
                        url: url.to_string(),
                        key,
                        content,
                        fetched: false,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(CollectorError::Cache { path, source }),
            }
        }

        tracing::debug!(url, key = %key, use_cache = self.use_cache, "Cache miss");
        let content = self.fetcher.fetch(url)?;
        self.store(&path, &content)?;

        Ok(CachedDocument {
            url: url.to_string(),
            key,
            content,
            fetched: true,
        })
    }

    /// Write to a temporary file in the cache directory, then rename it into
    /// place so readers never see a partial file.
    fn store(&self, path: &Path, content: &[u8]) -> Result<()> {
        let cache_error = |source| CollectorError::Cache {
            path: path.to_path_buf(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(cache_error)?;
        let mut file = NamedTempFile::new_in(&self.dir).map_err(cache_error)?;
        file.write_all(content).map_err(cache_error)?;
        file.persist(path).map_err(|e| cache_error(e.error))?;
        Ok(())
    }
}
