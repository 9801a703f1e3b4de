//! The collector ties cache, loader and page families together.
//!
//! A scrape walks `validated → fetched → parsed → verified → extracted`.
//! Validation already happened when the page was constructed; every later
//! stage either advances or returns the error of that stage.

use std::fmt;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::cache::CacheStore;
use crate::config::CollectorConfig;
use crate::document::{load, ContentKind, Document};
use crate::error::{CollectorError, Result};
use crate::http::{Fetch, HttpFetcher};

/// Zone the source prints its times in.
pub const SOURCE_TIMEZONE: Tz = chrono_tz::US::Eastern;

/// A page family: where its document lives, how to check its shape and how
/// to turn it into records.
///
/// Implementations validate their parameters in their constructors, so a
/// page value always builds a valid URL.
pub trait Page {
    /// Records produced by one scrape.
    type Output;

    /// Short name used in logs and errors.
    const NAME: &'static str;

    /// Content kind the page is served as.
    const KIND: ContentKind;

    /// URL of the document.
    fn url(&self) -> String;

    /// Check the document still has the expected shape.
    fn verify(&self, document: &Document) -> Result<()>;

    /// Extract records from a verified document.
    fn extract(&self, document: &Document) -> Result<Self::Output>;
}

/// Stage a scrape has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validated,
    Fetched,
    Parsed,
    Verified,
    Extracted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validated => "validated",
            Self::Fetched => "fetched",
            Self::Parsed => "parsed",
            Self::Verified => "verified",
            Self::Extracted => "extracted",
        };
        f.write_str(name)
    }
}

/// Result of a successful scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Scraped<T> {
    /// URL the records came from.
    pub url: String,
    /// True when the document had to be fetched. Callers throttling live
    /// requests wait only after these.
    pub fetched: bool,
    /// Extracted records.
    pub records: T,
}

/// Runs page families against a cache store.
#[derive(Debug)]
pub struct Collector<F = HttpFetcher> {
    cache: CacheStore<F>,
}

impl Collector<HttpFetcher> {
    /// Create a collector fetching over HTTP.
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        Ok(Self::with_fetcher(config, HttpFetcher::new(config)?))
    }
}

impl<F: Fetch> Collector<F> {
    /// Create a collector with a custom fetcher.
    pub fn with_fetcher(config: &CollectorConfig, fetcher: F) -> Self {
        Self {
            cache: CacheStore::new(config, fetcher),
        }
    }

    /// The underlying cache store.
    #[must_use]
    pub fn cache(&self) -> &CacheStore<F> {
        &self.cache
    }

    /// Fetch (or load from cache), parse, verify and extract one page.
    ///
    /// # Arguments
    /// * `page` - Page family with already validated parameters
    ///
    /// # Returns
    /// * `Ok(Scraped)` with the records and whether the document was fetched
    /// * `Err(_)` from the first stage that failed; see [`CollectorError::class`]
    pub fn scrape<P: Page>(&self, page: &P) -> Result<Scraped<P::Output>> {
        let url = page.url();
        tracing::debug!(page = P::NAME, url = %url, stage = %Stage::Validated, "Scrape started");

        let cached = self.cache.resolve(&url)?;
        tracing::debug!(
            page = P::NAME,
            fetched = cached.fetched,
            stage = %Stage::Fetched,
            "Document resolved"
        );

        let document = load(&cached.content, P::KIND)?;
        tracing::debug!(page = P::NAME, stage = %Stage::Parsed, "Document parsed");

        page.verify(&document).inspect_err(|e| {
            tracing::warn!(page = P::NAME, url = %url, error = %e, "Page failed verification");
        })?;
        tracing::debug!(page = P::NAME, stage = %Stage::Verified, "Document verified");

        let records = page.extract(&document)?;
        tracing::info!(
            page = P::NAME,
            url = %url,
            fetched = cached.fetched,
            stage = %Stage::Extracted,
            "Scrape finished"
        );

        Ok(Scraped {
            url,
            fetched: cached.fetched,
            records,
        })
    }
}

/// Convert a local wall-clock time in `zone` to UTC.
///
/// An ambiguous time (the repeated hour when daylight saving ends) resolves
/// to the standard-time reading. A time skipped when daylight saving starts
/// is an error.
pub fn to_utc(local: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, standard) => Ok(standard.with_timezone(&Utc)),
        LocalResult::None => Err(CollectorError::InvalidLocalTime(local)),
    }
}

/// Convert a local wall-clock time in the source zone (US/Eastern) to UTC.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use nhlstats_collector::collector::eastern_to_utc;
///
/// let local = NaiveDate::from_ymd_opt(2014, 5, 1).unwrap().and_hms_opt(19, 30, 0).unwrap();
/// let utc = eastern_to_utc(local).unwrap();
/// assert_eq!(utc.to_rfc3339(), "2014-05-01T23:30:00+00:00");
/// ```
pub fn eastern_to_utc(local: NaiveDateTime) -> Result<DateTime<Utc>> {
    to_utc(local, SOURCE_TIMEZONE)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::{NaiveDate, Timelike};

    use super::*;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_eastern_daylight_time() {
        let utc = eastern_to_utc(local(2014, 5, 1, 19, 30)).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2014, 5, 1, 23, 30, 0).unwrap());
    }

    #[test]
    fn test_eastern_standard_time() {
        let utc = eastern_to_utc(local(2014, 3, 8, 19, 0)).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2014, 3, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_rolls_over() {
        let utc = eastern_to_utc(local(2005, 9, 25, 21, 0)).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2005, 9, 26, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_ambiguous_time_uses_standard_offset() {
        // 2013-11-03 01:30 happens twice in US/Eastern.
        let utc = eastern_to_utc(local(2013, 11, 3, 1, 30)).unwrap();
        assert_eq!(utc.hour(), 6);
    }

    #[test]
    fn test_skipped_time_is_error() {
        // 2014-03-09 02:30 does not exist in US/Eastern.
        let err = eastern_to_utc(local(2014, 3, 9, 2, 30)).unwrap_err();
        assert!(matches!(err, CollectorError::InvalidLocalTime(_)));
    }

    #[test]
    fn test_other_zone() {
        let utc = to_utc(local(2014, 1, 15, 19, 0), chrono_tz::US::Pacific).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2014, 1, 16, 3, 0, 0).unwrap());
    }

    struct StaticFetcher {
        body: &'static str,
        calls: Cell<usize>,
    }

    impl Fetch for StaticFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.body.as_bytes().to_vec())
        }
    }

    struct TitlePage;

    impl Page for TitlePage {
        type Output = String;
        const NAME: &'static str = "title";
        const KIND: ContentKind = ContentKind::Json;

        fn url(&self) -> String {
            "http://example.test/title.json".to_string()
        }

        fn verify(&self, document: &Document) -> Result<()> {
            match document.json()?.get("title") {
                Some(_) => Ok(()),
                None => Err(CollectorError::unexpected(Self::NAME, "title key", "none")),
            }
        }

        fn extract(&self, document: &Document) -> Result<String> {
            Ok(document.json()?["title"].as_str().unwrap_or_default().to_string())
        }
    }

    fn collector(body: &'static str) -> (tempfile::TempDir, Collector<StaticFetcher>) {
        let dir = tempfile::tempdir().unwrap();
        let config = CollectorConfig::new(dir.path());
        let fetcher = StaticFetcher {
            body,
            calls: Cell::new(0),
        };
        let collector = Collector::with_fetcher(&config, fetcher);
        (dir, collector)
    }

    #[test]
    fn test_scrape_fetches_once() {
        let (_dir, collector) = collector(r#"{"title": "hello"}"#);

        let first = collector.scrape(&TitlePage).unwrap();
        assert!(first.fetched);
        assert_eq!(first.records, "hello");

        let second = collector.scrape(&TitlePage).unwrap();
        assert!(!second.fetched);
        assert_eq!(second.records, first.records);
        assert_eq!(collector.cache.fetcher_calls(), 1);
    }

    #[test]
    fn test_scrape_stops_at_verification() {
        let (_dir, collector) = collector(r#"{"other": 1}"#);
        let err = collector.scrape(&TitlePage).unwrap_err();
        assert!(matches!(err, CollectorError::UnexpectedPageContents { page: "title", .. }));
    }

    #[test]
    fn test_scrape_stops_at_parse() {
        let (_dir, collector) = collector("<html>");
        let err = collector.scrape(&TitlePage).unwrap_err();
        assert!(matches!(err, CollectorError::Parse { .. }));
    }

    impl CacheStore<StaticFetcher> {
        fn fetcher_calls(&self) -> usize {
            self.fetcher().calls.get()
        }
    }
}
