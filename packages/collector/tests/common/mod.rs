//! Shared helpers for the collector integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use nhlstats_collector::{CollectorConfig, Fetch, Result};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test subscriber once. Set `RUST_LOG=nhlstats_collector=debug`
/// to see scrape stages.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load fixture file content.
pub fn load_fixture(name: &str) -> Vec<u8> {
    let path = fixture_path(name);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Configuration with the cache in `dir`.
pub fn config(dir: &Path) -> CollectorConfig {
    CollectorConfig::new(dir.join("cache"))
}

/// Serves fixtures by URL shape and counts requests.
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    calls: AtomicUsize,
}

impl FixtureFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetch for FixtureFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fixture = if url.contains("/ice/standings.htm") {
            "standings.html"
        } else if url.contains("/ice/schedulebyseason.htm?season=30003001") {
            "schedule_empty.html"
        } else if url.contains("/ice/schedulebyseason.htm") {
            "schedule.html"
        } else if url.contains("/ice/teams.htm") {
            "teams.html"
        } else if url.ends_with("/club/roster.htm") {
            "roster.html"
        } else if url.contains("/scores/htmlreports/") {
            "events.html"
        } else if url.ends_with("/PlayByPlay.json") {
            "locations.json"
        } else {
            panic!("no fixture for {url}");
        };
        Ok(load_fixture(fixture))
    }
}
