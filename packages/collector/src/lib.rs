//! nhlstats collector - fetch, cache and extract NHL statistics pages.
//!
//! This crate downloads league pages (standings, schedules, rosters and
//! play-by-play reports), keeps a verbatim copy of every document on disk,
//! and turns each document into typed records.
//!
//! # Example
//!
//! ```
//! use nhlstats_collector::collector::Page;
//! use nhlstats_collector::pages::Schedule;
//!
//! let schedule = Schedule::new("20132014", "Regular").unwrap();
//! assert!(schedule.url().contains("season=20132014&gameType=2"));
//!
//! // Invalid parameters never reach the network.
//! assert!(Schedule::new("2013", "Regular").is_err());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration, constants, validators and URL templates
//! - [`error`]: Error types and Result alias
//! - [`types`]: Records produced by the extractors
//! - [`http`]: HTTP fetcher
//! - [`cache`]: URL-keyed on-disk document cache
//! - [`document`]: Markup and JSON document loading
//! - [`html`]: Markup navigation helpers
//! - [`collector`]: The scrape pipeline and timezone conversion
//! - [`pages`]: Page families
//! - [`normalize`]: Canonical records for storage

pub mod cache;
pub mod collector;
pub mod config;
pub mod document;
pub mod error;
pub mod html;
pub mod http;
pub mod normalize;
pub mod pages;
pub mod types;

// Re-export commonly used items
pub use cache::CacheStore;
pub use collector::{Collector, Page, Scraped};
pub use config::{validate_game_type, validate_season, CollectorConfig};
pub use document::{ContentKind, Document};
pub use error::{CollectorError, ErrorClass, Result};
pub use http::{Fetch, HttpFetcher};
