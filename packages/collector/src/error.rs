//! Error types for the collector.
//!
//! Every failure a scrape can hit maps to one [`CollectorError`] variant, and
//! every variant belongs to exactly one [`ErrorClass`]. Callers processing a
//! batch use the class to decide between aborting and skipping.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::ContentKind;

/// Main error type for the collector library.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Season code is not two concatenated four digit years.
    #[error("Invalid season code: '{0}'. Expected two concatenated years (e.g., 20132014)")]
    InvalidSeason(String),

    /// Game type is not one of the known values.
    #[error("Invalid game type: '{0}'. Expected one of Preseason, Regular, Postseason")]
    InvalidGameType(String),

    /// Team code is not a lowercase team sub-domain.
    #[error("Invalid team code: '{0}'. Expected lowercase letters (e.g., capitals)")]
    InvalidTeamCode(String),

    /// Report id is not numeric.
    #[error("Invalid report id: '{0}'. Expected digits only (e.g., 021014)")]
    InvalidReportId(String),

    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network or transport failure, including non-success statuses.
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Reading or writing the on-disk cache failed.
    #[error("Cache I/O failed for {}: {source}", .path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Response body could not be interpreted as the expected content kind.
    #[error("Failed to parse {kind} document: {message}")]
    Parse { kind: ContentKind, message: String },

    /// A page asked for a document of a different kind than was loaded.
    #[error("Expected a {expected} document, got {found}")]
    ContentKindMismatch {
        expected: ContentKind,
        found: ContentKind,
    },

    /// Document parsed, but its shape is not the one the page expects.
    #[error("Unexpected contents on {page} page: expected {expected}, found {found}")]
    UnexpectedPageContents {
        page: &'static str,
        expected: String,
        found: String,
    },

    /// Verified document still held something the extractor could not read.
    #[error("Extraction failed on {page} page: {message}")]
    Extraction { page: &'static str, message: String },

    /// Local wall-clock time does not exist in the source zone.
    #[error("Local time {0} does not exist in the source timezone")]
    InvalidLocalTime(chrono::NaiveDateTime),
}

/// Broad classification of a [`CollectorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed input, raised before any I/O.
    Validation,
    /// The source could not be reached.
    Fetch,
    /// Local cache could not be read or written.
    Io,
    /// Body could not be parsed as HTML or JSON.
    Parse,
    /// Document changed shape.
    Verification,
    /// Anomaly inside an already verified document.
    Extraction,
}

impl CollectorError {
    /// Classify this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidSeason(_)
            | Self::InvalidGameType(_)
            | Self::InvalidTeamCode(_)
            | Self::InvalidReportId(_) => ErrorClass::Validation,
            Self::Client(_) | Self::Fetch { .. } => ErrorClass::Fetch,
            Self::Cache { .. } => ErrorClass::Io,
            Self::Parse { .. } | Self::ContentKindMismatch { .. } => ErrorClass::Parse,
            Self::UnexpectedPageContents { .. } => ErrorClass::Verification,
            Self::Extraction { .. } | Self::InvalidLocalTime(_) => ErrorClass::Extraction,
        }
    }

    /// Whether a batch caller may reasonably retry or skip this failure.
    ///
    /// Only fetch failures qualify; everything else would fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    pub(crate) fn unexpected(
        page: &'static str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedPageContents {
            page,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn extraction(page: &'static str, message: impl Into<String>) -> Self {
        Self::Extraction {
            page,
            message: message.into(),
        }
    }
}

/// Result type alias for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;
