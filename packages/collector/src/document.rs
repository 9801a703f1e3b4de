//! Turning cached bytes into a queryable document tree.

use std::fmt;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::bytes::Regex;
use scraper::Html;
use serde_json::Value;

use crate::error::{CollectorError, Result};

/// Bytes searched for a charset declaration.
const CHARSET_SNIFF_LIMIT: usize = 1024;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static META_CHARSET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*charset\s*=\s*["']?([a-z0-9_.:-]+)"#).expect("valid regex")
});

/// Kind of content a page family serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML markup.
    Markup,
    /// JSON.
    Json,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markup => f.write_str("markup"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// A parsed document.
#[derive(Debug)]
pub enum Document {
    Markup(Html),
    Json(Value),
}

impl Document {
    /// Kind of this document.
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Markup(_) => ContentKind::Markup,
            Self::Json(_) => ContentKind::Json,
        }
    }

    /// The markup tree, or an error for a JSON document.
    pub fn markup(&self) -> Result<&Html> {
        match self {
            Self::Markup(html) => Ok(html),
            Self::Json(_) => Err(CollectorError::ContentKindMismatch {
                expected: ContentKind::Markup,
                found: ContentKind::Json,
            }),
        }
    }

    /// The JSON value, or an error for a markup document.
    pub fn json(&self) -> Result<&Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Markup(_) => Err(CollectorError::ContentKindMismatch {
                expected: ContentKind::Json,
                found: ContentKind::Markup,
            }),
        }
    }
}

/// Parse raw bytes into a document of the given kind.
///
/// # Arguments
/// * `bytes` - Response body as stored in the cache
/// * `kind` - Content kind the page family expects
///
/// # Returns
/// * `Ok(Document)` of the requested kind
/// * `Err(CollectorError::Parse)` for an empty markup body or malformed JSON
///
/// # Examples
/// ```
/// use nhlstats_collector::document::{load, ContentKind};
///
/// let doc = load(br#"{"data": {}}"#, ContentKind::Json).unwrap();
/// assert!(doc.json().unwrap().get("data").is_some());
/// assert!(load(b"{", ContentKind::Json).is_err());
/// ```
pub fn load(bytes: &[u8], kind: ContentKind) -> Result<Document> {
    match kind {
        ContentKind::Markup => {
            let text = bytes_to_string(bytes);
            if text.trim().is_empty() {
                return Err(CollectorError::Parse {
                    kind,
                    message: "document is empty".to_string(),
                });
            }
            Ok(Document::Markup(Html::parse_document(&text)))
        }
        ContentKind::Json => serde_json::from_slice(bytes)
            .map(Document::Json)
            .map_err(|e| CollectorError::Parse {
                kind,
                message: e.to_string(),
            }),
    }
}

/// Decode an HTML body.
///
/// UTF-8 bodies are used as is. Anything else is decoded with the charset the
/// page declares in a `<meta>` tag, or windows-1252 (the HTML default for
/// Latin-1 labelled pages) when it declares none.
fn bytes_to_string(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let encoding = declared_charset(bytes)
        .and_then(Encoding::for_label)
        .filter(|encoding| *encoding != UTF_8)
        .unwrap_or(WINDOWS_1252);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "Document has sequences invalid in its charset");
    } else {
        tracing::debug!(encoding = encoding.name(), "Decoded non UTF-8 document");
    }
    text.into_owned()
}

/// Charset label from a `<meta charset>` or `<meta http-equiv>` tag near
/// the start of the document.
fn declared_charset(bytes: &[u8]) -> Option<&[u8]> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_LIMIT)];
    META_CHARSET_PATTERN
        .captures(head)
        .and_then(|captures| captures.get(1))
        .map(|label| label.as_bytes())
}

#[cfg(test)]
mod tests {
    use scraper::Selector;

    use super::*;

    #[test]
    fn test_load_markup() {
        let doc =
            load(b"<html><body><h3>2013-2014</h3></body></html>", ContentKind::Markup).unwrap();
        assert_eq!(doc.kind(), ContentKind::Markup);
        let html = doc.markup().unwrap();
        let selector = Selector::parse("h3").unwrap();
        let text: String = html.select(&selector).next().unwrap().text().collect();
        assert_eq!(text, "2013-2014");
    }

    fn paragraph(doc: &Document) -> String {
        let selector = Selector::parse("p").unwrap();
        doc.markup().unwrap().select(&selector).next().unwrap().text().collect()
    }

    #[test]
    fn test_load_markup_declared_latin1() {
        let body = b"<html><head>\
            <meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-1\">\
            </head><body><p>Montr\xe9al</p></body></html>";
        let doc = load(body, ContentKind::Markup).unwrap();
        assert_eq!(paragraph(&doc), "Montr\u{e9}al");
    }

    #[test]
    fn test_load_markup_undeclared_charset_uses_windows_1252() {
        let doc = load(b"<p>Montr\xe9al \x96 Qu\xe9bec</p>", ContentKind::Markup).unwrap();
        assert_eq!(paragraph(&doc), "Montr\u{e9}al \u{2013} Qu\u{e9}bec");
    }

    #[test]
    fn test_declared_charset() {
        assert_eq!(declared_charset(b"<meta charset=\"UTF-8\">"), Some(&b"UTF-8"[..]));
        assert_eq!(
            declared_charset(b"<META CONTENT='text/html; charset=ISO-8859-1'>"),
            Some(&b"ISO-8859-1"[..])
        );
        assert_eq!(declared_charset(b"<p>no meta</p>"), None);
    }

    #[test]
    fn test_load_empty_markup_fails() {
        let err = load(b"  \n", ContentKind::Markup).unwrap_err();
        assert!(matches!(err, CollectorError::Parse { kind: ContentKind::Markup, .. }));
    }

    #[test]
    fn test_load_malformed_json_fails() {
        let err = load(b"<html>", ContentKind::Json).unwrap_err();
        assert!(matches!(err, CollectorError::Parse { kind: ContentKind::Json, .. }));
    }

    #[test]
    fn test_kind_mismatch() {
        let doc = load(b"[]", ContentKind::Json).unwrap();
        assert!(matches!(
            doc.markup(),
            Err(CollectorError::ContentKindMismatch { expected: ContentKind::Markup, .. })
        ));
    }
}
