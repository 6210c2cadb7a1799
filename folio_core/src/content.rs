//! Content resolution for a selected book.
//!
//! Each catalog has its own way of producing something readable:
//!
//! | Catalog      | Strategy                                        | Result  |
//! |--------------|-------------------------------------------------|---------|
//! | Google Books | templated embed viewer URL, no network          | `Embed` |
//! | Gutenberg    | plain-text format fetched through a CORS proxy  | `Text`  |
//! | Open Library | first edition with an Internet Archive id       | `Embed` |
//!
//! Resolution is one-shot: no retries and no caching.

use crate::config::{ParsedEndpoints, DEFAULT_CONTENT_TIMEOUT_MS};
use crate::error::{CatalogError, ContentError};
use crate::federated::{ContentResult, GutendexBook, RawRecord, UnifiedBook};
use crate::transport::HttpTransport;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Plain-text formats in order of preference.
const PREFERRED_TEXT_FORMATS: [&str; 2] = ["text/plain; charset=utf-8", "text/plain"];

const TEXT_FORMAT_PREFIX: &str = "text/plain";

/// Editions scanned for an archive identifier.
const EDITIONS_LIMIT: &str = "10";

const PROXY_FAILED: &str = "PROXY FAILED";
const EDITIONS_LOOKUP_FAILED: &str = "EDITIONS LOOKUP FAILED";

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

/// Turns a [`UnifiedBook`] into viewable content.
#[derive(Clone)]
pub struct ContentResolver {
    transport: Arc<dyn HttpTransport>,
    endpoints: ParsedEndpoints,
    timeout: Duration,
}

impl ContentResolver {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: ParsedEndpoints) -> Self {
        Self {
            transport,
            endpoints,
            timeout: Duration::from_millis(DEFAULT_CONTENT_TIMEOUT_MS),
        }
    }

    /// Builder method to set the network timeout for one resolution.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn resolve(&self, book: &UnifiedBook) -> Result<ContentResult, ContentError> {
        self.resolve_with_cancel(book, &CancellationToken::new())
            .await
    }

    /// Resolve `book`, giving up with [`ContentError::Cancelled`] once `cancel` fires.
    pub async fn resolve_with_cancel(
        &self,
        book: &UnifiedBook,
        cancel: &CancellationToken,
    ) -> Result<ContentResult, ContentError> {
        if book.source != book.raw.source() {
            return Err(ContentError::UnknownSource(book.source.to_string()));
        }

        let start = Instant::now();
        let result = match &book.raw {
            RawRecord::GoogleBooks(_) => Ok(self.google_embed(&book.id)),
            RawRecord::Gutenberg(raw) => self.gutenberg_text(&book.id, raw, cancel).await,
            RawRecord::OpenLibrary(_) => self.archive_embed(&book.id, cancel).await,
        };

        match &result {
            Ok(_) => debug!(
                target: "folio.content",
                book = %book.key(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "content resolved"
            ),
            Err(err) => warn!(
                target: "folio.content",
                book = %book.key(),
                code = err.code_str(),
                error = %err,
                "content resolution failed"
            ),
        }
        result
    }

    fn google_embed(&self, id: &str) -> ContentResult {
        let mut url = self.endpoints.google_embed.clone();
        url.query_pairs_mut()
            .append_pair("id", id)
            .append_pair("printsec", "frontcover")
            .append_pair("output", "embed");
        ContentResult::Embed {
            url: url.to_string(),
        }
    }

    async fn gutenberg_text(
        &self,
        id: &str,
        raw: &GutendexBook,
        cancel: &CancellationToken,
    ) -> Result<ContentResult, ContentError> {
        let Some(target) = select_text_format(raw) else {
            return Err(ContentError::UnsupportedFormat { id: id.to_string() });
        };

        let mut proxied = self.endpoints.text_proxy.clone();
        proxied.query_pairs_mut().append_pair("url", target);

        let text = self
            .fetch(cancel, |token| {
                let transport = Arc::clone(&self.transport);
                async move { transport.get_text(&proxied, &token).await }
            })
            .await
            .map_err(|err| fetch_error(err, PROXY_FAILED))?;

        Ok(ContentResult::Text {
            content: text_to_display_html(&text),
        })
    }

    async fn archive_embed(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<ContentResult, ContentError> {
        let url = self
            .editions_url(key)
            .ok_or_else(|| ContentError::ContentFetch(EDITIONS_LOOKUP_FAILED.to_string()))?;

        let payload = self
            .fetch(cancel, |token| {
                let transport = Arc::clone(&self.transport);
                async move { transport.get_json(&url, &token).await }
            })
            .await
            .map_err(|err| fetch_error(err, EDITIONS_LOOKUP_FAILED))?;

        let url = first_archive_identifier(&payload)
            .and_then(|identifier| self.archive_url(&identifier))
            .ok_or_else(|| ContentError::NoEmbedFound { id: key.to_string() })?;

        Ok(ContentResult::Embed {
            url: url.to_string(),
        })
    }

    /// `https://openlibrary.org{key}/editions.json?limit=10`
    ///
    /// Each key segment is percent-encoded onto the Open Library host, so a
    /// key can never point the lookup somewhere else.
    fn editions_url(&self, key: &str) -> Option<Url> {
        let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() || segments.iter().any(|s| is_dot_segment(s)) {
            return None;
        }

        let mut url = self.endpoints.open_library.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .ok()?
            .clear()
            .extend(segments)
            .push("editions.json");
        url.query_pairs_mut().append_pair("limit", EDITIONS_LIMIT);
        Some(url)
    }

    /// Archive viewer URL with `identifier` as a single escaped path segment.
    fn archive_url(&self, identifier: &str) -> Option<Url> {
        if is_dot_segment(identifier) {
            return None;
        }
        let mut url = self.endpoints.archive_embed.clone();
        url.path_segments_mut().ok()?.pop_if_empty().push(identifier);
        Some(url)
    }

    /// Run one request under the resolver timeout and the caller's token.
    async fn fetch<T, F, Fut>(&self, cancel: &CancellationToken, request: F) -> Result<T, CatalogError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let token = cancel.child_token();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CatalogError::Cancelled),
            result = request(token.clone()) => result,
            _ = tokio::time::sleep(self.timeout) => {
                token.cancel();
                Err(CatalogError::Timeout(self.timeout.as_millis() as u64))
            }
        }
    }
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

fn fetch_error(err: CatalogError, message: &str) -> ContentError {
    match err {
        CatalogError::Cancelled => ContentError::Cancelled,
        _ => ContentError::ContentFetch(message.to_string()),
    }
}

/// Pick the plain-text download for a Gutenberg book.
///
/// Prefers UTF-8, then bare `text/plain`, then any other `text/plain*`
/// variant. Zipped downloads are never chosen.
pub fn select_text_format(book: &GutendexBook) -> Option<&str> {
    let usable = |url: &&String| !url.trim().is_empty() && !url.ends_with(".zip");

    PREFERRED_TEXT_FORMATS
        .iter()
        .find_map(|mime| book.formats.get(*mime).filter(usable))
        .or_else(|| {
            book.formats
                .iter()
                .filter(|(mime, _)| mime.starts_with(TEXT_FORMAT_PREFIX))
                .map(|(_, url)| url)
                .find(usable)
        })
        .map(String::as_str)
}

/// Escape `text` for HTML and render every line ending as `<br>`.
pub fn text_to_display_html(text: &str) -> String {
    let escaped = html_escape::encode_text(text);
    LINE_BREAK.replace_all(&escaped, "<br>").into_owned()
}

/// First edition entry carrying `ocaid`, or failing that `ia`.
fn first_archive_identifier(payload: &Value) -> Option<String> {
    payload
        .get("entries")?
        .as_array()?
        .iter()
        .find_map(|entry| {
            identifier_field(entry.get("ocaid")).or_else(|| identifier_field(entry.get("ia")))
        })
}

fn identifier_field(value: Option<&Value>) -> Option<String> {
    let value = match value? {
        Value::Array(items) => items.iter().find_map(|v| v.as_str().filter(|s| !s.trim().is_empty()))?,
        Value::String(s) => s.as_str(),
        _ => return None,
    };
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
