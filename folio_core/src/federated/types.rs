//! Core types for federated catalog results.

use super::RawRecord;
use crate::error::{CatalogError, UnknownSourceError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author shown when a catalog does not name one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Title shown when a catalog does not provide one.
pub const UNTITLED: &str = "Untitled";

/// The external catalogs folded into the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Google Books volumes API
    GoogleBooks,
    /// Project Gutenberg via Gutendex
    Gutenberg,
    /// Open Library search
    OpenLibrary,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::GoogleBooks, Source::Gutenberg, Source::OpenLibrary];

    /// Stable wire tag, matches the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::GoogleBooks => "google_books",
            Source::Gutenberg => "gutenberg",
            Source::OpenLibrary => "open_library",
        }
    }

    /// Short badge for display.
    pub fn label(&self) -> &'static str {
        match self {
            Source::GoogleBooks => "GOOGLE",
            Source::Gutenberg => "GUTENBERG",
            Source::OpenLibrary => "OPENLIB",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "google_books" | "google" => Ok(Source::GoogleBooks),
            "gutenberg" | "gutendex" => Ok(Source::Gutenberg),
            "open_library" | "openlibrary" | "openlib" => Ok(Source::OpenLibrary),
            _ => Err(UnknownSourceError(s.to_string())),
        }
    }
}

/// Identity of a book across the whole library.
///
/// Ids are only unique within one catalog, so the source is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookKey {
    pub source: Source,
    pub id: String,
}

impl fmt::Display for BookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// A normalized book from any catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedBook {
    /// Identifier within the source.
    ///
    /// Format varies by source:
    /// - Google Books: volume id, e.g. "zyTCAlFPjgYC"
    /// - Gutenberg: ebook number, e.g. "84"
    /// - Open Library: work key, e.g. "/works/OL45804W"
    pub id: String,

    pub source: Source,

    pub title: String,

    /// First listed author, or [`UNKNOWN_AUTHOR`]
    pub author: String,

    /// Cover image, always `https` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    /// The record this book was normalized from
    pub raw: RawRecord,
}

impl UnifiedBook {
    /// Create a book with default author and no cover.
    pub fn new(id: impl Into<String>, title: impl Into<String>, raw: RawRecord) -> Self {
        Self {
            id: id.into(),
            source: raw.source(),
            title: title.into(),
            author: UNKNOWN_AUTHOR.to_string(),
            cover_url: None,
            raw,
        }
    }

    /// Builder method to set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Builder method to set the cover.
    pub fn with_cover(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    pub fn key(&self) -> BookKey {
        BookKey {
            source: self.source,
            id: self.id.clone(),
        }
    }

    pub fn has_cover(&self) -> bool {
        self.cover_url.is_some()
    }
}

/// A filtered, shuffled page of books ready for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComposedPage {
    pub books: Vec<UnifiedBook>,
}

impl ComposedPage {
    pub fn new(books: Vec<UnifiedBook>) -> Self {
        Self { books }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnifiedBook> {
        self.books.iter()
    }

    pub fn get(&self, index: usize) -> Option<&UnifiedBook> {
        self.books.get(index)
    }

    pub fn contains(&self, key: &BookKey) -> bool {
        self.books
            .iter()
            .any(|b| b.source == key.source && b.id == key.id)
    }

    /// Append books not already present, returning how many were added.
    pub fn append_unique(&mut self, other: ComposedPage) -> usize {
        let before = self.books.len();
        for book in other.books {
            if !self.contains(&book.key()) {
                self.books.push(book);
            }
        }
        self.books.len() - before
    }
}

impl IntoIterator for ComposedPage {
    type Item = UnifiedBook;
    type IntoIter = std::vec::IntoIter<UnifiedBook>;

    fn into_iter(self) -> Self::IntoIter {
        self.books.into_iter()
    }
}

impl<'a> IntoIterator for &'a ComposedPage {
    type Item = &'a UnifiedBook;
    type IntoIter = std::slice::Iter<'a, UnifiedBook>;

    fn into_iter(self) -> Self::IntoIter {
        self.books.iter()
    }
}

/// Viewable content for one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentResult {
    /// URL of an external viewer to embed
    Embed { url: String },
    /// Extracted text, line breaks rendered as `<br>`
    Text { content: String },
}

/// A validated query for one page of results.
///
/// Deserializing goes through [`PageRequest::new`], so a decoded request is
/// as valid as a constructed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UncheckedPageRequest")]
pub struct PageRequest {
    query: String,
    page: u32,
}

#[derive(Deserialize)]
struct UncheckedPageRequest {
    query: String,
    page: u32,
}

impl TryFrom<UncheckedPageRequest> for PageRequest {
    type Error = CatalogError;

    fn try_from(raw: UncheckedPageRequest) -> Result<Self, Self::Error> {
        Self::new(raw.query, raw.page)
    }
}

impl PageRequest {
    /// Pages are 1-indexed and the query must contain something other than whitespace.
    pub fn new(query: impl AsRef<str>, page: u32) -> Result<Self, CatalogError> {
        let query = query.as_ref().trim();
        if query.is_empty() {
            return Err(CatalogError::InvalidRequest(
                "query must not be empty".to_string(),
            ));
        }
        if page == 0 {
            return Err(CatalogError::InvalidRequest(
                "page numbers start at 1".to_string(),
            ));
        }
        Ok(Self {
            query: query.to_string(),
            page,
        })
    }

    pub fn first(query: impl AsRef<str>) -> Result<Self, CatalogError> {
        Self::new(query, 1)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Zero-based item offset for catalogs that paginate by item index.
    pub fn item_offset(&self, page_size: u32) -> u32 {
        self.page.saturating_sub(1).saturating_mul(page_size)
    }

    pub fn next(&self) -> Self {
        Self {
            query: self.query.clone(),
            page: self.page.saturating_add(1),
        }
    }
}

/// Per-source diagnostics for one aggregation.
///
/// A zero count does not tell a failed source from a source with no matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: Source,

    /// Books normalized from this source (before cover filtering)
    pub count: usize,

    /// Time taken to settle, including a timeout (ms)
    pub duration_ms: u64,
}

/// Complete result of one federated search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub query: String,

    pub page: u32,

    pub books: ComposedPage,

    pub sources: Vec<SourceReport>,

    /// Total time taken (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Sources that contributed at least one record.
    pub fn contributing_sources(&self) -> Vec<Source> {
        self.sources
            .iter()
            .filter(|s| s.count > 0)
            .map(|s| s.source)
            .collect()
    }
}
