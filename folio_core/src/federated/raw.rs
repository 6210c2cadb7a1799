//! Raw payload shapes returned by each catalog.
//!
//! Every field is optional: catalogs omit fields freely and a record is never
//! assumed complete. The normalizer owns all fallback values.

use super::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Google Books
// ============================================================================

/// One entry of `items` in a Google Books volumes response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleVolume {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_links: Option<ImageLinks>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_thumbnail: Option<String>,
}

// ============================================================================
// Gutendex
// ============================================================================

/// One entry of `results` in a Gutendex books response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GutendexBook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub authors: Vec<GutendexPerson>,

    /// MIME type -> download URL
    pub formats: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GutendexPerson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
}

// ============================================================================
// Open Library
// ============================================================================

/// One entry of `docs` in an Open Library search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenLibraryDoc {
    /// Work key, e.g. `/works/OL45804W`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_i: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,
}

// ============================================================================
// Page / record containers
// ============================================================================

/// One page of raw results from one catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "catalog", rename_all = "snake_case")]
pub enum RawPage {
    GoogleBooks {
        items: Vec<GoogleVolume>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_items: Option<u64>,
    },
    Gutenberg {
        results: Vec<GutendexBook>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u64>,
    },
    OpenLibrary {
        docs: Vec<OpenLibraryDoc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        num_found: Option<u64>,
    },
}

impl RawPage {
    /// The page a failed or timed-out adapter contributes.
    pub fn empty(source: Source) -> Self {
        match source {
            Source::GoogleBooks => RawPage::GoogleBooks {
                items: Vec::new(),
                total_items: None,
            },
            Source::Gutenberg => RawPage::Gutenberg {
                results: Vec::new(),
                count: None,
            },
            Source::OpenLibrary => RawPage::OpenLibrary {
                docs: Vec::new(),
                num_found: None,
            },
        }
    }

    pub fn source(&self) -> Source {
        match self {
            RawPage::GoogleBooks { .. } => Source::GoogleBooks,
            RawPage::Gutenberg { .. } => Source::Gutenberg,
            RawPage::OpenLibrary { .. } => Source::OpenLibrary,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawPage::GoogleBooks { items, .. } => items.len(),
            RawPage::Gutenberg { results, .. } => results.len(),
            RawPage::OpenLibrary { docs, .. } => docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total matches reported upstream, when the catalog reports one.
    pub fn total_available(&self) -> Option<u64> {
        match self {
            RawPage::GoogleBooks { total_items, .. } => *total_items,
            RawPage::Gutenberg { count, .. } => *count,
            RawPage::OpenLibrary { num_found, .. } => *num_found,
        }
    }
}

/// A single raw item, kept on every `UnifiedBook` for content resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "catalog", rename_all = "snake_case")]
pub enum RawRecord {
    GoogleBooks(GoogleVolume),
    Gutenberg(GutendexBook),
    OpenLibrary(OpenLibraryDoc),
}

impl RawRecord {
    pub fn source(&self) -> Source {
        match self {
            RawRecord::GoogleBooks(_) => Source::GoogleBooks,
            RawRecord::Gutenberg(_) => Source::Gutenberg,
            RawRecord::OpenLibrary(_) => Source::OpenLibrary,
        }
    }
}
