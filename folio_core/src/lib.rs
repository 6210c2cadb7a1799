// src/lib.rs
//! Federated search over public book catalogs.
//!
//! A query fans out to Google Books, Project Gutenberg (via Gutendex) and
//! Open Library at once. Each catalog's records are normalized into a
//! [`UnifiedBook`], merged, shuffled and filtered down to books with a cover.
//! A selected book can then be resolved into something readable, and kept
//! on a [`Shelf`] for later.

pub mod cache;
pub mod catalogs;
pub mod config;
pub mod content;
pub mod error;
pub mod federated;
pub mod session;
pub mod shelf;
pub mod transport;

pub use cache::QueryCache;
pub use catalogs::{build_registry, Catalog, CatalogInfo, CatalogRegistry};
pub use config::{ConfigStore, FolioConfig};
pub use content::ContentResolver;
pub use error::{CatalogError, ConfigError, ContentError, UnknownSourceError};
pub use federated::{
    BookKey, ComposedPage, ContentResult, FederatedLibrary, PageRequest, RawRecord, SearchOutcome,
    Source, SourceReport, UnifiedBook,
};
pub use session::{SearchSession, SessionUpdate};
pub use shelf::{Shelf, ShelfStore};
pub use transport::{HttpTransport, ReqwestTransport};

use std::sync::Arc;

/// Everything needed to search and read, wired from one config.
#[derive(Clone)]
pub struct Folio {
    config: FolioConfig,
    library: Arc<FederatedLibrary>,
    resolver: ContentResolver,
}

impl Folio {
    /// Wire catalogs and the resolver onto a shared transport.
    pub fn new(config: FolioConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, ConfigError> {
        let endpoints = config.endpoints.parsed()?;
        let registry = build_registry(&config, Arc::clone(&transport))?;
        let library = FederatedLibrary::new(registry).with_budget(config.adapter_timeout());
        let resolver =
            ContentResolver::new(transport, endpoints).with_timeout(config.content_timeout());

        Ok(Self {
            config,
            library: Arc::new(library),
            resolver,
        })
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    pub fn library(&self) -> &FederatedLibrary {
        &self.library
    }

    pub fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    /// A fresh browsing session with its own cache.
    pub fn session(&self) -> SearchSession {
        SearchSession::new(
            Arc::clone(&self.library),
            QueryCache::new(self.config.cache_capacity),
        )
    }
}
