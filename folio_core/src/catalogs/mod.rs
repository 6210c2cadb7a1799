//! Source adapters, one per external catalog.
//!
//! Each adapter owns its own pagination convention and response decoding.
//! [`Catalog::fetch_page`] is the failure boundary: whatever goes wrong inside
//! an adapter, the aggregator only ever sees a (possibly empty) [`RawPage`].

pub mod google_books;
pub mod gutendex;
pub mod open_library;

pub use google_books::GoogleBooksCatalog;
pub use gutendex::GutendexCatalog;
pub use open_library::OpenLibraryCatalog;

use crate::config::FolioConfig;
use crate::error::{CatalogError, ConfigError};
use crate::federated::{PageRequest, RawPage, Source};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait Catalog: Send + Sync {
    fn source(&self) -> Source;

    fn description(&self) -> &'static str;

    /// The request URL for one page. Pure; encodes this catalog's pagination.
    fn request_url(&self, request: &PageRequest) -> Url;

    /// Fetch and decode one page. Errors are reported, not absorbed.
    async fn search_page(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<RawPage, CatalogError>;

    /// Fetch one page within `budget`, absorbing every failure.
    ///
    /// The search is raced against the budget and against `cancel`. When the
    /// budget runs out first, the adapter's child token is cancelled and the
    /// request future is dropped, so nothing keeps running in the background.
    /// Timeouts, transport errors and malformed payloads all yield an empty
    /// page. No retries.
    async fn fetch_page(
        &self,
        request: &PageRequest,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> RawPage {
        let source = self.source();
        let token = cancel.child_token();
        let start = Instant::now();

        let outcome = tokio::select! {
            biased;
            result = self.search_page(request, &token) => result,
            _ = tokio::time::sleep(budget) => {
                token.cancel();
                Err(CatalogError::Timeout(budget.as_millis() as u64))
            }
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(page) => {
                debug!(
                    target: "folio.catalog",
                    source = %source,
                    page = request.page(),
                    records = page.len(),
                    elapsed_ms,
                    "catalog page fetched"
                );
                page
            }
            Err(err) => {
                warn!(
                    target: "folio.catalog",
                    source = %source,
                    page = request.page(),
                    code = err.code_str(),
                    error = %err,
                    elapsed_ms,
                    "catalog contributed no results"
                );
                RawPage::empty(source)
            }
        }
    }
}

/// Information about an available catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogInfo {
    pub source: Source,
    pub label: &'static str,
    pub description: &'static str,
}

/// The catalogs searched by one library, in registration order.
#[derive(Clone, Default)]
pub struct CatalogRegistry {
    catalogs: Vec<Arc<dyn Catalog>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog, replacing any already registered for the same source.
    pub fn register(&mut self, catalog: Arc<dyn Catalog>) {
        self.catalogs.retain(|c| c.source() != catalog.source());
        self.catalogs.push(catalog);
    }

    pub fn with(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.register(catalog);
        self
    }

    pub fn get(&self, source: Source) -> Option<&Arc<dyn Catalog>> {
        self.catalogs.iter().find(|c| c.source() == source)
    }

    pub fn catalogs(&self) -> &[Arc<dyn Catalog>] {
        &self.catalogs
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    pub fn list(&self) -> Vec<CatalogInfo> {
        self.catalogs
            .iter()
            .map(|c| CatalogInfo {
                source: c.source(),
                label: c.source().label(),
                description: c.description(),
            })
            .collect()
    }

    /// Keep only the given sources.
    pub fn restrict_to(mut self, sources: &[Source]) -> Self {
        self.catalogs.retain(|c| sources.contains(&c.source()));
        self
    }
}

/// Build a registry with every catalog enabled in `config`.
pub fn build_registry(
    config: &FolioConfig,
    transport: Arc<dyn HttpTransport>,
) -> Result<CatalogRegistry, ConfigError> {
    let endpoints = config.endpoints.parsed()?;
    let mut registry = CatalogRegistry::new();

    for source in &config.sources {
        let catalog: Arc<dyn Catalog> = match source {
            Source::GoogleBooks => Arc::new(GoogleBooksCatalog::new(
                Arc::clone(&transport),
                endpoints.google_books.clone(),
                config.page_size,
            )),
            Source::Gutenberg => Arc::new(GutendexCatalog::new(
                Arc::clone(&transport),
                endpoints.gutendex.clone(),
            )),
            Source::OpenLibrary => Arc::new(OpenLibraryCatalog::new(
                Arc::clone(&transport),
                endpoints.open_library.clone(),
                config.page_size,
            )),
        };
        registry.register(catalog);
    }

    Ok(registry)
}

/// Take the array under `field` and decode each element on its own.
///
/// A missing field is an empty page, not an error. Elements that fail to
/// decode are skipped so one odd record never costs the whole page.
pub(crate) fn decode_items<T: DeserializeOwned>(
    source: Source,
    payload: &mut Value,
    field: &str,
) -> Vec<T> {
    let items = match payload.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => return Vec::new(),
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if decoded.len() < total {
        debug!(
            target: "folio.catalog",
            source = %source,
            skipped = total - decoded.len(),
            "skipped undecodable records"
        );
    }
    decoded
}

/// Reject payloads that are not JSON objects.
pub(crate) fn expect_object(payload: &Value) -> Result<(), CatalogError> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(CatalogError::Malformed(
            "expected a JSON object".to_string(),
        ))
    }
}
