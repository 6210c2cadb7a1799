//! Federated search execution engine.
//!
//! Dispatches one page request to every registered catalog at once and folds
//! whatever comes back into a single list. A slow or broken catalog costs its
//! own results and nothing else.

use super::{compose, normalize, PageRequest, SearchOutcome, SourceReport, UnifiedBook};
use crate::catalogs::{Catalog, CatalogRegistry};
use crate::config::DEFAULT_ADAPTER_TIMEOUT_MS;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Engine for searching every registered catalog concurrently.
#[derive(Clone)]
pub struct FederatedLibrary {
    registry: CatalogRegistry,
    budget: Duration,
}

impl FederatedLibrary {
    /// Create a library with the default per-catalog budget.
    pub fn new(registry: CatalogRegistry) -> Self {
        Self {
            registry,
            budget: Duration::from_millis(DEFAULT_ADAPTER_TIMEOUT_MS),
        }
    }

    /// Builder method to set the per-catalog time budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn registry(&self) -> &CatalogRegistry {
        &self.registry
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Fetch one page from every catalog and return the normalized union.
    ///
    /// Never fails: a catalog that errors or runs out of time contributes
    /// nothing. Results are in registry order; `compose` produces display order.
    pub async fn aggregate(&self, request: &PageRequest) -> Vec<UnifiedBook> {
        self.aggregate_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// [`aggregate`](Self::aggregate) that stops early once `cancel` fires.
    pub async fn aggregate_with_cancel(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> Vec<UnifiedBook> {
        let (lists, _) = self.execute(request, cancel).await;
        lists.into_iter().flatten().collect()
    }

    /// Aggregate and compose one display page, with per-source diagnostics.
    pub async fn search(&self, request: &PageRequest) -> SearchOutcome {
        self.search_with_cancel(request, &CancellationToken::new())
            .await
    }

    pub async fn search_with_cancel(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let start = Instant::now();
        let (lists, sources) = self.execute(request, cancel).await;
        let books = compose(lists);

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            target: "folio.federated",
            query = request.query(),
            page = request.page(),
            catalogs = sources.len(),
            contributing = sources.iter().filter(|s| s.count > 0).count(),
            books = books.len(),
            duration_ms,
            "federated search complete"
        );

        SearchOutcome {
            query: request.query().to_string(),
            page: request.page(),
            books,
            sources,
            duration_ms: Some(duration_ms),
        }
    }

    async fn execute(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> (Vec<Vec<UnifiedBook>>, Vec<SourceReport>) {
        let budget = self.budget;

        let futures: Vec<_> = self
            .registry
            .catalogs()
            .iter()
            .map(|catalog| {
                let catalog: Arc<dyn Catalog> = Arc::clone(catalog);
                async move {
                    let start = Instant::now();
                    let page = catalog.fetch_page(request, budget, cancel).await;
                    let books = normalize(&page);
                    let report = SourceReport {
                        source: catalog.source(),
                        count: books.len(),
                        duration_ms: start.elapsed().as_millis() as u64,
                    };
                    (books, report)
                }
            })
            .collect();

        futures::future::join_all(futures)
            .await
            .into_iter()
            .unzip()
    }
}
