//! Caller-owned browsing session over a [`FederatedLibrary`].
//!
//! A session shows one query at a time. `reset` starts a new query and
//! `load_more` appends the next page. Every reset bumps a generation counter;
//! any load that finishes under an older generation is discarded, so a slow
//! response can never overwrite a newer query's results.

use crate::cache::QueryCache;
use crate::error::CatalogError;
use crate::federated::{ComposedPage, FederatedLibrary, PageRequest};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What happened to the visible list after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    /// The page was applied; `added` books are new to the list.
    Applied { page: u32, added: usize },
    /// A newer query started while this load was in flight; result dropped.
    Stale,
    /// Another load is still running, or a reset has not landed yet.
    Busy,
    /// Nothing to load more of: no query has been searched yet.
    Idle,
}

#[derive(Default)]
struct SessionState {
    /// Last request whose page is part of `books`.
    request: Option<PageRequest>,
    /// Generation `books` belongs to.
    generation: u64,
    books: ComposedPage,
    cancel: Option<CancellationToken>,
    cache: QueryCache,
}

pub struct SearchSession {
    library: Arc<FederatedLibrary>,
    generation: AtomicU64,
    loading: AtomicBool,
    state: Mutex<SessionState>,
}

/// Clears the single-flight flag however the load ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SearchSession {
    pub fn new(library: Arc<FederatedLibrary>, cache: QueryCache) -> Self {
        Self {
            library,
            generation: AtomicU64::new(0),
            loading: AtomicBool::new(false),
            state: Mutex::new(SessionState {
                cache,
                ..SessionState::default()
            }),
        }
    }

    pub fn library(&self) -> &FederatedLibrary {
        &self.library
    }

    /// Cached first page for `query`, for instant display before a reset lands.
    pub async fn cached(&self, query: &str) -> Option<ComposedPage> {
        self.state.lock().await.cache.get(query).cloned()
    }

    /// Start a new query and load its first page.
    ///
    /// Cancels whatever the previous query still had in flight. Returns
    /// [`SessionUpdate::Stale`] when an even newer reset overtook this one.
    pub async fn reset(&self, query: &str) -> Result<SessionUpdate, CatalogError> {
        let request = PageRequest::first(query)?;
        let cancel = CancellationToken::new();

        // The generation is claimed under the lock so the newest generation
        // always owns the installed token.
        let generation = {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.cancel.replace(cancel.clone()) {
                previous.cancel();
            }
            self.generation.fetch_add(1, Ordering::AcqRel) + 1
        };

        debug!(
            target: "folio.session",
            query = request.query(),
            generation,
            "session reset"
        );
        let outcome = self.library.search_with_cancel(&request, &cancel).await;

        let mut state = self.state.lock().await;
        if !self.is_current(generation) || cancel.is_cancelled() {
            return Ok(SessionUpdate::Stale);
        }

        state.cache.put(request.query(), outcome.books.clone());
        let added = outcome.books.len();
        state.books = outcome.books;
        state.request = Some(request);
        state.generation = generation;

        Ok(SessionUpdate::Applied { page: 1, added })
    }

    /// Append the next page of the current query.
    ///
    /// Returns [`SessionUpdate::Idle`] until a first page has landed. After
    /// that it is single-flight: while another load runs, or a newer reset has
    /// not landed yet, this returns [`SessionUpdate::Busy`]. Books already
    /// listed are skipped.
    pub async fn load_more(&self) -> SessionUpdate {
        if self.loading.swap(true, Ordering::AcqRel) {
            return SessionUpdate::Busy;
        }
        let _guard = LoadingGuard(&self.loading);

        let (request, generation, cancel) = {
            let state = self.state.lock().await;
            let Some(current) = state.request.as_ref() else {
                return SessionUpdate::Idle;
            };
            if !self.is_current(state.generation) {
                return SessionUpdate::Busy;
            }
            (
                current.next(),
                state.generation,
                state.cancel.clone().unwrap_or_default(),
            )
        };

        let outcome = self.library.search_with_cancel(&request, &cancel).await;

        let mut state = self.state.lock().await;
        if !self.is_current(generation) || state.generation != generation {
            return SessionUpdate::Stale;
        }

        let added = state.books.append_unique(outcome.books);
        let page = request.page();
        state.request = Some(request);
        SessionUpdate::Applied { page, added }
    }

    /// Books currently listed.
    pub async fn books(&self) -> ComposedPage {
        self.state.lock().await.books.clone()
    }

    pub async fn query(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .request
            .as_ref()
            .map(|r| r.query().to_string())
    }

    /// Last page loaded for the current query, 0 before the first reset lands.
    pub async fn page(&self) -> u32 {
        self.state
            .lock()
            .await
            .request
            .as_ref()
            .map_or(0, PageRequest::page)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }
}
