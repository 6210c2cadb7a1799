use folio_core::catalogs::{
    CatalogRegistry, GoogleBooksCatalog, GutendexCatalog, OpenLibraryCatalog,
};
use folio_core::config::{
    DEFAULT_GOOGLE_BOOKS_ENDPOINT, DEFAULT_GUTENDEX_ENDPOINT, DEFAULT_OPEN_LIBRARY_ENDPOINT,
};
use folio_core::transport::{HttpTransport, MockReply, MockTransport};
use folio_core::{
    ComposedPage, FederatedLibrary, Folio, FolioConfig, PageRequest, Source, UnifiedBook,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn google_payload(count: usize, with_covers: bool) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            let mut info = json!({"title": format!("Volume {}", i), "authors": ["A. Author"]});
            if with_covers {
                info["imageLinks"] =
                    json!({"thumbnail": format!("http://books.google.com/c?id=g{}", i)});
            }
            json!({"id": format!("g{}", i), "volumeInfo": info})
        })
        .collect();
    json!({"kind": "books#volumes", "totalItems": count, "items": items})
}

fn gutendex_payload(count: usize) -> Value {
    let results: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": 1000 + i,
                "title": format!("Gutenberg {}", i),
                "authors": [{"name": "Wells, H. G."}],
                "formats": {"image/jpeg": format!("https://www.gutenberg.org/cache/{}.jpg", i)}
            })
        })
        .collect();
    json!({"count": count, "results": results})
}

fn open_library_payload(count: usize) -> Value {
    let docs: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "key": format!("/works/OL{}W", i + 1),
                "title": format!("Work {}", i),
                "author_name": ["Ursula K. Le Guin"],
                "cover_i": 100 + i
            })
        })
        .collect();
    json!({"numFound": count, "docs": docs})
}

fn library(transport: MockTransport, budget: Duration) -> FederatedLibrary {
    let transport: Arc<dyn HttpTransport> = Arc::new(transport);
    let registry = CatalogRegistry::new()
        .with(Arc::new(GoogleBooksCatalog::with_defaults(Arc::clone(&transport))))
        .with(Arc::new(GutendexCatalog::with_defaults(Arc::clone(&transport))))
        .with(Arc::new(OpenLibraryCatalog::with_defaults(transport)));
    FederatedLibrary::new(registry).with_budget(budget)
}

fn grouped_by_source(page: &ComposedPage) -> bool {
    let mut seen: Vec<Source> = Vec::new();
    for book in page {
        match seen.last() {
            Some(last) if *last == book.source => {}
            _ if seen.contains(&book.source) => return false,
            _ => seen.push(book.source),
        }
    }
    true
}

#[tokio::test]
async fn test_one_source_timing_out_returns_union_of_others() {
    let transport = MockTransport::new()
        .with_json(DEFAULT_GOOGLE_BOOKS_ENDPOINT, google_payload(4, true))
        .with_reply(DEFAULT_GUTENDEX_ENDPOINT, MockReply::Hang)
        .with_json(DEFAULT_OPEN_LIBRARY_ENDPOINT, open_library_payload(3));
    let library = library(transport, Duration::from_millis(100));

    let start = Instant::now();
    let books = library
        .aggregate(&PageRequest::first("science fiction").unwrap())
        .await;

    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(books.len(), 7);
    assert!(books.iter().all(|b| b.source != Source::Gutenberg));
}

#[tokio::test]
async fn test_one_source_failing_returns_union_of_others() {
    let transport = MockTransport::new()
        .with_status(DEFAULT_GOOGLE_BOOKS_ENDPOINT, 429)
        .with_json(DEFAULT_GUTENDEX_ENDPOINT, gutendex_payload(5))
        .with_json(DEFAULT_OPEN_LIBRARY_ENDPOINT, open_library_payload(2));
    let library = library(transport, Duration::from_secs(2));

    let outcome = library
        .search(&PageRequest::first("science fiction").unwrap())
        .await;

    assert_eq!(outcome.books.len(), 7);
    assert_eq!(
        outcome.contributing_sources(),
        vec![Source::Gutenberg, Source::OpenLibrary]
    );
}

#[tokio::test]
async fn test_composed_pages_only_hold_covered_books() {
    let transport = MockTransport::new()
        .with_json(DEFAULT_GOOGLE_BOOKS_ENDPOINT, google_payload(6, false))
        .with_json(DEFAULT_GUTENDEX_ENDPOINT, gutendex_payload(3))
        .with_json(
            DEFAULT_OPEN_LIBRARY_ENDPOINT,
            json!({"docs": [
                {"key": "/works/OL1W", "title": "Covered", "cover_i": 9},
                {"key": "/works/OL2W", "title": "Bare"}
            ]}),
        );
    let library = library(transport, Duration::from_secs(2));

    for _ in 0..5 {
        let outcome = library.search(&PageRequest::first("anything").unwrap()).await;
        assert_eq!(outcome.books.len(), 4);
        assert!(outcome.books.iter().all(UnifiedBook::has_cover));
        assert!(outcome
            .books
            .iter()
            .all(|b| b.cover_url.as_deref().is_some_and(|u| u.starts_with("https://"))));
    }
}

#[tokio::test]
async fn test_science_fiction_end_to_end() {
    let transport = MockTransport::new()
        .with_json(DEFAULT_GOOGLE_BOOKS_ENDPOINT, google_payload(5, true))
        .with_json(DEFAULT_GUTENDEX_ENDPOINT, gutendex_payload(5))
        .with_json(DEFAULT_OPEN_LIBRARY_ENDPOINT, open_library_payload(5));
    let library = library(transport, Duration::from_secs(2));
    let request = PageRequest::first("science fiction").unwrap();

    let mut saw_interleaving = false;
    for _ in 0..20 {
        let outcome = library.search(&request).await;
        assert_eq!(outcome.books.len(), 15);
        assert_eq!(outcome.sources.iter().map(|s| s.count).sum::<usize>(), 15);
        saw_interleaving |= !grouped_by_source(&outcome.books);
    }
    assert!(saw_interleaving, "output stayed grouped by source in every trial");
}

#[tokio::test]
async fn test_requests_carry_each_catalogs_pagination() {
    let transport = Arc::new(MockTransport::new());
    let library = {
        let shared: Arc<dyn HttpTransport> = transport.clone();
        let registry = CatalogRegistry::new()
            .with(Arc::new(GoogleBooksCatalog::with_defaults(Arc::clone(&shared))))
            .with(Arc::new(GutendexCatalog::with_defaults(Arc::clone(&shared))))
            .with(Arc::new(OpenLibraryCatalog::with_defaults(shared)));
        FederatedLibrary::new(registry)
    };

    let books = library
        .aggregate(&PageRequest::new("science fiction", 2).unwrap())
        .await;
    assert!(books.is_empty());

    let mut calls = transport.calls();
    calls.sort();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().any(|c| c.contains("startIndex=12") && c.contains("maxResults=12")));
    assert!(calls.iter().any(|c| c.starts_with(DEFAULT_GUTENDEX_ENDPOINT) && c.contains("page=2")));
    assert!(calls
        .iter()
        .any(|c| c.starts_with(DEFAULT_OPEN_LIBRARY_ENDPOINT) && c.contains("limit=12")));
}

#[tokio::test]
async fn test_folio_session_over_all_catalogs() {
    let transport = MockTransport::new()
        .with_json(DEFAULT_GOOGLE_BOOKS_ENDPOINT, google_payload(2, true))
        .with_json(DEFAULT_GUTENDEX_ENDPOINT, gutendex_payload(2))
        .with_json(DEFAULT_OPEN_LIBRARY_ENDPOINT, open_library_payload(2));
    let folio = Folio::new(FolioConfig::default(), Arc::new(transport)).unwrap();
    let session = folio.session();

    session.reset("science fiction").await.unwrap();
    assert_eq!(session.books().await.len(), 6);

    // Every catalog answers page 2 with the same records, so nothing is new.
    let update = session.load_more().await;
    assert_eq!(
        update,
        folio_core::SessionUpdate::Applied { page: 2, added: 0 }
    );
    assert_eq!(session.books().await.len(), 6);
}
