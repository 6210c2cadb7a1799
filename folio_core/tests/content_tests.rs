use folio_core::config::ParsedEndpoints;
use folio_core::federated::{normalize, GutendexBook, RawPage};
use folio_core::transport::MockTransport;
use folio_core::{ContentError, ContentResolver, ContentResult, RawRecord, UnifiedBook};
use serde_json::json;
use std::sync::Arc;

fn resolver(transport: Arc<MockTransport>) -> ContentResolver {
    ContentResolver::new(transport, ParsedEndpoints::default())
}

#[tokio::test]
async fn test_google_book_from_search_payload_embeds_its_id() {
    let page: RawPage = serde_json::from_value(json!({
        "catalog": "google_books",
        "items": [{"id": "abc123", "volumeInfo": {
            "title": "Dune",
            "imageLinks": {"thumbnail": "http://books.google.com/c?id=abc123"}
        }}]
    }))
    .unwrap();
    let books = normalize(&page);

    let transport = Arc::new(MockTransport::new());
    match resolver(transport.clone()).resolve(&books[0]).await.unwrap() {
        ContentResult::Embed { url } => assert!(url.contains("abc123")),
        other => panic!("expected embed, got {:?}", other),
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_gutenberg_without_plain_text_fails_offline() {
    let raw = GutendexBook {
        id: Some(2701),
        formats: [
            ("text/html".to_string(), "https://www.gutenberg.org/ebooks/2701.html.images".to_string()),
            ("application/epub+zip".to_string(), "https://www.gutenberg.org/ebooks/2701.epub3.images".to_string()),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    };
    let book = UnifiedBook::new("2701", "Moby Dick", RawRecord::Gutenberg(raw));

    let transport = Arc::new(MockTransport::new());
    let err = resolver(transport.clone()).resolve(&book).await.unwrap_err();

    assert!(matches!(err, ContentError::UnsupportedFormat { ref id } if id == "2701"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_book_round_trips_through_json_before_resolving() {
    // The CLI hands books to `read` as JSON; the raw record must survive.
    let raw = GutendexBook {
        id: Some(84),
        formats: [(
            "text/plain; charset=utf-8".to_string(),
            "https://www.gutenberg.org/ebooks/84.txt.utf-8".to_string(),
        )]
        .into_iter()
        .collect(),
        ..Default::default()
    };
    let book = UnifiedBook::new("84", "Frankenstein", RawRecord::Gutenberg(raw))
        .with_cover("https://www.gutenberg.org/cache/epub/84/pg84.cover.medium.jpg");
    let decoded: UnifiedBook = serde_json::from_str(&serde_json::to_string(&book).unwrap()).unwrap();

    let transport = Arc::new(
        MockTransport::new().with_body("https://api.allorigins.win/raw", "It was on a dreary night\nof November"),
    );
    let content = resolver(transport).resolve(&decoded).await.unwrap();
    assert_eq!(
        content,
        ContentResult::Text {
            content: "It was on a dreary night<br>of November".to_string()
        }
    );
}
