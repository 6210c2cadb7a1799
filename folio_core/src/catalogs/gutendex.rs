use super::{decode_items, expect_object, Catalog};
use crate::config::DEFAULT_GUTENDEX_ENDPOINT;
use crate::error::CatalogError;
use crate::federated::{GutendexBook, PageRequest, RawPage, Source};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

static DEFAULT_ENDPOINT: Lazy<Url> =
    Lazy::new(|| Url::parse(DEFAULT_GUTENDEX_ENDPOINT).expect("valid Gutendex endpoint"));

/// Project Gutenberg through the Gutendex JSON API.
///
/// Gutendex fixes its page size server side, so only the page number is
/// passed through.
pub struct GutendexCatalog {
    transport: Arc<dyn HttpTransport>,
    endpoint: Url,
}

impl GutendexCatalog {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    pub fn with_defaults(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(transport, DEFAULT_ENDPOINT.clone())
    }
}

#[async_trait]
impl Catalog for GutendexCatalog {
    fn source(&self) -> Source {
        Source::Gutenberg
    }

    fn description(&self) -> &'static str {
        "Project Gutenberg public-domain texts via Gutendex, matched by topic"
    }

    fn request_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("topic", request.query())
            .append_pair("page", &request.page().to_string());
        url
    }

    async fn search_page(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<RawPage, CatalogError> {
        let url = self.request_url(request);
        let mut payload = self.transport.get_json(&url, cancel).await?;
        expect_object(&payload)?;

        let count = payload.get("count").and_then(|v| v.as_u64());
        let results: Vec<GutendexBook> = decode_items(self.source(), &mut payload, "results");

        Ok(RawPage::Gutenberg { results, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    #[test]
    fn test_request_url_passes_page_through() {
        let catalog = GutendexCatalog::with_defaults(Arc::new(MockTransport::new()));
        let url = catalog.request_url(&PageRequest::new("science fiction", 3).unwrap());

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("topic".to_string(), "science fiction".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(url.host_str(), Some("gutendex.com"));
    }

    #[tokio::test]
    async fn test_search_page_decodes_results() {
        let transport = Arc::new(MockTransport::new().with_json(
            DEFAULT_GUTENDEX_ENDPOINT,
            json!({
                "count": 1,
                "next": null,
                "results": [{
                    "id": 84,
                    "title": "Frankenstein",
                    "authors": [{"name": "Shelley, Mary Wollstonecraft", "birth_year": 1797}],
                    "formats": {
                        "image/jpeg": "https://www.gutenberg.org/cache/epub/84/pg84.cover.medium.jpg",
                        "text/plain; charset=us-ascii": "https://www.gutenberg.org/ebooks/84.txt.utf-8"
                    },
                    "download_count": 1000
                }]
            }),
        ));
        let catalog = GutendexCatalog::with_defaults(transport);

        let page = catalog
            .search_page(&PageRequest::first("horror").unwrap(), &CancellationToken::new())
            .await
            .unwrap();

        match page {
            RawPage::Gutenberg { results, count } => {
                assert_eq!(count, Some(1));
                assert_eq!(results[0].id, Some(84));
                assert_eq!(results[0].formats.len(), 2);
            }
            other => panic!("unexpected page: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_object_payload_is_error() {
        let transport = Arc::new(
            MockTransport::new().with_json(DEFAULT_GUTENDEX_ENDPOINT, json!([1, 2, 3])),
        );
        let catalog = GutendexCatalog::with_defaults(transport);
        let err = catalog
            .search_page(&PageRequest::first("x").unwrap(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code_str(), "parse_error");
    }
}
