use super::{decode_items, expect_object, Catalog};
use crate::config::DEFAULT_GOOGLE_BOOKS_ENDPOINT;
use crate::error::CatalogError;
use crate::federated::{GoogleVolume, PageRequest, RawPage, Source};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// The volumes API rejects `maxResults` above 40.
const MAX_RESULTS_LIMIT: u32 = 40;

static DEFAULT_ENDPOINT: Lazy<Url> = Lazy::new(|| {
    Url::parse(DEFAULT_GOOGLE_BOOKS_ENDPOINT).expect("valid Google Books endpoint")
});

/// Free e-books from the Google Books volumes API, searched by subject.
pub struct GoogleBooksCatalog {
    transport: Arc<dyn HttpTransport>,
    endpoint: Url,
    page_size: u32,
}

impl GoogleBooksCatalog {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: Url, page_size: u32) -> Self {
        Self {
            transport,
            endpoint,
            page_size: page_size.clamp(1, MAX_RESULTS_LIMIT),
        }
    }

    pub fn with_defaults(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            transport,
            DEFAULT_ENDPOINT.clone(),
            crate::config::DEFAULT_PAGE_SIZE,
        )
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

#[async_trait]
impl Catalog for GoogleBooksCatalog {
    fn source(&self) -> Source {
        Source::GoogleBooks
    }

    fn description(&self) -> &'static str {
        "Google Books free e-books, matched by subject"
    }

    fn request_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("subject:{}", request.query()))
            .append_pair("filter", "free-ebooks")
            .append_pair(
                "startIndex",
                &request.item_offset(self.page_size).to_string(),
            )
            .append_pair("maxResults", &self.page_size.to_string());
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

        let total_items = payload.get("totalItems").and_then(|v| v.as_u64());
        let items: Vec<GoogleVolume> = decode_items(self.source(), &mut payload, "items");

        Ok(RawPage::GoogleBooks { items, total_items })
    }
}
