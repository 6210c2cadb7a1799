use super::{decode_items, expect_object, Catalog};
use crate::config::{DEFAULT_OPEN_LIBRARY_ENDPOINT, DEFAULT_PAGE_SIZE};
use crate::error::CatalogError;
use crate::federated::{OpenLibraryDoc, PageRequest, RawPage, Source};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Only the fields the normalizer reads.
const SEARCH_FIELDS: &str = "key,title,author_name,cover_i";

static DEFAULT_ENDPOINT: Lazy<Url> = Lazy::new(|| {
    Url::parse(DEFAULT_OPEN_LIBRARY_ENDPOINT).expect("valid Open Library endpoint")
});

/// Open Library work search.
pub struct OpenLibraryCatalog {
    transport: Arc<dyn HttpTransport>,
    endpoint: Url,
    page_size: u32,
}

impl OpenLibraryCatalog {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: Url, page_size: u32) -> Self {
        Self {
            transport,
            endpoint,
            page_size: page_size.max(1),
        }
    }

    pub fn with_defaults(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(transport, DEFAULT_ENDPOINT.clone(), DEFAULT_PAGE_SIZE)
    }
}

#[async_trait]
impl Catalog for OpenLibraryCatalog {
    fn source(&self) -> Source {
        Source::OpenLibrary
    }

    fn description(&self) -> &'static str {
        "Open Library works, matched by free text"
    }

    fn request_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", request.query())
            .append_pair("page", &request.page().to_string())
            .append_pair("limit", &self.page_size.to_string())
            .append_pair("fields", SEARCH_FIELDS);
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

        let num_found = payload
            .get("numFound")
            .or_else(|| payload.get("num_found"))
            .and_then(|v| v.as_u64());
        let docs: Vec<OpenLibraryDoc> = decode_items(self.source(), &mut payload, "docs");

        Ok(RawPage::OpenLibrary { docs, num_found })
    }
}
