//! HTTP transport shared by catalog adapters and the content resolver.
//!
//! Every outbound request goes through [`HttpTransport`], so the whole core can
//! run against `MockTransport` (feature `test-util`) without network access.

#[cfg(any(test, feature = "test-util"))]
mod mock;

#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockReply, MockTransport};

use crate::error::CatalogError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Default user agent for catalog requests.
pub const DEFAULT_USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` and return the body of a 2xx response.
    ///
    /// Resolves to [`CatalogError::Cancelled`] as soon as `cancel` fires; the
    /// in-flight request is dropped at that point.
    async fn get_text(&self, url: &Url, cancel: &CancellationToken)
        -> Result<String, CatalogError>;

    /// GET `url` and parse the body as JSON.
    async fn get_json(&self, url: &Url, cancel: &CancellationToken) -> Result<Value, CatalogError> {
        let body = self.get_text(url, cancel).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Transport backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &Url) -> Result<String, CatalogError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_text(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<String, CatalogError> {
        debug!(target: "folio.transport", url = %url, "GET");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CatalogError::Cancelled),
            result = self.fetch(url) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("folio/"));
    }

    #[tokio::test]
    async fn test_get_json_parses_text_body() {
        let transport = MockTransport::new().with_body("https://books.test/", r#"{"count": 2}"#);
        let url = Url::parse("https://books.test/search").unwrap();
        let value = transport
            .get_json(&url, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value["count"], 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let transport = ReqwestTransport::new(DEFAULT_USER_AGENT).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Unroutable address: only cancellation can settle this quickly.
        let url = Url::parse("http://10.255.255.1/books").unwrap();
        let err = transport.get_text(&url, &cancel).await.unwrap_err();
        assert!(matches!(err, CatalogError::Cancelled));
    }
}
