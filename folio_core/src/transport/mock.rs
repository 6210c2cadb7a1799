//! In-memory transport for testing.

use super::HttpTransport;
use crate::error::CatalogError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What a mocked route answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with this body
    Body(String),
    /// Non-success status
    Status(u16),
    /// Never answers; only settles when cancelled
    Hang,
}

#[derive(Debug, Clone)]
struct Route {
    prefix: String,
    reply: MockReply,
    delay: Option<Duration>,
}

/// Transport answering from canned routes and recording every requested URL.
///
/// Routes match by URL prefix, first registered wins. Unmatched URLs answer
/// 404. Lets tests drive adapters and the resolver without a network, and
/// assert on exactly which requests were made.
///
/// # Example
///
/// ```
/// use folio_core::transport::MockTransport;
/// use serde_json::json;
///
/// let transport = MockTransport::new()
///     .with_json("https://gutendex.com/books", json!({"results": []}));
/// assert_eq!(transport.call_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, prefix: impl Into<String>, reply: MockReply) -> Self {
        self.routes.push(Route {
            prefix: prefix.into(),
            reply,
            delay: None,
        });
        self
    }

    pub fn with_body(self, prefix: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_reply(prefix, MockReply::Body(body.into()))
    }

    pub fn with_json(self, prefix: impl Into<String>, body: Value) -> Self {
        self.with_reply(prefix, MockReply::Body(body.to_string()))
    }

    pub fn with_status(self, prefix: impl Into<String>, status: u16) -> Self {
        self.with_reply(prefix, MockReply::Status(status))
    }

    /// Answer with `body` only after `delay` has elapsed.
    pub fn with_delayed_json(
        mut self,
        prefix: impl Into<String>,
        delay: Duration,
        body: Value,
    ) -> Self {
        self.routes.push(Route {
            prefix: prefix.into(),
            reply: MockReply::Body(body.to_string()),
            delay: Some(delay),
        });
        self
    }

    /// Every URL requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn route_for(&self, url: &Url) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| url.as_str().starts_with(&route.prefix))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get_text(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<String, CatalogError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }

        let Some(route) = self.route_for(url).cloned() else {
            return Err(CatalogError::Status {
                status: StatusCode::NOT_FOUND,
                url: url.to_string(),
            });
        };

        if let Some(delay) = route.delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(CatalogError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        match route.reply {
            MockReply::Body(body) => Ok(body),
            MockReply::Status(code) => Err(CatalogError::Status {
                status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                url: url.to_string(),
            }),
            MockReply::Hang => {
                cancel.cancelled().await;
                Err(CatalogError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_routes_and_records_calls() {
        let transport = MockTransport::new()
            .with_json("https://a.test/", json!({"ok": true}))
            .with_status("https://b.test/", 503);
        let cancel = CancellationToken::new();

        let a = Url::parse("https://a.test/x?q=1").unwrap();
        let b = Url::parse("https://b.test/y").unwrap();
        let c = Url::parse("https://c.test/").unwrap();

        assert_eq!(transport.get_json(&a, &cancel).await.unwrap()["ok"], true);
        assert!(matches!(
            transport.get_text(&b, &cancel).await,
            Err(CatalogError::Status { status, .. }) if status.as_u16() == 503
        ));
        assert!(transport.get_text(&c, &cancel).await.is_err());
        assert_eq!(transport.call_count(), 3);
        assert_eq!(transport.calls()[0], "https://a.test/x?q=1");
    }

    #[tokio::test]
    async fn test_hang_settles_on_cancel() {
        let transport = MockTransport::new().with_reply("https://slow.test/", MockReply::Hang);
        let cancel = CancellationToken::new();
        let url = Url::parse("https://slow.test/").unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = transport.get_text(&url, &cancel).await.unwrap_err();
        assert!(matches!(err, CatalogError::Cancelled));
    }
}
