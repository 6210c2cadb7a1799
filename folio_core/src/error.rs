// src/error.rs
use reqwest::StatusCode;

/// Failures inside a single catalog adapter.
///
/// These never reach callers of the aggregator: `Catalog::fetch_page`
/// converts every one of them into an empty page.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("Malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CatalogError {
    pub fn code_str(&self) -> &'static str {
        match self {
            CatalogError::Http(_) => "upstream_error",
            CatalogError::Status { .. } => "upstream_status",
            CatalogError::Decode(_) | CatalogError::Malformed(_) => "parse_error",
            CatalogError::Url(_) => "invalid_url",
            CatalogError::Timeout(_) => "timeout",
            CatalogError::Cancelled => "cancelled",
            CatalogError::InvalidRequest(_) => "invalid_input",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CatalogError::Timeout(_))
    }
}

/// Terminal failures of content resolution, surfaced to the reader verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("NO TEXT FORMAT AVAILABLE")]
    UnsupportedFormat { id: String },

    #[error("{0}")]
    ContentFetch(String),

    #[error("NO EMBED FOUND")]
    NoEmbedFound { id: String },

    #[error("UNKNOWN SOURCE")]
    UnknownSource(String),

    #[error("CANCELLED")]
    Cancelled,
}

/// A source tag that does not name any known catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown source '{0}'")]
pub struct UnknownSourceError(pub String);

impl From<UnknownSourceError> for ContentError {
    fn from(err: UnknownSourceError) -> Self {
        ContentError::UnknownSource(err.0)
    }
}

impl ContentError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ContentError::UnsupportedFormat { .. } => "unsupported_format",
            ContentError::ContentFetch(_) => "content_fetch",
            ContentError::NoEmbedFound { .. } => "no_embed",
            ContentError::UnknownSource(_) => "unknown_source",
            ContentError::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid endpoint '{name}': {source}")]
    Endpoint {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}
