//! Library configuration.
//!
//! Everything has a default, so a missing config file simply means defaults.
//! The file lives at `~/.config/folio/config.yaml` unless overridden.

use crate::error::ConfigError;
use crate::federated::Source;
use crate::transport::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

// ============================================================================
// Default Values
// ============================================================================

/// Default per-catalog time budget in milliseconds
pub const DEFAULT_ADAPTER_TIMEOUT_MS: u64 = 3000;

/// Default content proxy timeout in milliseconds
pub const DEFAULT_CONTENT_TIMEOUT_MS: u64 = 15000;

/// Default books requested per catalog page
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Default number of cached first pages
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Environment variable naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "FOLIO_CONFIG";

pub const DEFAULT_GOOGLE_BOOKS_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_GUTENDEX_ENDPOINT: &str = "https://gutendex.com/books/";
pub const DEFAULT_OPEN_LIBRARY_ENDPOINT: &str = "https://openlibrary.org/search.json";
pub const DEFAULT_GOOGLE_EMBED_ENDPOINT: &str = "https://books.google.com/books";
pub const DEFAULT_TEXT_PROXY_ENDPOINT: &str = "https://api.allorigins.win/raw";
pub const DEFAULT_ARCHIVE_EMBED_ENDPOINT: &str = "https://archive.org/embed/";

// ============================================================================
// FolioConfig
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Time budget for each catalog request (default: 3000)
    #[serde(default = "default_adapter_timeout_ms")]
    pub adapter_timeout_ms: u64,

    /// Time budget for fetching book text (default: 15000)
    #[serde(default = "default_content_timeout_ms")]
    pub content_timeout_ms: u64,

    /// Books per catalog page (default: 12)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Cached first pages; 0 disables the cache (default: 32)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Catalogs to search, in order (default: all)
    #[serde(default = "default_sources")]
    pub sources: Vec<Source>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

fn default_adapter_timeout_ms() -> u64 {
    DEFAULT_ADAPTER_TIMEOUT_MS
}

fn default_content_timeout_ms() -> u64 {
    DEFAULT_CONTENT_TIMEOUT_MS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_sources() -> Vec<Source> {
    Source::ALL.to_vec()
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            adapter_timeout_ms: DEFAULT_ADAPTER_TIMEOUT_MS,
            content_timeout_ms: DEFAULT_CONTENT_TIMEOUT_MS,
            page_size: DEFAULT_PAGE_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            user_agent: default_user_agent(),
            sources: default_sources(),
            endpoints: Endpoints::default(),
        }
    }
}

impl FolioConfig {
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_millis(self.content_timeout_ms)
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Base URLs of every external service, kept as strings in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub google_books: String,
    pub gutendex: String,
    pub open_library: String,
    pub google_embed: String,
    pub text_proxy: String,
    pub archive_embed: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            google_books: DEFAULT_GOOGLE_BOOKS_ENDPOINT.to_string(),
            gutendex: DEFAULT_GUTENDEX_ENDPOINT.to_string(),
            open_library: DEFAULT_OPEN_LIBRARY_ENDPOINT.to_string(),
            google_embed: DEFAULT_GOOGLE_EMBED_ENDPOINT.to_string(),
            text_proxy: DEFAULT_TEXT_PROXY_ENDPOINT.to_string(),
            archive_embed: DEFAULT_ARCHIVE_EMBED_ENDPOINT.to_string(),
        }
    }
}

/// [`Endpoints`] after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEndpoints {
    pub google_books: Url,
    pub gutendex: Url,
    pub open_library: Url,
    pub google_embed: Url,
    pub text_proxy: Url,
    pub archive_embed: Url,
}

impl Endpoints {
    pub fn parsed(&self) -> Result<ParsedEndpoints, ConfigError> {
        Ok(ParsedEndpoints {
            google_books: parse_endpoint("google_books", &self.google_books)?,
            gutendex: parse_endpoint("gutendex", &self.gutendex)?,
            open_library: parse_endpoint("open_library", &self.open_library)?,
            google_embed: parse_endpoint("google_embed", &self.google_embed)?,
            text_proxy: parse_endpoint("text_proxy", &self.text_proxy)?,
            archive_embed: parse_endpoint("archive_embed", &self.archive_embed)?,
        })
    }
}

impl Default for ParsedEndpoints {
    fn default() -> Self {
        // The defaults above are literal, valid URLs.
        Endpoints::default()
            .parsed()
            .expect("default endpoints are valid URLs")
    }
}

fn parse_endpoint(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|source| ConfigError::Endpoint { name, source })
}

// ============================================================================
// ConfigStore
// ============================================================================

/// Storage for the configuration file.
///
/// The config is stored in YAML format at `~/.config/folio/config.yaml`.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a config store at the default location.
    pub fn new_default() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        let path = base.join("folio").join("config.yaml");
        Self { path }
    }

    /// Create a config store at a custom path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Pick the config file: an explicit path, then `FOLIO_CONFIG`, then the default.
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        explicit
            .or_else(|| {
                std::env::var_os(CONFIG_ENV_VAR)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .map(Self::new)
            .unwrap_or_else(Self::new_default)
    }

    /// Get the path to the config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the config, falling back to defaults when the file does not exist.
    pub fn load(&self) -> Result<FolioConfig, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FolioConfig::default())
            }
            Err(source) => return Err(self.io_error(source)),
        };

        if content.trim().is_empty() {
            return Ok(FolioConfig::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save(&self, config: &FolioConfig) -> Result<(), ConfigError> {
        // Ensure directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = serde_yaml::to_string(config)?;
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
