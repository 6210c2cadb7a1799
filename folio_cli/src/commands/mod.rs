pub mod browse;
pub mod config;
pub mod read;
pub mod search;
pub mod shelf;
pub mod sources;

use crate::cli::{Cli, OutputFormat};
use folio_core::{
    CatalogError, ConfigError, ConfigStore, ContentError, Folio, FolioConfig, ReqwestTransport,
    Source, UnknownSourceError,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Search failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Content(#[from] ContentError),

    #[error("{0}")]
    UnknownSource(#[from] UnknownSourceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Config file location and contents, honouring `--config` / `FOLIO_CONFIG`.
pub fn load_config(cli: &Cli) -> Result<(ConfigStore, FolioConfig)> {
    let store = ConfigStore::locate(cli.config.clone());
    let config = store.load()?;
    Ok((store, config))
}

/// Parse a comma-separated catalog list such as `google,openlib`.
pub fn parse_sources(list: &str) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let source: Source = name.parse()?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    if sources.is_empty() {
        return Err(CommandError::InvalidInput(
            "no catalogs given; expected e.g. google,gutenberg,openlib".to_string(),
        ));
    }
    Ok(sources)
}

/// Build the library from config, optionally narrowed to some catalogs.
pub fn load_folio(cli: &Cli, sources: Option<&str>) -> Result<Folio> {
    let (_, mut config) = load_config(cli)?;
    if let Some(list) = sources {
        config.sources = parse_sources(list)?;
    }
    let transport = ReqwestTransport::new(&config.user_agent)?;
    Ok(Folio::new(config, Arc::new(transport))?)
}

/// Spinner on stderr, only for human-readable output.
pub fn spinner(cli: &Cli, message: String) -> ProgressBar {
    if cli.output != OutputFormat::Pretty {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources_accepts_aliases() {
        let sources = parse_sources("google, openlib,gutendex").unwrap();
        assert_eq!(
            sources,
            vec![Source::GoogleBooks, Source::OpenLibrary, Source::Gutenberg]
        );
    }

    #[test]
    fn test_parse_sources_dedupes() {
        let sources = parse_sources("gutenberg,gutenberg").unwrap();
        assert_eq!(sources, vec![Source::Gutenberg]);
    }

    #[test]
    fn test_parse_sources_rejects_unknown_and_empty() {
        assert!(matches!(
            parse_sources("google,amazon"),
            Err(CommandError::UnknownSource(_))
        ));
        assert!(matches!(
            parse_sources(" , "),
            Err(CommandError::InvalidInput(_))
        ));
    }
}
