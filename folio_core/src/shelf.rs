//! Books kept for later (the stash) and books recently opened (history).
//!
//! Both lists are newest first and hold each [`BookKey`] at most once. The
//! shelf is stored as YAML next to the config file.

use crate::config::ConfigStore;
use crate::error::ConfigError;
use crate::federated::{BookKey, UnifiedBook};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Most books kept in the reading history
pub const HISTORY_LIMIT: usize = 50;

pub const SHELF_FILE_NAME: &str = "shelf.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    #[serde(default)]
    stash: Vec<UnifiedBook>,

    #[serde(default)]
    history: Vec<UnifiedBook>,
}

impl Shelf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stashed books, most recently stashed first.
    pub fn stash(&self) -> &[UnifiedBook] {
        &self.stash
    }

    /// Opened books, most recently opened first.
    pub fn history(&self) -> &[UnifiedBook] {
        &self.history
    }

    pub fn is_stashed(&self, key: &BookKey) -> bool {
        position(&self.stash, key).is_some()
    }

    /// Put `book` at the top of the stash. Returns false if it was already there.
    pub fn stash_book(&mut self, book: UnifiedBook) -> bool {
        if self.is_stashed(&book.key()) {
            return false;
        }
        self.stash.insert(0, book);
        true
    }

    pub fn unstash(&mut self, key: &BookKey) -> Option<UnifiedBook> {
        position(&self.stash, key).map(|i| self.stash.remove(i))
    }

    /// Note that `book` was opened, moving it to the top of the history.
    pub fn record_read(&mut self, book: UnifiedBook) {
        if let Some(i) = position(&self.history, &book.key()) {
            self.history.remove(i);
        }
        self.history.insert(0, book);
        self.history.truncate(HISTORY_LIMIT);
    }

    pub fn forget(&mut self, key: &BookKey) -> Option<UnifiedBook> {
        position(&self.history, key).map(|i| self.history.remove(i))
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Drop repeated keys (keeping the first) and cap the history.
    fn normalized(mut self) -> Self {
        dedupe(&mut self.stash);
        dedupe(&mut self.history);
        self.history.truncate(HISTORY_LIMIT);
        self
    }
}

fn position(books: &[UnifiedBook], key: &BookKey) -> Option<usize> {
    books
        .iter()
        .position(|b| b.source == key.source && b.id == key.id)
}

fn dedupe(books: &mut Vec<UnifiedBook>) {
    let mut seen = std::collections::HashSet::new();
    books.retain(|b| seen.insert(b.key()));
}

/// Storage for the shelf file.
pub struct ShelfStore {
    path: PathBuf,
}

impl ShelfStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The shelf file in the same directory as `config`.
    pub fn beside(config: &ConfigStore) -> Self {
        Self::new(config.path().with_file_name(SHELF_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the shelf; a missing or empty file is an empty shelf.
    pub fn load(&self) -> Result<Shelf, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Shelf::default()),
            Err(source) => return Err(self.io_error(source)),
        };

        if content.trim().is_empty() {
            return Ok(Shelf::default());
        }
        let shelf: Shelf = serde_yaml::from_str(&content)?;
        Ok(shelf.normalized())
    }

    pub fn save(&self, shelf: &Shelf) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = serde_yaml::to_string(shelf)?;
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))?;
        debug!(
            target: "folio.shelf",
            path = %self.path.display(),
            stashed = shelf.stash.len(),
            history = shelf.history.len(),
            "shelf saved"
        );
        Ok(())
    }

    /// Load, apply `change`, and save.
    pub fn update<T>(&self, change: impl FnOnce(&mut Shelf) -> T) -> Result<T, ConfigError> {
        let mut shelf = self.load()?;
        let result = change(&mut shelf);
        self.save(&shelf)?;
        Ok(result)
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federated::{GutendexBook, RawRecord};
    use tempfile::TempDir;

    fn book(id: &str) -> UnifiedBook {
        UnifiedBook::new(id, format!("Book {}", id), RawRecord::Gutenberg(GutendexBook::default()))
    }

    fn ids(books: &[UnifiedBook]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_stash_is_newest_first_without_duplicates() {
        let mut shelf = Shelf::new();
        assert!(shelf.stash_book(book("1")));
        assert!(shelf.stash_book(book("2")));
        assert!(!shelf.stash_book(book("1")));

        assert_eq!(ids(shelf.stash()), vec!["2", "1"]);
        assert!(shelf.is_stashed(&book("1").key()));
    }

    #[test]
    fn test_unstash() {
        let mut shelf = Shelf::new();
        shelf.stash_book(book("1"));
        shelf.stash_book(book("2"));

        assert_eq!(shelf.unstash(&book("1").key()).map(|b| b.id), Some("1".to_string()));
        assert!(shelf.unstash(&book("1").key()).is_none());
        assert_eq!(ids(shelf.stash()), vec!["2"]);
    }

    #[test]
    fn test_history_moves_reread_book_to_front() {
        let mut shelf = Shelf::new();
        shelf.record_read(book("1"));
        shelf.record_read(book("2"));
        shelf.record_read(book("1"));

        assert_eq!(ids(shelf.history()), vec!["1", "2"]);

        shelf.forget(&book("2").key());
        assert_eq!(ids(shelf.history()), vec!["1"]);
        shelf.clear_history();
        assert!(shelf.history().is_empty());
    }

    #[test]
    fn test_history_is_capped() {
        let mut shelf = Shelf::new();
        for i in 0..HISTORY_LIMIT + 5 {
            shelf.record_read(book(&i.to_string()));
        }
        assert_eq!(shelf.history().len(), HISTORY_LIMIT);
        let newest = (HISTORY_LIMIT + 4).to_string();
        assert_eq!(shelf.history()[0].id, newest);
    }

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ShelfStore::new(dir.path().join("nested").join(SHELF_FILE_NAME));
        assert_eq!(store.load().unwrap(), Shelf::default());

        let added = store.update(|shelf| shelf.stash_book(book("84"))).unwrap();
        assert!(added);
        store.update(|shelf| shelf.record_read(book("11"))).unwrap();

        let shelf = store.load().unwrap();
        assert_eq!(ids(shelf.stash()), vec!["84"]);
        assert_eq!(ids(shelf.history()), vec!["11"]);
    }

    #[test]
    fn test_store_normalizes_hand_edited_file() {
        let dir = TempDir::new().unwrap();
        let store = ShelfStore::new(dir.path().join(SHELF_FILE_NAME));
        let mut shelf = Shelf::new();
        shelf.stash = vec![book("1"), book("1"), book("2")];
        store.save(&shelf).unwrap();

        assert_eq!(ids(store.load().unwrap().stash()), vec!["1", "2"]);
    }

    #[test]
    fn test_shelf_sits_beside_config() {
        let config = ConfigStore::new(PathBuf::from("/tmp/folio/config.yaml"));
        assert_eq!(
            ShelfStore::beside(&config).path(),
            Path::new("/tmp/folio/shelf.yaml")
        );
    }
}
