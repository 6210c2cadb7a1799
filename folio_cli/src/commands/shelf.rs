use crate::cli::{Cli, HistoryAction, StashAction};
use crate::commands::read::{parse_books, read_input, select_book};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, OutputData};
use folio_core::{BookKey, ConfigStore, ShelfStore, Source, UnifiedBook};
use owo_colors::OwoColorize;
use tracing::warn;

/// A book named on the command line: its number in a listing or its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookRef {
    Position(usize),
    Key(BookKey),
}

impl BookRef {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if let Ok(n) = text.parse::<usize>() {
            return match n {
                0 => Err(CommandError::InvalidInput(
                    "book numbers start at 1".to_string(),
                )),
                n => Ok(BookRef::Position(n)),
            };
        }

        let Some((source, id)) = text.split_once(':') else {
            return Err(CommandError::InvalidInput(format!(
                "'{}' is neither a book number nor source:id",
                text
            )));
        };
        let source: Source = source.trim().parse()?;
        let id = id.trim();
        if id.is_empty() {
            return Err(CommandError::InvalidInput(format!("'{}' has no id", text)));
        }
        Ok(BookRef::Key(BookKey {
            source,
            id: id.to_string(),
        }))
    }

    /// The key this reference names within `books`.
    pub fn key_in(&self, books: &[UnifiedBook]) -> Option<BookKey> {
        match self {
            BookRef::Position(n) => books.get(n - 1).map(UnifiedBook::key),
            BookRef::Key(key) => books.iter().any(|b| b.key() == *key).then(|| key.clone()),
        }
    }
}

pub fn shelf_store(cli: &Cli) -> ShelfStore {
    ShelfStore::beside(&ConfigStore::locate(cli.config.clone()))
}

/// Add `book` to the reading history; a failed write only warns.
pub fn record_read(cli: &Cli, book: &UnifiedBook) {
    let store = shelf_store(cli);
    if let Err(e) = store.update(|shelf| shelf.record_read(book.clone())) {
        warn!(path = %store.path().display(), error = %e, "could not update history");
    }
}

pub fn run_stash(cli: &Cli, action: Option<StashAction>) -> Result<()> {
    let store = shelf_store(cli);
    match action.unwrap_or(StashAction::List) {
        StashAction::List => {
            let shelf = store.load()?;
            list(cli, "stash", shelf.stash())
        }
        StashAction::Add { input, index } => {
            let book = select_book(parse_books(&read_input(&input)?)?, index)?;
            let title = book.title.clone();
            if store.update(|shelf| shelf.stash_book(book))? {
                println!("{} Stashed {}", "✓".green(), title.bold());
            } else {
                println!("{}", format!("{} is already stashed", title).dimmed());
            }
            Ok(())
        }
        StashAction::Rm { book } => {
            let reference = BookRef::parse(&book)?;
            let removed = store.update(|shelf| {
                reference
                    .key_in(shelf.stash())
                    .and_then(|key| shelf.unstash(&key))
            })?;
            report_removed(removed, &book, "stash")
        }
    }
}

pub fn run_history(cli: &Cli, action: Option<HistoryAction>) -> Result<()> {
    let store = shelf_store(cli);
    match action.unwrap_or(HistoryAction::List) {
        HistoryAction::List => {
            let shelf = store.load()?;
            list(cli, "history", shelf.history())
        }
        HistoryAction::Rm { book } => {
            let reference = BookRef::parse(&book)?;
            let removed = store.update(|shelf| {
                reference
                    .key_in(shelf.history())
                    .and_then(|key| shelf.forget(&key))
            })?;
            report_removed(removed, &book, "history")
        }
        HistoryAction::Clear => {
            store.update(|shelf| shelf.clear_history())?;
            println!("{} History cleared", "✓".green());
            Ok(())
        }
    }
}

fn list(cli: &Cli, name: &str, books: &[UnifiedBook]) -> Result<()> {
    format_output(
        &OutputData::BookList {
            list: name.to_string(),
            books: books.to_vec(),
        },
        &cli.output,
    )
}

fn report_removed(removed: Option<UnifiedBook>, reference: &str, list: &str) -> Result<()> {
    match removed {
        Some(book) => {
            println!("{} Removed {} from {}", "✓".green(), book.title.bold(), list);
            Ok(())
        }
        None => Err(CommandError::InvalidInput(format!(
            "no book {} in {}",
            reference, list
        ))),
    }
}
