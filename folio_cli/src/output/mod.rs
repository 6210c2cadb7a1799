use crate::cli::OutputFormat;
use crate::commands::Result;
use folio_core::{CatalogInfo, ContentResult, FolioConfig, SearchOutcome, UnifiedBook};
use owo_colors::OwoColorize;
use serde::Serialize;

pub mod pretty;
pub use pretty::{format_book_list, format_content, plain_text, terminal_width};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    SearchOutcome(SearchOutcome),
    Content {
        book: UnifiedBook,
        content: ContentResult,
    },
    SourceList(Vec<CatalogInfo>),
    /// A shelf list such as the stash or the history
    BookList {
        list: String,
        books: Vec<UnifiedBook>,
    },
    ConfigInfo {
        path: String,
        exists: bool,
        config: FolioConfig,
    },
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text => {
            format_text_output(data)?;
        }
        OutputFormat::Pretty => {
            format_pretty_output(data)?;
        }
    }
    Ok(())
}

fn format_text_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::SearchOutcome(outcome) => {
            for (i, book) in outcome.books.iter().enumerate() {
                println!(
                    "{}. [{}] {} - {}",
                    i + 1,
                    book.source.label(),
                    book.title,
                    book.author
                );
            }
        }
        OutputData::Content { content, .. } => match content {
            ContentResult::Embed { url } => println!("{}", url),
            ContentResult::Text { content } => {
                println!("{}", plain_text(content))
            }
        },
        OutputData::SourceList(catalogs) => {
            for info in catalogs {
                println!("{}: {}", info.source, info.description);
            }
        }
        OutputData::BookList { books, .. } => {
            for (i, book) in books.iter().enumerate() {
                println!(
                    "{}. [{}] {} - {} ({})",
                    i + 1,
                    book.source.label(),
                    book.title,
                    book.author,
                    book.key()
                );
            }
        }
        OutputData::ConfigInfo { config, .. } => {
            print!("{}", serde_yaml::to_string(config)?);
        }
    }
    Ok(())
}

fn format_pretty_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::SearchOutcome(outcome) => {
            println!();
            print!("{}", pretty::format_search_outcome(outcome));
        }
        OutputData::Content { book, content } => {
            println!();
            print!("{}", format_content(book, content));
        }
        OutputData::SourceList(catalogs) => {
            println!("{}", "Catalogs".cyan().bold());
            println!();
            print!("{}", pretty::format_sources_table(catalogs));
        }
        OutputData::BookList { list, books } => {
            println!();
            print!("{}", pretty::format_shelf_list(list, books));
        }
        OutputData::ConfigInfo {
            path,
            exists,
            config,
        } => {
            println!();
            println!("{}", "Configuration".bold().cyan());
            println!("{}", "=============".cyan());
            println!();
            let state = if *exists {
                String::new()
            } else {
                format!(" {}", "(not created, showing defaults)".yellow())
            };
            println!("Config file: {}{}", path.dimmed(), state);
            println!();
            print!("{}", serde_yaml::to_string(config)?);
        }
    }
    Ok(())
}
