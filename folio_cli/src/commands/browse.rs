use crate::cli::Cli;
use crate::commands::shelf::{record_read, shelf_store};
use crate::commands::{load_folio, Result};
use crate::output::{format_book_list, format_content, terminal_width};
use folio_core::{ComposedPage, Folio, SearchSession, SessionUpdate, UnifiedBook};
use owo_colors::OwoColorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// One line typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseInput {
    Search(String),
    More,
    Open(usize),
    Stash(usize),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_line(line: &str) -> BrowseInput {
    let line = line.trim();
    if line.is_empty() {
        return BrowseInput::Empty;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    match (head.to_ascii_lowercase().as_str(), rest) {
        ("quit" | "exit" | "q", "") => BrowseInput::Quit,
        ("more" | "next" | "m", "") => BrowseInput::More,
        ("help" | "?", "") => BrowseInput::Help,
        ("open", n) => parse_index(n, BrowseInput::Open),
        ("stash", n) => parse_index(n, BrowseInput::Stash),
        _ if line.chars().all(|c| c.is_ascii_digit()) => parse_index(line, BrowseInput::Open),
        _ => BrowseInput::Search(line.to_string()),
    }
}

fn parse_index(text: &str, to: fn(usize) -> BrowseInput) -> BrowseInput {
    match text.parse::<usize>() {
        Ok(n) if n > 0 => to(n),
        _ => BrowseInput::Invalid(format!("'{}' is not a book number", text)),
    }
}

/// Interactive loop: queries replace the list, `more` extends it.
pub async fn run(cli: &Cli, initial: &[String]) -> Result<()> {
    let folio = load_folio(cli, None)?;
    let session = folio.session();

    print_help();
    if !initial.is_empty() {
        search(&session, &initial.join(" ")).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            BrowseInput::Search(query) => search(&session, &query).await,
            BrowseInput::More => more(&session).await,
            BrowseInput::Open(n) => open(cli, &folio, &session, n).await,
            BrowseInput::Stash(n) => stash(cli, &session, n).await,
            BrowseInput::Help => print_help(),
            BrowseInput::Quit => break,
            BrowseInput::Empty => {}
            BrowseInput::Invalid(msg) => println!("{}", msg.yellow()),
        }
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("{} ", "folio>".cyan().bold());
    std::io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!();
    println!("{}", "Folio browse".bold().cyan());
    println!("  {}   search for <text>", "<text>".cyan());
    println!("  {}     load the next page", "more".cyan());
    println!("  {}   open book N", "open N".cyan());
    println!("  {}  keep book N for later", "stash N".cyan());
    println!("  {}     leave", "quit".cyan());
    println!();
}

async fn search(session: &SearchSession, query: &str) {
    if let Some(cached) = session.cached(query).await {
        println!("{}", "(cached, refreshing...)".dimmed());
        print_books(&cached, 1);
    }

    match session.reset(query).await {
        Ok(SessionUpdate::Applied { added, .. }) => {
            let books = session.books().await;
            if added == 0 {
                println!(
                    "{}",
                    "No books with covers found. Try a broader query.".yellow()
                );
            } else {
                print_books(&books, 1);
            }
        }
        Ok(_) => {}
        Err(e) => println!("{}: {}", "Error".red().bold(), e),
    }
}

async fn more(session: &SearchSession) {
    let shown = session.books().await.len();
    match session.load_more().await {
        SessionUpdate::Applied { page, added: 0 } => {
            println!("{}", format!("Page {} had nothing new.", page).dimmed());
        }
        SessionUpdate::Applied { .. } => {
            let books = session.books().await;
            let new_books = ComposedPage::new(books.into_iter().skip(shown).collect());
            print_books(&new_books, shown + 1);
        }
        SessionUpdate::Idle => println!("{}", "Search for something first.".yellow()),
        SessionUpdate::Busy => println!("{}", "Still loading...".dimmed()),
        SessionUpdate::Stale => {}
    }
}

async fn open(cli: &Cli, folio: &Folio, session: &SearchSession, n: usize) {
    let books = session.books().await;
    let Some(book) = listed(&books, n) else {
        return;
    };

    match folio.resolver().resolve(book).await {
        Ok(content) => {
            record_read(cli, book);
            println!();
            print!("{}", format_content(book, &content));
            println!();
        }
        Err(e) => {
            debug!(id = %book.id, source = %book.source, code = e.code_str(), "content unavailable");
            println!("{}", e.to_string().red().bold());
        }
    }
}

async fn stash(cli: &Cli, session: &SearchSession, n: usize) {
    let books = session.books().await;
    let Some(book) = listed(&books, n) else {
        return;
    };

    match shelf_store(cli).update(|shelf| shelf.stash_book(book.clone())) {
        Ok(true) => println!("{} Stashed {}", "✓".green(), book.title.bold()),
        Ok(false) => println!("{}", format!("{} is already stashed", book.title).dimmed()),
        Err(e) => println!("{}: {}", "Error".red().bold(), e),
    }
}

fn listed(books: &ComposedPage, n: usize) -> Option<&UnifiedBook> {
    let book = books.get(n - 1);
    if book.is_none() {
        println!(
            "{}",
            format!("No book {} (showing {})", n, books.len()).yellow()
        );
    }
    book
}

fn print_books(books: &ComposedPage, first_index: usize) {
    println!();
    println!("{}", format_book_list(books, first_index, terminal_width()));
}
