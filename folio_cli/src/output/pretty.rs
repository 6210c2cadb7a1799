//! Pretty formatter for terminal output.
//!
//! Books render as numbered cards so `read --index N` and `open N` line up
//! with what the user sees. Catalog listings use a table.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use folio_core::{CatalogInfo, ComposedPage, ContentResult, SearchOutcome, Source, UnifiedBook};
use owo_colors::OwoColorize;

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Indent for card content (after number)
const CARD_INDENT: usize = 6;

/// Widest column used for book text, however wide the terminal is
const MAX_TEXT_WIDTH: usize = 100;

pub fn format_search_outcome(outcome: &SearchOutcome) -> String {
    let width = terminal_width();
    let mut output = String::new();

    let label = format!("{} (page {})", outcome.query, outcome.page);
    output.push_str(&format_section_header(
        &label,
        Some(outcome.books.len()),
        width,
    ));
    output.push_str("\n\n");

    if outcome.is_empty() {
        output.push_str(&format!(
            "      {}\n",
            "No books with covers found. Try a broader query.".yellow()
        ));
    } else {
        output.push_str(&format_book_list(&outcome.books, 1, width));
    }

    output.push('\n');
    output.push_str(&format_source_summary(outcome));
    output
}

/// The stash or history, numbered for `stash rm N` / `history rm N`.
pub fn format_shelf_list(list: &str, books: &[UnifiedBook]) -> String {
    let width = terminal_width();
    let mut output = format_section_header(list, Some(books.len()), width);
    output.push_str("\n\n");

    if books.is_empty() {
        output.push_str(&format!("      {}\n", "Nothing here yet.".dimmed()));
        return output;
    }
    for (i, book) in books.iter().enumerate() {
        output.push_str(&format_book_card(book, i + 1, width));
        output.push_str(&format!("      {}\n", book.key().to_string().dimmed()));
        output.push('\n');
    }
    output
}

/// Cards for `books`, numbered from `first_index`.
pub fn format_book_list(books: &ComposedPage, first_index: usize, width: usize) -> String {
    books
        .iter()
        .enumerate()
        .map(|(i, book)| format_book_card(book, first_index + i, width))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_book_card(book: &UnifiedBook, index: usize, width: usize) -> String {
    let mut output = String::new();
    let content_width = width.saturating_sub(CARD_INDENT + 2).max(20);

    let index_str = format!(" {:>3}. ", index).cyan().bold().to_string();
    output.push_str(&format!(
        "{}{} {}\n",
        index_str,
        truncate_str(&book.title, content_width).bold(),
        source_badge(book.source)
    ));
    output.push_str(&format!("      {}\n", book.author.dimmed()));
    if let Some(cover) = &book.cover_url {
        output.push_str(&format!(
            "      {}\n",
            format_hyperlink(cover, "cover").blue()
        ));
    }
    output
}

fn format_source_summary(outcome: &SearchOutcome) -> String {
    let parts: Vec<String> = outcome
        .sources
        .iter()
        .map(|report| {
            let count = if report.count > 0 {
                report.count.to_string().green().to_string()
            } else {
                "0".yellow().to_string()
            };
            format!(
                "{} {} {}",
                report.source.label().dimmed(),
                count,
                format!("({}ms)", report.duration_ms).dimmed()
            )
        })
        .collect();

    let mut line = format!("  {} {}", "Sources:".dimmed(), parts.join("  "));
    if let Some(ms) = outcome.duration_ms {
        line.push_str(&format!("  {}", format!("· {}ms total", ms).dimmed()));
    }
    line.push('\n');
    line
}

fn source_badge(source: Source) -> String {
    let badge = format!("[{}]", source.label());
    match source {
        Source::GoogleBooks => badge.blue().to_string(),
        Source::Gutenberg => badge.magenta().to_string(),
        Source::OpenLibrary => badge.green().to_string(),
    }
}

pub fn format_content(book: &UnifiedBook, content: &ContentResult) -> String {
    let width = terminal_width().min(MAX_TEXT_WIDTH);
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}\n",
        book.title.bold().cyan(),
        source_badge(book.source)
    ));
    output.push_str(&format!("{}\n\n", book.author.dimmed()));

    match content {
        ContentResult::Embed { url } => {
            output.push_str(&format!("{}\n", "Open in a browser:".dimmed()));
            output.push_str(&format!("  {}\n", format_hyperlink(url, url).blue()));
        }
        ContentResult::Text { content } => {
            output.push_str(&format_text_content(content, width));
            output.push('\n');
        }
    }
    output
}

/// Turn display HTML (escaped text with `<br>` breaks) back into plain text.
pub fn plain_text(content: &str) -> String {
    let text = content.replace("<br>", "\n");
    html_escape::decode_html_entities(&text).into_owned()
}

/// [`plain_text`] wrapped to `width` columns.
pub fn format_text_content(content: &str, width: usize) -> String {
    plain_text(content)
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                textwrap::fill(line, width.max(20))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_sources_table(catalogs: &[CatalogInfo]) -> String {
    if catalogs.is_empty() {
        return "(no catalogs enabled)\n".dimmed().to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Source".cyan().bold().to_string()),
        Cell::new("Badge".cyan().bold().to_string()),
        Cell::new("Description".cyan().bold().to_string()),
    ]);

    for info in catalogs {
        table.add_row(vec![
            Cell::new(info.source.as_str()),
            Cell::new(source_badge(info.source)),
            Cell::new(info.description),
        ]);
    }

    format!("{}\n", table)
}

fn format_section_header(label: &str, count: Option<usize>, width: usize) -> String {
    let count_str = match count {
        Some(n) => format!(" ({} books)", n),
        None => String::new(),
    };

    let header_text = format!("{}{}", label, count_str);
    let line_len = (width.saturating_sub(header_text.len() + 4)).min(60);
    let line = "─".repeat(line_len);

    format!(
        "{} {} {}",
        "──".cyan(),
        header_text.green().bold(),
        line.cyan()
    )
}

fn truncate_str(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or(s);

    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// OSC 8 hyperlink; terminals without support show the text only.
fn format_hyperlink(url: &str, display_text: &str) -> String {
    format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", url, display_text)
}
