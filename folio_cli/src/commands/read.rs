use crate::cli::Cli;
use crate::commands::shelf::record_read;
use crate::commands::{load_folio, spinner, CommandError, Result};
use crate::output::{format_output, OutputData};
use folio_core::{Source, UnifiedBook};
use serde_json::Value;
use std::io::Read;

/// Resolve one book from saved search output and print its content.
pub async fn run(cli: &Cli, input: &str, index: u32) -> Result<()> {
    let text = read_input(input)?;
    let book = select_book(parse_books(&text)?, index)?;
    let folio = load_folio(cli, None)?;

    let progress = spinner(cli, format!("Opening '{}'...", book.title));
    let content = folio.resolver().resolve(&book).await;
    progress.finish_and_clear();
    let content = content?;

    record_read(cli, &book);
    format_output(&OutputData::Content { book, content }, &cli.output)
}

pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

/// Books from a single book, a list of books, or `folio search` output.
///
/// JSON is tried first, then YAML. Source tags are checked before decoding
/// so an unknown catalog is reported as such rather than as a parse error.
pub fn parse_books(text: &str) -> Result<Vec<UnifiedBook>> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(json_err) => serde_yaml::from_str(text).map_err(|_| json_err)?,
    };

    let items = match unwrap_envelope(value) {
        Value::Array(items) => items,
        Value::Object(mut obj) if obj.contains_key("books") => match obj.remove("books") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CommandError::InvalidInput(
                    "'books' must be a list".to_string(),
                ))
            }
        },
        value @ Value::Object(_) => vec![value],
        _ => {
            return Err(CommandError::InvalidInput(
                "expected a book, a list of books, or search output".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .map(|mut item| {
            canonicalize_tags(&mut item)?;
            Ok(serde_json::from_value(item)?)
        })
        .collect()
}

/// Strip the `{"type": ..., "data": ...}` wrapper added by `--output json`.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("type") && obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn canonicalize_tags(item: &mut Value) -> Result<()> {
    let Some(obj) = item.as_object_mut() else {
        return Ok(());
    };
    if let Some(tag) = obj.get("source").and_then(Value::as_str) {
        let source: Source = tag.parse()?;
        obj.insert("source".to_string(), Value::from(source.as_str()));
    }
    if let Some(raw) = obj.get_mut("raw").and_then(Value::as_object_mut) {
        if let Some(tag) = raw.get("catalog").and_then(Value::as_str) {
            let source: Source = tag.parse()?;
            raw.insert("catalog".to_string(), Value::from(source.as_str()));
        }
    }
    Ok(())
}

pub fn select_book(mut books: Vec<UnifiedBook>, index: u32) -> Result<UnifiedBook> {
    let count = books.len();
    let position = index as usize;
    if position == 0 || position > count {
        return Err(CommandError::InvalidInput(format!(
            "book {} requested but the input holds {}",
            index, count
        )));
    }
    Ok(books.swap_remove(position - 1))
}
