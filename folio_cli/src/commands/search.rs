use crate::cli::Cli;
use crate::commands::{load_folio, spinner, Result};
use crate::output::{format_output, OutputData};
use folio_core::PageRequest;
use tracing::debug;

/// Run one federated search and print the composed page.
pub async fn run(cli: &Cli, query: &[String], page: u32, sources: Option<&str>) -> Result<()> {
    let request = PageRequest::new(query.join(" "), page)?;
    let folio = load_folio(cli, sources)?;

    let catalogs = folio.library().registry().len();
    let progress = spinner(
        cli,
        format!(
            "Searching {} catalogs for '{}'...",
            catalogs,
            request.query()
        ),
    );

    let outcome = folio.library().search(&request).await;
    progress.finish_and_clear();

    debug!(
        query = %outcome.query,
        page = outcome.page,
        books = outcome.books.len(),
        "search finished"
    );

    format_output(&OutputData::SearchOutcome(outcome), &cli.output)
}
