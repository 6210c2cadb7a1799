use crate::cli::Cli;
use crate::commands::{load_folio, Result};
use crate::output::{format_output, OutputData};

/// List the catalogs the current config searches.
pub fn run(cli: &Cli) -> Result<()> {
    let folio = load_folio(cli, None)?;
    let catalogs = folio.library().registry().list();
    format_output(&OutputData::SourceList(catalogs), &cli.output)
}
