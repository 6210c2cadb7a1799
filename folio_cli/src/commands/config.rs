use crate::cli::{Cli, ConfigAction};
use crate::commands::{load_config, CommandError, Result};
use crate::output::{format_output, OutputData};
use folio_core::{ConfigStore, FolioConfig};
use owo_colors::OwoColorize;

pub fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => {
            let store = ConfigStore::locate(cli.config.clone());
            println!("{}", store.path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init_config(cli, force),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let (store, config) = load_config(cli)?;
    format_output(
        &OutputData::ConfigInfo {
            path: store.path().display().to_string(),
            exists: store.exists(),
            config,
        },
        &cli.output,
    )
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let store = ConfigStore::locate(cli.config.clone());
    if store.exists() && !force {
        return Err(CommandError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        )));
    }

    store.save(&FolioConfig::default())?;
    println!(
        "{} Wrote default config to {}",
        "✓".green(),
        store.path().display().to_string().cyan()
    );
    Ok(())
}
