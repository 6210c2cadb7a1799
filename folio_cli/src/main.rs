use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON/YAML on stdout stays parseable
    let default_filter = match cli.verbose {
        0 => "folio=warn,folio_cli=info",
        1 => "folio=debug",
        _ => "folio=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        None => show_overview(&cli),
        Some(Commands::Search {
            query,
            page,
            sources,
        }) => search::run(&cli, query, *page, sources.as_deref()).await,
        Some(Commands::Read { input, index }) => read::run(&cli, input, *index).await,
        Some(Commands::Browse { query }) => browse::run(&cli, query).await,
        Some(Commands::Sources) => sources::run(&cli),
        Some(Commands::Stash { action }) => shelf::run_stash(&cli, action.clone()),
        Some(Commands::History { action }) => shelf::run_history(&cli, action.clone()),
        Some(Commands::Config { action }) => config::run(&cli, action.clone()),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}

fn show_overview(cli: &Cli) -> commands::Result<()> {
    let (store, config) = load_config(cli)?;

    println!();
    println!(
        "{}  {}",
        "Folio".bold().cyan(),
        "- Free books from public catalogs".dimmed()
    );
    println!();

    let labels: Vec<String> = config
        .sources
        .iter()
        .map(|s| s.label().green().to_string())
        .collect();
    println!(
        "  {} catalogs searched: {}",
        config.sources.len().to_string().green().bold(),
        labels.join(", ")
    );
    let config_state = if store.exists() {
        "".to_string()
    } else {
        " (not created, using defaults)".dimmed().to_string()
    };
    println!(
        "  config: {}{}",
        store.path().display().to_string().cyan(),
        config_state
    );
    println!();

    println!("{}", "Quick Start:".bold().cyan());
    println!(
        "  {}{}",
        "folio search \"science fiction\"".cyan(),
        "   Search every catalog at once".dimmed()
    );
    println!(
        "  {}{}",
        "folio browse".cyan(),
        "                     Interactive search and reading".dimmed()
    );
    println!(
        "  {}{}",
        "folio read results.json -i 2".cyan(),
        "     Open a book from saved results".dimmed()
    );
    println!(
        "  {}{}",
        "folio stash".cyan(),
        "                      Books kept for later".dimmed()
    );
    println!();
    println!(
        "{}",
        "Run 'folio --help' for all commands.".dimmed()
    );
    println!();

    Ok(())
}
