use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio - search and read free books across public catalogs")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  folio search \"science fiction\"          Search every catalog at once
  folio search dune --page 2              Next page of results
  folio search poetry -s gutenberg        Search a single catalog
  folio browse                            Interactive search and reading
  folio sources                           Show the catalogs being searched

\x1b[1;36mReading:\x1b[0m
  folio search dune --output json > dune.json
  folio read dune.json --index 3          Open the third result
  folio search dune -o json | folio read -

\x1b[1;36mShelf:\x1b[0m
  folio stash add dune.json --index 2     Keep a book for later
  folio stash                             Books you kept
  folio history                           Books you opened recently

\x1b[1;36mConfiguration:\x1b[0m
  folio config init                       Write a default config file
  folio config show                       View the effective configuration")]
#[command(long_about = "
\x1b[1mFolio\x1b[0m - federated book search

Searches Google Books, Project Gutenberg and Open Library concurrently and
shows one shuffled page of results with covers. A catalog that is slow or
down simply contributes nothing; the others still answer.
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Config file (defaults to ~/.config/folio/config.yaml)
    #[arg(long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v for debug logs)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search every enabled catalog for one page of books
    ///
    /// Results from all catalogs are merged, shuffled, and limited to books
    /// with a cover image.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  folio search \"science fiction\"
  folio search dune --page 2
  folio search horror -s gutenberg,openlib
  folio search dune --output json")]
    Search {
        /// The search query
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        /// Comma-separated catalogs to search (google, gutenberg, openlib)
        #[arg(short, long)]
        sources: Option<String>,
    },

    /// Open a book from search output
    ///
    /// Accepts a single book, a list of books, or the full JSON output of
    /// `folio search`. Use `-` to read from stdin.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  folio read book.json
  folio read results.json --index 2
  folio search dune -o json | folio read -")]
    Read {
        /// JSON file with the book(s), or `-` for stdin
        input: String,
        /// Which book to open when the input holds several (1-based)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        index: u32,
    },

    /// Interactive session: search, load more, open books
    #[command(after_help = "\x1b[1;33mCommands inside the session:\x1b[0m
  <text>      Search for <text>
  more        Load the next page
  open N      Open book N
  stash N     Keep book N for later
  help        Show commands
  quit        Exit")]
    Browse {
        /// Initial query
        query: Vec<String>,
    },

    /// List the catalogs being searched
    #[command(alias = "ls")]
    Sources,

    /// Books kept for later
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  folio stash add results.json --index 2
  folio stash rm 1
  folio stash rm gutenberg:84
  folio stash -o json | folio read - --index 1")]
    Stash {
        #[command(subcommand)]
        action: Option<StashAction>,
    },

    /// Books opened recently, newest first
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum StashAction {
    /// List stashed books (the default)
    List,
    /// Stash a book from search output
    Add {
        /// JSON file with the book(s), or `-` for stdin
        input: String,
        /// Which book to stash when the input holds several (1-based)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        index: u32,
    },
    /// Remove a book by list number or `source:id`
    #[command(alias = "remove")]
    Rm { book: String },
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum HistoryAction {
    /// List recently opened books (the default)
    List,
    /// Remove a book by list number or `source:id`
    #[command(alias = "remove")]
    Rm { book: String },
    /// Forget every opened book
    Clear,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}
