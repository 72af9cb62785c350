//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page posts retrieval CLI
#[derive(Parser, Debug)]
#[command(name = "pagefeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Access token (overrides the settings file and PAGEFEED_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a page's posts as a table
    Posts {
        /// Page identifier
        page: String,

        /// Total number of posts to retrieve
        #[arg(short = 'n', long, default_value = "25")]
        count: usize,

        /// Only posts updated on or after this time
        /// (date, timestamp, or a relative expression the API understands)
        #[arg(long)]
        since: Option<String>,

        /// Only posts updated before this time
        #[arg(long)]
        until: Option<String>,

        /// List the whole timeline, visitor posts included
        #[arg(long)]
        feed: bool,

        /// Fetch reaction tallies per post
        #[arg(long)]
        reactions: bool,

        /// API version, e.g. v19.0
        #[arg(long)]
        api_version: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "jsonl")]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Probe a page with a single-post request
    Check {
        /// Page identifier
        page: String,

        /// API version, e.g. v19.0
        #[arg(long)]
        api_version: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Jsonl,
    /// A single indented JSON document
    Json,
    /// Comma-separated values with a header row
    Csv,
    /// Fixed-width listing for terminals
    Pretty,
}
