//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Datadog log exporter CLI
#[derive(Parser, Debug)]
#[command(name = "dd-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Export definition file (YAML)
    #[arg(short, long, global = true, default_value = "export.yaml")]
    pub config: PathBuf,

    /// Format of status messages on stdout
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a small sample and print it as CSV without writing a file
    Validate {
        /// Records to sample
        #[arg(long, default_value = "10")]
        sample: usize,
    },

    /// Export the whole range into a CSV file
    Export {
        /// Output file (defaults to `<name>.csv`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Split the range into partitions fetched concurrently
        #[arg(long)]
        parallel: bool,

        /// Override range start (epoch ms)
        #[arg(long)]
        from: Option<i64>,

        /// Override range end (epoch ms)
        #[arg(long)]
        to: Option<i64>,

        /// Override the search query
        #[arg(long)]
        query: Option<String>,

        /// Stop after this many records (sequential runs only)
        #[arg(long)]
        max_records: Option<usize>,
    },

    /// Print the partition plan for the configured range
    Intervals,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
