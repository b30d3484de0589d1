//! CLI argument parsing for pidigits

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pd")]
#[command(author, version, about = "Digit lookup and pattern search over packed digits of pi", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Packed digit file (overrides config)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Total digit count, required when it is odd (overrides config)
    #[arg(long, global = true)]
    pub digit_count: Option<u64>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the digit at a position
    Digit {
        /// Zero-based digit position
        #[arg(required = true)]
        position: u64,
    },

    /// Show a run of digits
    Range {
        /// First digit position
        #[arg(required = true)]
        start: u64,

        /// Number of digits
        #[arg(required = true)]
        count: u64,
    },

    /// Search for a digit pattern
    Search {
        /// Digits to search for
        #[arg(required = true)]
        pattern: String,

        /// Position to start searching from
        #[arg(short, long, default_value = "0")]
        start: u64,

        /// Maximum matches to return (default: 1)
        #[arg(short, long)]
        max_matches: Option<usize>,

        /// Don't show the digits around the first match
        #[arg(long)]
        no_context: bool,
    },

    /// Show store metadata
    Info,

    /// Write digits as plain text
    Extract {
        /// First digit position
        #[arg(short, long, default_value = "0")]
        start: u64,

        /// Number of digits (default: through the end)
        #[arg(short = 'n', long)]
        count: Option<u64>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pack a text file of digits into the binary format
    Pack {
        /// Text file containing the digits
        #[arg(required = true)]
        input: PathBuf,

        /// Packed output file
        #[arg(required = true)]
        output: PathBuf,
    },
}
