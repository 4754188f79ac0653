//! Command-line interface for draw-solver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **search**: Run a pattern query over a draw history
//! - **history**: Summarize a draw history file
//!
//! ## Usage
//!
//! ```text
//! # Single-row search: 3 in the first cell, five wildcards
//! draw-solver search draws.csv --mode single-row --row "3,,,,,"
//!
//! # Knocking over three rows, diagonal logic, one game only
//! draw-solver search draws.csv --mode knocking --logic zebra \
//!     --row "22,41" --row "" --row "" --game-id 3
//!
//! # Query from a JSON file, JSON output for scripting
//! draw-solver search draws.json --query query.json --format json
//!
//! # Check what was loaded
//! draw-solver history draws.csv.gz
//! ```

use clap::{Parser, Subcommand};

pub mod history;
pub mod search;

#[derive(Parser)]
#[command(name = "draw-solver")]
#[command(version)]
#[command(about = "Search lottery draw histories for number patterns")]
#[command(
    long_about = "draw-solver scans a chronological history of lottery draws for recurring number patterns.\n\nSupported modes:\n- single-row, two-row, three-row: query rows against consecutive draws\n- lapping: numbers carried over between two consecutive draws\n- knocking: numbers recurring across three consecutive draws\n- pattern: success/machine co-occurrence per draw"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a draw history for a pattern
    Search(search::SearchArgs),

    /// Summarize a draw history
    History(history::HistoryArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
