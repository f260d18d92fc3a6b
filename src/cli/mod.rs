//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "sw",
    version,
    about = "Compose reusable skill documents into role-specific agent prompts",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Machine-readable JSON output (same as --format json)
    #[arg(long, global = true)]
    pub robot: bool,

    /// Output format
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Explicit path to the project config
    #[arg(long, global = true, env = "SW_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            self.format.unwrap_or(OutputFormat::Human)
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Human,
    Json,
    Jsonl,
    Plain,
    Tsv,
}
