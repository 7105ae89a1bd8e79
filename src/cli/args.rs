//! CLI argument definitions using clap
//!
//! Commands:
//! - dynquery parse
//! - dynquery compile --config <path> --entity <name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dynquery - text query parameters to validated, compiled queries
#[derive(Parser, Debug)]
#[command(name = "dynquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read query parameters from stdin and print the validated query
    Parse,

    /// Read query parameters from stdin and print the compiled SQL
    Compile {
        /// Path to the entity mapping file
        #[arg(long, default_value = "./mappings.json")]
        config: PathBuf,

        /// Entity the query targets
        #[arg(long)]
        entity: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
