//! CLI module for dynquery
//!
//! Provides command-line interface for:
//! - parse: Validate query parameters and print the structured query
//! - compile: Validate, compile against an entity mapping and print SQL

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compile, parse, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
