//! dynquery CLI entry point
//!
//! Installs logging on stderr, then delegates everything to `cli::run`.
//! stdout carries only the JSON response.

use dynquery::cli;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        error!(code = e.code_str(), "{}", e.message());
        std::process::exit(1);
    }
}
