//! Binary crate for the `generate-chart` command-line tool.
//!
//! This crate focuses on:
//! - Parsing the nine positional birth-data arguments
//! - Driving the `natal-core` pipeline
//! - Mapping the outcome to stdout/stderr and the exit status

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cmd = cli::Cli::parse();

    match cmd.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}
