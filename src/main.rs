//! Logcheck CLI entry point.

use clap::Parser;
use logcheck::cli::{self, Cli, Commands, EXIT_ERROR};
use std::io;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("logcheck={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Extract(args) => cli::run_extract(args),
        Commands::Recommend(args) => cli::run_recommend(args),
        Commands::Init(args) => cli::run_init(args),
    };
    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
