//! Release notes CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use relnotes_cli::cli::Cli;
use relnotes_cli::commands;

fn main() {
    // Load .env.local / .env if present (for OPENAI_API_KEY etc.)
    relnotes_core::load_env();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
