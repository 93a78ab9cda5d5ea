//! Sauce Demo E2E CLI - Main Entry Point
//!
//! Runs the Sauce Demo browser suite (built-in scenarios or YAML cases)
//! through Playwright and writes `test-results.json`.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;
mod output;

use commands::{check, list, run};

/// Sauce Demo E2E - Rust-controlled browser suite
#[derive(Parser)]
#[command(name = "sauce-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the selected test cases
    Run(run::RunArgs),

    /// List the selected test cases without running them
    List(list::ListArgs),

    /// Check that the shop is reachable
    Check(check::CheckArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run::execute(args, cli.format).await,
        Commands::List(args) => list::execute(args, cli.format).map(|_| true),
        Commands::Check(args) => check::execute(args).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}
