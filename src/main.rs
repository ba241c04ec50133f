//! Tarkka Fetch - Store today's Fortum Tarkka hourly electricity prices
//!
//! Checks the result file given on the command line and, unless it already
//! holds today's prices, fetches them and overwrites the file. Meant to be
//! run periodically by an external scheduler such as cron.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tarkka_fetch::app::App;
use tarkka_fetch::cli::{Cli, CliError, StartupConfig, USAGE};

/// Sets up logging to stdout, filtered by `RUST_LOG` (default `info`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(CliError::MissingResultFile) => {
            println!("{}", USAGE);
            return ExitCode::from(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    init_tracing();

    // The pipeline logs its own failures
    match App::new(config).run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(e.exit_code()),
    }
}
