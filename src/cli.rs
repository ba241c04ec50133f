//! Command-line interface parsing for Tarkka Fetch
//!
//! This module handles parsing of CLI arguments using clap. The result file
//! is a positional argument that clap treats as optional so that a missing
//! path prints the usage text and exits with status 1 instead of clap's own
//! error.

use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;
use thiserror::Error;

use crate::data::DEFAULT_PRICES_URL;

/// Usage text printed when no result file is given
pub const USAGE: &str = "Usage: tarkka-fetch resultFile

resultFile is the full filesystem path to store results to.

This program fetches latest 'Tarkka' hourly prices
and stores them locally once per day.
";

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// No result file path was given
    #[error("Missing result file path")]
    MissingResultFile,

    /// The --url value is not an absolute http(s) URL
    #[error("Invalid URL: '{0}'")]
    InvalidUrl(String),
}

/// Tarkka Fetch - Store today's Fortum Tarkka hourly prices once per day
#[derive(Parser, Debug)]
#[command(name = "tarkka-fetch")]
#[command(about = "Fetch today's Fortum Tarkka hourly prices into a file, once per day")]
#[command(version)]
pub struct Cli {
    /// Full filesystem path to store results to
    #[arg(value_name = "RESULT_FILE")]
    pub result_file: Option<PathBuf>,

    /// Price page to fetch instead of the public Tarkka page
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Fetch even if the result file already holds today's prices
    #[arg(long)]
    pub force: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Where the snapshot is stored
    pub result_file: PathBuf,
    /// Page the prices are fetched from
    pub url: String,
    /// Skip the cache check
    pub force: bool,
}

/// Checks that a --url value is an absolute http or https URL
///
/// # Arguments
/// * `s` - The URL string from CLI
///
/// # Returns
/// * `Ok(String)` with the URL unchanged
/// * `Err(CliError::InvalidUrl)` if it cannot be parsed or uses another scheme
pub fn parse_url_arg(s: &str) -> Result<String, CliError> {
    match Url::parse(s) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(s.to_string()),
        _ => Err(CliError::InvalidUrl(s.to_string())),
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the result file and page to use
    /// * `Err(CliError)` if the result file is missing or --url is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let result_file = cli
            .result_file
            .clone()
            .ok_or(CliError::MissingResultFile)?;

        let url = match &cli.url {
            Some(url) => parse_url_arg(url)?,
            None => DEFAULT_PRICES_URL.to_string(),
        };

        Ok(StartupConfig {
            result_file,
            url,
            force: cli.force,
        })
    }
}
