//! Run pipeline for Tarkka Fetch
//!
//! One run is strictly sequential: check the result file, and unless it
//! already holds today's prices, fetch the price page, extract the prices
//! and overwrite the file. The day boundary and result file are captured
//! once when the `App` is built and threaded through every step.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cache::{CacheError, CacheFile, CacheStatus};
use crate::cli::StartupConfig;
use crate::data::{DayBoundary, FetchError, PriceSnapshot, TarkkaClient, HOURS_PER_DAY};

/// How a run that did its job ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The result file already held today's prices; nothing was fetched
    AlreadyCurrent,
    /// Prices were fetched and saved
    Saved(PriceSnapshot),
}

/// Errors that end a run
#[derive(Debug, Error)]
pub enum RunError {
    /// The result path exists but is not a regular file
    #[error(transparent)]
    NotAFile(CacheError),

    /// Fetching or parsing the price page failed
    #[error("Unable to fetch prices: {0}")]
    Fetch(#[from] FetchError),

    /// The snapshot could not be written
    #[error("Unable to save {0}")]
    Write(CacheError),
}

impl RunError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::NotAFile(_) | RunError::Fetch(_) | RunError::Write(_) => 1,
        }
    }
}

/// State for one run, built once at process start
#[derive(Debug, Clone)]
pub struct App {
    /// Where the snapshot is stored
    result_file: CacheFile,
    /// The day this run fetches prices for
    today: DayBoundary,
    /// Price page client
    client: TarkkaClient,
    /// Skip the cache check
    force: bool,
}

impl App {
    /// Creates an App for today from the startup configuration
    pub fn new(config: StartupConfig) -> Self {
        Self::with_day(config, DayBoundary::today())
    }

    /// Creates an App that treats `today` as the current day
    ///
    /// # Arguments
    /// * `config` - The startup configuration derived from CLI arguments
    /// * `today` - Boundary of the day to check and stamp snapshots with
    pub fn with_day(config: StartupConfig, today: DayBoundary) -> Self {
        Self {
            result_file: CacheFile::new(config.result_file),
            today,
            client: TarkkaClient::new().with_url(config.url),
            force: config.force,
        }
    }

    /// The result file path
    pub fn result_path(&self) -> PathBuf {
        self.result_file.path().to_path_buf()
    }

    /// Runs check, fetch, parse and write in order
    ///
    /// # Returns
    /// * `Ok(RunOutcome)` - Either nothing needed doing or prices were saved
    /// * `Err(RunError)` - The first step that failed
    pub async fn run(&self) -> Result<RunOutcome, RunError> {
        if !self.needs_fetch()? {
            info!(
                "Found valid data for today in '{}', nothing to do.",
                self.result_file.path().display()
            );
            return Ok(RunOutcome::AlreadyCurrent);
        }

        let prices = self.client.fetch_prices().await.map_err(|e| {
            error!("Unable to fetch prices from '{}': {}", self.client.url(), e);
            RunError::Fetch(e)
        })?;

        let snapshot = PriceSnapshot::new(self.today, prices);
        if !snapshot.is_complete() {
            warn!(
                count = snapshot.data.len(),
                expected = HOURS_PER_DAY,
                "Unexpected number of hourly prices"
            );
        }

        self.result_file.write(&snapshot).map_err(|e| {
            error!("Unable to save {}", e);
            RunError::Write(e)
        })?;

        info!(
            prices = snapshot.data.len(),
            "Saved '{}'",
            self.result_file.path().display()
        );
        Ok(RunOutcome::Saved(snapshot))
    }

    /// Decides whether the page must be fetched
    ///
    /// A result path that is not a regular file is fatal, even with --force.
    fn needs_fetch(&self) -> Result<bool, RunError> {
        let status = self.result_file.check(self.today).map_err(|e| {
            error!("{}", e);
            RunError::NotAFile(e)
        })?;

        if self.force {
            info!("Fetching regardless of cached data (--force)");
            return Ok(true);
        }

        match &status {
            CacheStatus::Valid => {}
            CacheStatus::Stale { time } => {
                info!(
                    cached_time = *time,
                    today = self.today.millis(),
                    "Data in '{}' is from an earlier day",
                    self.result_file.path().display()
                );
            }
            CacheStatus::Miss(reason) => {
                info!("Could not check {}", reason);
            }
        }

        Ok(status.needs_fetch())
    }
}
