//! Result file manager
//!
//! Provides a `CacheFile` that checks whether the result file already holds
//! today's prices and overwrites it with a fresh snapshot.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::{DayBoundary, PriceSnapshot};

/// Errors that can occur when reading or writing the result file
#[derive(Debug, Error)]
pub enum CacheError {
    /// Something other than a regular file sits at the path
    #[error("'{}' is not a file.", .0.display())]
    NotAFile(PathBuf),

    /// Reading, writing or inspecting the file failed
    #[error("'{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a price snapshot
    #[error("'{}': {}", .path.display(), .source)]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of checking the result file against today
#[derive(Debug)]
pub enum CacheStatus {
    /// The file holds a snapshot for today (or later)
    Valid,
    /// The file holds a snapshot from an earlier day
    Stale {
        /// The snapshot's stamp in epoch milliseconds
        time: f64,
    },
    /// The file could not be checked; treated as a cache miss
    Miss(CacheError),
}

impl CacheStatus {
    /// Whether the prices need to be fetched
    pub fn needs_fetch(&self) -> bool {
        !matches!(self, CacheStatus::Valid)
    }
}

/// Only the stamp is needed to decide validity
#[derive(Debug, Deserialize)]
struct StoredStamp {
    time: f64,
}

/// The single file a price snapshot is stored in
#[derive(Debug, Clone)]
pub struct CacheFile {
    /// Where the snapshot lives
    path: PathBuf,
}

impl CacheFile {
    /// Creates a CacheFile for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The result file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks whether the file holds a snapshot for `today`
    ///
    /// Only the snapshot's `time` field is inspected; it may be an integer
    /// or a float.
    ///
    /// # Arguments
    /// * `today` - Boundary of the current day
    ///
    /// # Returns
    /// * `Ok(CacheStatus)` - Valid, stale, or a miss carrying the reason
    /// * `Err(CacheError::NotAFile)` - If the path exists but is not a regular file
    pub fn check(&self, today: DayBoundary) -> Result<CacheStatus, CacheError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(source) => return Ok(CacheStatus::Miss(self.io_error(source))),
        };

        if !metadata.is_file() {
            return Err(CacheError::NotAFile(self.path.clone()));
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(source) => return Ok(CacheStatus::Miss(self.io_error(source))),
        };

        let stamp: StoredStamp = match serde_json::from_str(&content) {
            Ok(stamp) => stamp,
            Err(source) => return Ok(CacheStatus::Miss(self.malformed(source))),
        };

        if today.is_current(stamp.time) {
            Ok(CacheStatus::Valid)
        } else {
            Ok(CacheStatus::Stale { time: stamp.time })
        }
    }

    /// Reads the complete snapshot from the file
    pub fn read(&self) -> Result<PriceSnapshot, CacheError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(|e| self.malformed(e))
    }

    /// Writes the snapshot, replacing whatever the file held before
    ///
    /// The parent directory must already exist.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(CacheError)` if serializing or writing fails
    pub fn write(&self, snapshot: &PriceSnapshot) -> Result<(), CacheError> {
        let json = serde_json::to_string(snapshot).map_err(|e| self.malformed(e))?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn malformed(&self, source: serde_json::Error) -> CacheError {
        CacheError::Malformed {
            path: self.path.clone(),
            source,
        }
    }
}
