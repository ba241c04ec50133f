//! Cache module for the result file
//!
//! The result file holds exactly one price snapshot. Before fetching, the
//! file is checked for a snapshot belonging to today; after fetching, it is
//! overwritten with the new snapshot. There is no locking: one writer, one
//! reader, one run at a time.

mod manager;

pub use manager::{CacheError, CacheFile, CacheStatus};
