//! Tarkka Fetch Library
//!
//! This module exposes the run pipeline and its parts for the binary and
//! for integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
