//! Utility functions
//!
//! This module contains date handling, the Parquet boundary and logging helpers.

pub mod dates;
pub mod io;
pub mod logging;

pub use io::DEFAULT_BATCH_SIZE;
