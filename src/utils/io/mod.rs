//! IO utilities for the claim and output files
//!
//! This module provides the Arrow/Parquet boundary of the pipeline.

pub mod parquet;

// Re-export commonly used functions for convenience
pub use parquet::{
    DEFAULT_BATCH_SIZE, claims_from_batch, read_claims, records_to_batch, write_json,
    write_records,
};
