//! Error handling for the NICU episode pipeline.
//!
//! Only structurally invalid input is fatal. Everything the pipeline can
//! degrade around (missing reference sets, clipped discharges, malformed
//! episodes) is reported through data-quality counters instead.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors that abort a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum NicuError {
    /// A required claim field is absent
    #[error("Claim row {row} ({claim_key}): missing required field `{field}`")]
    MissingField {
        /// Zero-based row index in the claim stream
        row: usize,
        /// Claim key, or `<unknown>` when the key itself is missing
        claim_key: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// A claim date could not be interpreted
    #[error("Claim row {row} ({claim_key}): invalid date: {detail}")]
    InvalidDate {
        /// Zero-based row index in the claim stream
        row: usize,
        /// Claim key of the offending record
        claim_key: String,
        /// What was wrong with the date
        detail: String,
    },

    /// A claim amount is not a finite number
    #[error("Claim row {row} ({claim_key}): `{field}` is not a finite amount ({value})")]
    InvalidAmount {
        /// Zero-based row index in the claim stream
        row: usize,
        /// Claim key of the offending record
        claim_key: String,
        /// Name of the amount column
        field: &'static str,
        /// The value as read
        value: f64,
    },

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input columns do not match the fixed claim schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Conversion between records and Arrow batches failed
    #[error("Serialization error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// Reference tables could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error opening or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl NicuError {
    /// Build a missing-field error for a claim row
    #[must_use]
    pub fn missing_field(row: usize, claim_key: Option<&str>, field: &'static str) -> Self {
        Self::MissingField {
            row,
            claim_key: claim_key.unwrap_or("<unknown>").to_string(),
            field,
        }
    }

    /// Build an invalid-date error for a claim row
    #[must_use]
    pub fn invalid_date(row: usize, claim_key: &str, detail: impl Into<String>) -> Self {
        Self::InvalidDate {
            row,
            claim_key: claim_key.to_string(),
            detail: detail.into(),
        }
    }

    /// Build an invalid-amount error for a claim row
    #[must_use]
    pub fn invalid_amount(row: usize, claim_key: &str, field: &'static str, value: f64) -> Self {
        Self::InvalidAmount {
            row,
            claim_key: claim_key.to_string(),
            field,
            value,
        }
    }

    /// Whether this error points at a specific input record
    #[must_use]
    pub const fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidDate { .. } | Self::InvalidAmount { .. }
        )
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, NicuError>;
