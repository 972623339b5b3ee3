//! Configuration for the NICU episode pipeline.
//!
//! This module defines the business-rule thresholds and study dates used by
//! every stage of the pipeline, plus the derivation of a study window from the
//! service dates covered by a claims extract.

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

use crate::error::{NicuError, Result};

/// Minimum months of service dates needed to derive a study window
pub const MIN_MONTHS_REQUIRED: u32 = 24;
/// Length of the birth window in months
pub const BIRTH_WINDOW_MONTHS: u32 = 24;
/// Length of the claims run-out period in months
pub const RUN_OUT_MONTHS: u32 = 3;

/// Configuration for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum gap in days between a discharge and the next admission that
    /// still continues the same hospital stay
    pub gap_tolerance_days: i64,
    /// Window in days after a discharge in which a new admission counts as a readmission
    pub readmission_window_days: i64,
    /// Cost per LOS day below which a NICU episode is flagged as low-paid
    pub low_paid_cost_per_day: f64,
    /// Maximum LOS for which a DRG-contracted NICU episode is flagged as inappropriate
    pub inappropriate_max_los_days: u32,
    /// Deliveries before this date belong to the Previous period, all others to Current
    pub study_midpoint: NaiveDate,
    /// Latest date the claims extract reliably covers
    pub run_out_end: NaiveDate,
    /// Episodes admitted within this many days of delivery form the birth stay
    ///
    /// Episodes are already split on gaps above `gap_tolerance_days`, so a
    /// second birth-stay episode only appears when this window is wider.
    pub initial_stay_window_days: i64,
    /// Claims paid above this amount are excluded from stitching
    pub high_cost_claim_threshold: Option<f64>,
    /// Minimum LOS for a stay to be classified as a long stay
    pub long_stay_min_days: u32,
    /// When non-empty, the inappropriate flag also requires the final NICU revenue code to be listed
    pub inappropriate_revenue_codes: Vec<u32>,
    /// Three-character revenue code prefixes billed as room and board
    pub room_board_prefixes: Vec<String>,
    /// Number of worker threads for the per-individual pass
    pub worker_threads: usize,
    /// Whether to draw a progress bar for the per-individual pass
    pub show_progress: bool,
}

impl PipelineConfig {
    /// Create a configuration with default thresholds for the given study dates
    #[must_use]
    pub fn new(study_midpoint: NaiveDate, run_out_end: NaiveDate) -> Self {
        Self {
            gap_tolerance_days: 4,
            readmission_window_days: 30,
            low_paid_cost_per_day: 150.0,
            inappropriate_max_los_days: 5,
            study_midpoint,
            run_out_end,
            initial_stay_window_days: 4,
            high_cost_claim_threshold: Some(500_000.0),
            long_stay_min_days: 3,
            inappropriate_revenue_codes: Vec::new(),
            room_board_prefixes: ["011", "012", "013", "014", "015", "016", "017", "020"]
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            worker_threads: num_cpus::get(),
            show_progress: false,
        }
    }

    /// Create a configuration from a derived study window
    #[must_use]
    pub fn from_window(window: &StudyWindow) -> Self {
        Self::new(window.midpoint, window.run_out_end)
    }

    /// Set the gap tolerance used when stitching claims into episodes
    #[must_use]
    pub const fn with_gap_tolerance_days(mut self, days: i64) -> Self {
        self.gap_tolerance_days = days;
        self
    }

    /// Set the window after delivery within which episodes form the birth stay
    #[must_use]
    pub const fn with_initial_stay_window_days(mut self, days: i64) -> Self {
        self.initial_stay_window_days = days;
        self
    }

    /// Set the readmission window
    #[must_use]
    pub const fn with_readmission_window_days(mut self, days: i64) -> Self {
        self.readmission_window_days = days;
        self
    }

    /// Set the low-paid cost-per-day threshold
    #[must_use]
    pub const fn with_low_paid_cost_per_day(mut self, amount: f64) -> Self {
        self.low_paid_cost_per_day = amount;
        self
    }

    /// Set the inappropriate-admission LOS threshold
    #[must_use]
    pub const fn with_inappropriate_max_los_days(mut self, days: u32) -> Self {
        self.inappropriate_max_los_days = days;
        self
    }

    /// Set or disable the high-cost claim exclusion
    #[must_use]
    pub const fn with_high_cost_claim_threshold(mut self, threshold: Option<f64>) -> Self {
        self.high_cost_claim_threshold = threshold;
        self
    }

    /// Restrict the inappropriate flag to episodes ending on these NICU revenue codes
    #[must_use]
    pub fn with_inappropriate_revenue_codes(mut self, codes: Vec<u32>) -> Self {
        self.inappropriate_revenue_codes = codes;
        self
    }

    /// Set the number of worker threads
    #[must_use]
    pub const fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Enable or disable the progress bar
    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Check that the thresholds are usable
    pub fn validate(&self) -> Result<()> {
        if self.run_out_end < self.study_midpoint {
            return Err(NicuError::InvalidConfig(format!(
                "run-out end {} precedes the study midpoint {}",
                self.run_out_end, self.study_midpoint
            )));
        }
        if self.gap_tolerance_days < 0 {
            return Err(NicuError::InvalidConfig(format!(
                "gap tolerance must be non-negative, got {}",
                self.gap_tolerance_days
            )));
        }
        if self.readmission_window_days < 1 {
            return Err(NicuError::InvalidConfig(format!(
                "readmission window must be at least one day, got {}",
                self.readmission_window_days
            )));
        }
        if self.initial_stay_window_days < 0 {
            return Err(NicuError::InvalidConfig(format!(
                "initial stay window must be non-negative, got {}",
                self.initial_stay_window_days
            )));
        }
        if !self.low_paid_cost_per_day.is_finite() || self.low_paid_cost_per_day < 0.0 {
            return Err(NicuError::InvalidConfig(format!(
                "low-paid threshold must be a non-negative amount, got {}",
                self.low_paid_cost_per_day
            )));
        }
        if let Some(threshold) = self.high_cost_claim_threshold {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(NicuError::InvalidConfig(format!(
                    "high-cost threshold must be positive, got {threshold}"
                )));
            }
        }
        if self.worker_threads == 0 {
            return Err(NicuError::InvalidConfig(
                "worker thread count must be positive".to_string(),
            ));
        }
        if let Some(prefix) = self.room_board_prefixes.iter().find(|p| p.len() != 3) {
            return Err(NicuError::InvalidConfig(format!(
                "room and board prefix `{prefix}` must be three characters"
            )));
        }
        Ok(())
    }

    /// Check whether a revenue code is billed as room and board
    #[must_use]
    pub fn is_room_and_board(&self, revenue_code: &str) -> bool {
        let code = revenue_code.trim();
        // Three-digit codes are stored without their leading zero in some extracts
        let padded;
        let code = if code.len() == 3 {
            padded = format!("0{code}");
            padded.as_str()
        } else {
            code
        };
        code.len() >= 3 && self.room_board_prefixes.iter().any(|p| code.starts_with(p.as_str()))
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Study Midpoint: {}", self.study_midpoint)?;
        writeln!(f, "  Run-out End: {}", self.run_out_end)?;
        writeln!(f, "  Gap Tolerance: {} days", self.gap_tolerance_days)?;
        writeln!(f, "  Readmission Window: {} days", self.readmission_window_days)?;
        writeln!(f, "  Initial Stay Window: {} days", self.initial_stay_window_days)?;
        writeln!(f, "  Low-paid Threshold: ${:.2}/day", self.low_paid_cost_per_day)?;
        writeln!(
            f,
            "  Inappropriate Max LOS: {} days",
            self.inappropriate_max_los_days
        )?;
        if let Some(threshold) = self.high_cost_claim_threshold {
            writeln!(f, "  High-cost Claim Threshold: ${threshold:.2}")?;
        }
        writeln!(f, "  Worker Threads: {}", self.worker_threads)?;
        Ok(())
    }
}

/// Birth window, study midpoint and run-out boundary for one extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyWindow {
    /// First delivery date in scope
    pub birth_start: NaiveDate,
    /// Last delivery date in scope
    pub birth_end: NaiveDate,
    /// Boundary between the Previous and Current periods
    pub midpoint: NaiveDate,
    /// Last day of claims run-out
    pub run_out_end: NaiveDate,
}

impl StudyWindow {
    /// Derive the study window from the earliest and latest service dates of an extract
    ///
    /// The run-out ends on the last complete month before the latest service
    /// date. The birth window is the 24 months ending the day before the
    /// 3-month run-out period begins.
    pub fn from_service_dates(min_service: NaiveDate, max_service: NaiveDate) -> Result<Self> {
        if max_service < min_service {
            return Err(NicuError::InvalidConfig(format!(
                "service date range is inverted: {min_service} > {max_service}"
            )));
        }

        let months = (max_service.year() - min_service.year()) * 12
            + max_service.month() as i32
            - min_service.month() as i32
            + 1;
        if months < MIN_MONTHS_REQUIRED as i32 {
            return Err(NicuError::InvalidConfig(format!(
                "only {months} months of service dates available, {MIN_MONTHS_REQUIRED} required"
            )));
        }

        let out_of_range =
            || NicuError::InvalidConfig("study window falls outside the calendar".to_string());

        let run_out_end = max_service
            .with_day(1)
            .and_then(|d| d.pred_opt())
            .ok_or_else(out_of_range)?;
        let run_out_start = run_out_end
            .checked_sub_months(Months::new(RUN_OUT_MONTHS))
            .and_then(|d| d.succ_opt())
            .ok_or_else(out_of_range)?;
        let birth_end = run_out_start.pred_opt().ok_or_else(out_of_range)?;
        let birth_start = birth_end
            .checked_sub_months(Months::new(BIRTH_WINDOW_MONTHS))
            .and_then(|d| d.succ_opt())
            .ok_or_else(out_of_range)?;
        let midpoint = birth_start
            .checked_add_months(Months::new(BIRTH_WINDOW_MONTHS / 2))
            .ok_or_else(out_of_range)?;

        Ok(Self {
            birth_start,
            birth_end,
            midpoint,
            run_out_end,
        })
    }

    /// Check whether a delivery date falls inside the birth window (inclusive)
    #[must_use]
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.birth_start && *date <= self.birth_end
    }
}

impl fmt::Display for StudyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "births {} to {} (midpoint {}), run-out to {}",
            self.birth_start, self.birth_end, self.midpoint, self.run_out_end
        )
    }
}
