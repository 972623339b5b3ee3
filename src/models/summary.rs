//! Cohort summary rows
//!
//! One row per cohort (overall and each study period). Ratios are `None`
//! when their denominator is zero and otherwise lie in [0, 100].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::newborn::StudyPeriod;

/// Cohort a summary row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cohort {
    Overall,
    Previous,
    Current,
}

impl Cohort {
    /// All cohorts in output order
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Overall, Self::Previous, Self::Current]
    }

    /// Whether a study period belongs to this cohort
    #[must_use]
    pub const fn includes(self, period: StudyPeriod) -> bool {
        matches!(
            (self, period),
            (Self::Overall, _)
                | (Self::Previous, StudyPeriod::Previous)
                | (Self::Current, StudyPeriod::Current)
        )
    }

    /// Get the display name for this cohort
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Overall => "Overall",
            Self::Previous => "Previous",
            Self::Current => "Current",
        }
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Aggregated metrics for one cohort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub cohort: Cohort,

    // Newborns
    pub newborn_count: u64,
    pub nicu_newborn_count: u64,
    pub normal_newborn_count: u64,
    pub nicu_rate_pct: Option<f64>,
    pub single_count: u64,
    pub twin_count: u64,
    pub multiple_count: u64,
    pub long_stay_count: u64,
    pub newborn_total_paid: f64,
    pub newborn_avg_los: Option<f64>,
    pub newborn_avg_paid: Option<f64>,

    // NICU episodes
    pub nicu_episode_count: u64,
    pub nicu_total_paid: f64,
    pub nicu_avg_paid: Option<f64>,
    pub nicu_median_paid: Option<f64>,
    pub nicu_min_paid: Option<f64>,
    pub nicu_max_paid: Option<f64>,
    pub nicu_avg_los: Option<f64>,
    pub nicu_median_los: Option<f64>,
    pub nicu_p90_los: Option<f64>,
    pub nicu_min_los: Option<f64>,
    pub nicu_max_los: Option<f64>,
    pub nicu_avg_cost_per_day: Option<f64>,
    pub total_professional_fee: f64,
    pub total_facility_cost: f64,
    pub total_room_and_board: f64,
    pub pct_professional_fees: Option<f64>,
    pub pct_room_and_board: Option<f64>,

    // Categories
    pub acuity_level1_count: u64,
    pub acuity_level2_count: u64,
    pub acuity_level3_count: u64,
    pub acuity_level4_count: u64,
    pub acuity_unknown_count: u64,
    pub revenue_leveling_count: u64,
    pub drg_contract_count: u64,
    pub per_diem_contract_count: u64,
    pub other_contract_count: u64,
    pub routine_discharge_count: u64,
    pub transfer_discharge_count: u64,
    pub expired_discharge_count: u64,
    pub other_discharge_count: u64,
    pub invalid_discharge_count: u64,

    // Appropriateness
    pub low_paid_count: u64,
    pub low_paid_pct: Option<f64>,
    pub inappropriate_count: u64,
    pub inappropriate_pct: Option<f64>,

    // Readmissions
    pub readmitted_newborn_count: u64,
    pub readmission_rate_pct: Option<f64>,
    pub readmission_event_count: u64,
    pub readmission_paid: f64,

    // Data quality
    pub null_diagnosis_rate_pct: Option<f64>,
    pub clipped_episode_count: u64,
    pub clipping_rate_pct: Option<f64>,
    pub provider_attribution_rate_pct: Option<f64>,
    pub facility_cost_anomaly_count: u64,
    /// Only populated on the overall row
    pub rejected_episode_count: Option<u64>,
    /// Only populated on the overall row
    pub malformed_episode_count: Option<u64>,
    /// Only populated on the overall row
    pub high_cost_claim_count: Option<u64>,
}
