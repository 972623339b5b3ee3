//! Hospital episode model
//!
//! An episode is a maximal run of gap-tolerant adjacent inpatient/emergency
//! claims for one individual. Episodes for the same individual never overlap
//! and are numbered in admission order starting at 1.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::models::newborn::BabyType;
use crate::models::tagged::{EvidenceFlags, TaggedClaim};
use crate::utils::dates::length_of_stay;

/// A stitched hospital stay
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalEpisode {
    /// Individual the episode belongs to
    pub individual_id: String,
    /// Delivery date of the newborn
    pub delivery_date: NaiveDate,
    /// 1-based episode number within the individual
    pub episode_number: u32,
    /// Admission date
    pub admit: NaiveDate,
    /// Discharge date, clipped to the run-out boundary
    pub discharge: NaiveDate,
    /// Discharge date before clipping
    pub original_discharge: NaiveDate,
    /// Whether the discharge date was clipped
    pub clipped_discharge: bool,
    /// Length of stay from the clipped discharge (always >= 1)
    pub los_days: u32,
    /// Constituent claims in stitching order
    pub claims: Vec<Arc<TaggedClaim>>,
    /// Sum of paid amounts
    pub total_paid: f64,
    /// Union of the claims' evidence flags
    pub evidence: EvidenceFlags,
    /// Whether the episode is part of the birth hospitalisation
    pub is_birth_stay: bool,
}

impl HospitalEpisode {
    /// Keys of the constituent claims
    #[must_use]
    pub fn claim_keys(&self) -> Vec<String> {
        self.claims.iter().map(|c| c.claim_key().to_string()).collect()
    }

    /// Baby type implied by this episode's evidence
    #[must_use]
    pub const fn baby_type(&self) -> BabyType {
        BabyType::from_evidence(&self.evidence)
    }

    /// Length of stay before clipping, for audit only
    #[must_use]
    pub fn unclipped_los_days(&self) -> u32 {
        length_of_stay(self.admit, self.original_discharge).unwrap_or(self.los_days)
    }
}

/// Why an episode was rejected by the stitcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// Discharge date precedes admission date
    MalformedDates,
    /// Admitted after the run-out boundary
    AdmittedAfterRunOut,
}

impl RejectionReason {
    /// Get the display name for this reason
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MalformedDates => "Malformed Dates",
            Self::AdmittedAfterRunOut => "Admitted After Run-out",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// An episode excluded from LOS-based metrics, kept for audit counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedEpisode {
    pub individual_id: String,
    pub admit: NaiveDate,
    pub discharge: NaiveDate,
    pub claim_keys: Vec<String>,
    pub total_paid: f64,
    pub reason: RejectionReason,
}
