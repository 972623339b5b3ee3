//! Newborn identity model and its classification categories
//!
//! Every category here is a closed enumeration so that each newborn resolves
//! to exactly one value per dimension.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::tagged::EvidenceFlags;

/// Birth multiplicity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BirthMultiplicity {
    /// Singleton birth, the fallback when no rule gives a verdict
    #[default]
    Single,
    /// Exactly two
    Twin,
    /// Three or more
    Multiple,
}

impl BirthMultiplicity {
    /// Get the display name for this category
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Twin => "Twin",
            Self::Multiple => "Multiple",
        }
    }
}

impl fmt::Display for BirthMultiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Whether a newborn had NICU care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BabyType {
    Normal,
    Nicu,
}

impl BabyType {
    /// NICU when any of the three NICU evidence sources is present
    #[must_use]
    pub const fn from_evidence(evidence: &EvidenceFlags) -> Self {
        if evidence.has_nicu_evidence() {
            Self::Nicu
        } else {
            Self::Normal
        }
    }

    /// Get the display name for this baby type
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Nicu => "NICU",
        }
    }
}

impl fmt::Display for BabyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Study period a delivery falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StudyPeriod {
    Previous,
    Current,
}

impl StudyPeriod {
    /// Deliveries on the midpoint belong to the Current period
    #[must_use]
    pub fn from_delivery(delivery_date: NaiveDate, midpoint: NaiveDate) -> Self {
        if delivery_date < midpoint {
            Self::Previous
        } else {
            Self::Current
        }
    }

    /// Get the display name for this period
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Previous => "Previous",
            Self::Current => "Current",
        }
    }
}

impl fmt::Display for StudyPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Length-of-stay class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StayType {
    ShortStay,
    LongStay,
}

impl StayType {
    /// Long stay when LOS reaches the configured minimum
    #[must_use]
    pub const fn from_los(los_days: u32, long_stay_min_days: u32) -> Self {
        if los_days >= long_stay_min_days {
            Self::LongStay
        } else {
            Self::ShortStay
        }
    }

    /// Get the display name for this stay type
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ShortStay => "Short Stay",
            Self::LongStay => "Long Stay",
        }
    }
}

impl fmt::Display for StayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One row per (individual, delivery date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewbornIdentity {
    /// Individual identifier
    pub individual_id: String,
    /// Delivery (birth) date
    pub delivery_date: NaiveDate,
    /// Birth multiplicity
    pub multiplicity: BirthMultiplicity,
    /// Normal or NICU
    pub baby_type: BabyType,
    /// Previous or Current
    pub study_period: StudyPeriod,
    /// Admission of the birth hospitalisation
    pub birth_admit: NaiveDate,
    /// Discharge of the birth hospitalisation
    pub birth_discharge: NaiveDate,
    /// Short or long birth stay
    pub stay_type: StayType,
    /// LOS of the birth hospitalisation
    pub total_los_days: u32,
    /// Paid amount of the birth hospitalisation
    pub total_paid: f64,
    /// Number of valid episodes for the newborn
    pub episode_count: u32,
    /// Number of NICU episodes for the newborn
    pub nicu_episode_count: u32,
    /// Any birth-stay discharge was clipped to the run-out boundary
    pub clipped_discharge: bool,
    /// Whether the birth hospitalisation was followed by a readmission
    pub has_readmission: bool,
    /// Length of the readmission chain from the first episode
    pub readmission_count: u32,
    /// Paid amount across the readmission chain
    pub readmission_paid: f64,
    /// LOS across the readmission chain
    pub readmission_los_days: u32,
}
