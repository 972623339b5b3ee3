//! NICU episode model and its classification categories

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::newborn::{BirthMultiplicity, StayType, StudyPeriod};

/// NICU acuity level, ordered from lowest to highest acuity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AcuityLevel {
    Level1,
    Level2,
    Level3,
    Level4,
}

impl AcuityLevel {
    /// Convert a numeric level (1-4)
    #[must_use]
    pub const fn from_u8(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Level1),
            2 => Some(Self::Level2),
            3 => Some(Self::Level3),
            4 => Some(Self::Level4),
            _ => None,
        }
    }

    /// Numeric level (1-4)
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Level1 => 1,
            Self::Level2 => 2,
            Self::Level3 => 3,
            Self::Level4 => 4,
        }
    }
}

impl fmt::Display for AcuityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}", self.as_u8())
    }
}

/// Payment arrangement of a NICU stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContractType {
    /// Paid by DRG
    Drg,
    /// Paid by daily room-and-board rate
    PerDiem,
    /// Anything else
    Other,
}

impl ContractType {
    /// Resolve an episode-wide contract type; DRG anywhere wins, then per-diem
    #[must_use]
    pub fn resolve<I: IntoIterator<Item = Self>>(claim_types: I) -> Self {
        claim_types.into_iter().min().unwrap_or(Self::Other)
    }

    /// Get the display name for this contract type
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Drg => "DRG",
            Self::PerDiem => "Per Diem",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Category of a UB-04 patient discharge status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DischargeDisposition {
    /// Discharged home, with or without home health care
    Routine,
    /// Transferred to another facility or level of care
    Transfer,
    /// Expired
    Expired,
    /// Left against advice, still a patient, or similar
    Other,
    /// Missing or unknown status code
    Invalid,
}

impl DischargeDisposition {
    /// Map a discharge status code to its category
    #[must_use]
    pub fn from_status_code(code: Option<&str>) -> Self {
        let Some(number) = code.and_then(|c| c.trim().parse::<u32>().ok()) else {
            return Self::Invalid;
        };
        match number {
            1 | 6 => Self::Routine,
            2..=5 | 43 | 61..=66 | 70 | 81..=95 => Self::Transfer,
            20 | 40..=42 => Self::Expired,
            7 | 9 | 21 | 30 | 50 | 51 | 69 => Self::Other,
            _ => Self::Invalid,
        }
    }

    /// Get the display name for this disposition
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Routine => "Routine",
            Self::Transfer => "Transfer",
            Self::Expired => "Expired",
            Self::Other => "Other",
            Self::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for DischargeDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A hospital episode with NICU evidence and its derived attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicuEpisode {
    pub individual_id: String,
    pub delivery_date: NaiveDate,
    pub episode_number: u32,
    pub admit: NaiveDate,
    pub discharge: NaiveDate,
    pub clipped_discharge: bool,
    pub los_days: u32,
    pub is_birth_stay: bool,
    pub study_period: StudyPeriod,
    pub multiplicity: BirthMultiplicity,
    pub claim_count: u32,

    pub nicu_by_revenue: bool,
    pub nicu_by_msdrg: bool,
    pub nicu_by_aprdrg: bool,
    /// Highest acuity band observed; none when only DRG evidence exists
    pub acuity_level: Option<AcuityLevel>,
    /// More than one distinct acuity band across claims
    pub revenue_leveling: bool,
    pub final_revenue_code: Option<u32>,
    pub final_drg_code: Option<u32>,
    pub contract_type: ContractType,

    pub total_paid: f64,
    pub professional_fee: f64,
    pub facility_cost: f64,
    pub room_and_board_cost: f64,
    pub pct_professional_fees: Option<f64>,
    pub cost_per_day: Option<f64>,
    /// Professional fees exceeded the total paid amount
    pub facility_cost_anomaly: bool,
    /// Room and board exceeded the facility cost
    pub room_board_anomaly: bool,
    pub manageable_fee: f64,
    pub manageable_days: u32,
    pub critical_care_fee: f64,
    pub critical_care_days: u32,

    pub discharge_status: Option<String>,
    pub disposition: DischargeDisposition,
    pub provider_npi: Option<String>,
    pub provider_tin: Option<String>,
    pub provider_name: Option<String>,
    pub provider_state: Option<String>,

    pub birthweight_category: Option<String>,
    pub gestational_age_category: Option<String>,
    pub nas: bool,
    pub stay_type: StayType,
    pub low_paid: bool,
    pub inappropriate: bool,

    /// Episode number of the episode this one is a readmission of
    pub readmission_of: Option<u32>,
    /// Episode number of the next readmission
    pub readmission_episode_number: Option<u32>,
    /// Days from discharge to the next readmission
    pub days_to_readmission: Option<i64>,
    pub readmission_count: u32,
    pub readmission_paid: f64,
    pub readmission_los_days: u32,
}
