//! Cost decomposition of a NICU episode

use rustc_hash::FxHashSet;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::models::claim::ClaimRecord;
use crate::models::nicu::ContractType;
use crate::models::tagged::TaggedClaim;

/// Professional, facility and room-and-board split of an episode's paid amount
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostBreakdown {
    pub total_paid: f64,
    pub professional_fee: f64,
    /// Total paid minus professional fee, within `[0, total_paid]`
    pub facility_cost: f64,
    /// Room and board on facility lines, never above the facility cost
    pub room_and_board: f64,
    pub facility_anomaly: bool,
    pub room_board_anomaly: bool,
    pub manageable_fee: f64,
    /// Distinct (service date, CPT) pairs billed as manageable services
    pub manageable_days: u32,
    pub critical_care_fee: f64,
    /// Distinct service dates billed as critical care
    pub critical_care_days: u32,
}

impl CostBreakdown {
    /// Decompose the paid amounts of an episode's claims
    #[must_use]
    pub fn from_claims(claims: &[Arc<TaggedClaim>], config: &PipelineConfig) -> Self {
        let mut breakdown = Self::default();
        let mut room_and_board = 0.0;
        let mut manageable = FxHashSet::default();
        let mut critical = FxHashSet::default();

        for tagged in claims {
            let claim = &tagged.claim;
            breakdown.total_paid += claim.paid_amount;
            breakdown.professional_fee += claim.professional_fee_amount();

            if !claim.is_professional() && is_room_and_board(claim, config) {
                room_and_board += claim.paid_amount;
            }
            if tagged.flags.manageable_cpt {
                breakdown.manageable_fee += claim.paid_amount;
                manageable.insert((claim.service_from, claim.cpt_code.clone()));
            }
            if tagged.flags.critical_care_cpt {
                breakdown.critical_care_fee += claim.paid_amount;
                critical.insert(claim.service_from);
            }
        }

        // A negative fee total would push the facility share above the total paid
        let facility = breakdown.total_paid - breakdown.professional_fee;
        breakdown.facility_anomaly = facility < 0.0 || breakdown.professional_fee < 0.0;
        breakdown.facility_cost = facility.clamp(0.0, breakdown.total_paid.max(0.0));
        breakdown.room_board_anomaly = room_and_board > breakdown.facility_cost;
        breakdown.room_and_board = room_and_board.clamp(0.0, breakdown.facility_cost);
        breakdown.manageable_days = u32::try_from(manageable.len()).unwrap_or(u32::MAX);
        breakdown.critical_care_days = u32::try_from(critical.len()).unwrap_or(u32::MAX);
        breakdown
    }
}

fn is_room_and_board(claim: &ClaimRecord, config: &PipelineConfig) -> bool {
    claim
        .revenue_code
        .as_deref()
        .is_some_and(|code| config.is_room_and_board(code))
}

/// Contract type implied by a single claim
#[must_use]
pub fn claim_contract_type(claim: &ClaimRecord, config: &PipelineConfig) -> ContractType {
    if claim.drg_code.is_some() {
        ContractType::Drg
    } else if !claim.is_professional() && is_room_and_board(claim, config) {
        ContractType::PerDiem
    } else {
        ContractType::Other
    }
}

/// Episode-wide contract type
#[must_use]
pub fn episode_contract_type(claims: &[Arc<TaggedClaim>], config: &PipelineConfig) -> ContractType {
    ContractType::resolve(claims.iter().map(|c| claim_contract_type(&c.claim, config)))
}
