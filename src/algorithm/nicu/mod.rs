//! NICU episode derivation
//!
//! For every hospital episode with NICU evidence, derives acuity, contract
//! type, the cost split, discharge disposition, attribution and the
//! appropriateness flags.

pub mod acuity;
pub mod appropriateness;
pub mod costs;
pub mod provider;

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::models::episode::HospitalEpisode;
use crate::models::newborn::{BabyType, NewbornIdentity, StayType};
use crate::models::nicu::{DischargeDisposition, NicuEpisode};
use crate::models::tagged::TaggedClaim;
use crate::reference::{ReferenceIndex, normalize_code};

pub use acuity::{AcuityProfile, derive_acuity, final_nicu_drg};
pub use appropriateness::{cost_per_day, is_inappropriate, is_low_paid};
pub use costs::{CostBreakdown, claim_contract_type, episode_contract_type};
pub use provider::attribute_provider;

/// Neonatal abstinence syndrome diagnosis
pub const NAS_DIAGNOSIS: &str = "P961";

/// Builds NICU episode rows
#[derive(Debug, Clone, Copy)]
pub struct NicuEpisodeBuilder<'a> {
    reference: &'a ReferenceIndex,
    config: &'a PipelineConfig,
}

impl<'a> NicuEpisodeBuilder<'a> {
    /// Create a builder
    #[must_use]
    pub const fn new(reference: &'a ReferenceIndex, config: &'a PipelineConfig) -> Self {
        Self { reference, config }
    }

    /// Build NICU rows for a newborn's NICU episodes, in episode order
    #[must_use]
    pub fn build_all(
        &self,
        episodes: &[HospitalEpisode],
        newborn: &NewbornIdentity,
    ) -> Vec<NicuEpisode> {
        episodes
            .iter()
            .filter(|e| e.baby_type() == BabyType::Nicu)
            .map(|e| self.build(e, newborn))
            .collect()
    }

    /// Build the NICU row for one episode
    #[must_use]
    pub fn build(&self, episode: &HospitalEpisode, newborn: &NewbornIdentity) -> NicuEpisode {
        let claims = episode.claims.as_slice();
        let acuity = derive_acuity(claims, self.reference);
        let costs = CostBreakdown::from_claims(claims, self.config);
        let contract_type = episode_contract_type(claims, self.config);
        let discharge_status = final_discharge_status(claims);
        let provider = attribute_provider(claims).unwrap_or_default();
        let per_day = cost_per_day(costs.total_paid, episode.los_days);

        NicuEpisode {
            individual_id: episode.individual_id.clone(),
            delivery_date: episode.delivery_date,
            episode_number: episode.episode_number,
            admit: episode.admit,
            discharge: episode.discharge,
            clipped_discharge: episode.clipped_discharge,
            los_days: episode.los_days,
            is_birth_stay: episode.is_birth_stay,
            study_period: newborn.study_period,
            multiplicity: newborn.multiplicity,
            claim_count: u32::try_from(claims.len()).unwrap_or(u32::MAX),

            nicu_by_revenue: episode.evidence.nicu_revenue,
            nicu_by_msdrg: episode.evidence.nicu_msdrg,
            nicu_by_aprdrg: episode.evidence.nicu_aprdrg,
            acuity_level: acuity.level,
            revenue_leveling: acuity.leveling,
            final_revenue_code: acuity.final_revenue_code,
            final_drg_code: final_nicu_drg(claims, self.reference),
            contract_type,

            total_paid: costs.total_paid,
            professional_fee: costs.professional_fee,
            facility_cost: costs.facility_cost,
            room_and_board_cost: costs.room_and_board,
            pct_professional_fees: crate::algorithm::metrics::share_pct(
                costs.professional_fee,
                costs.total_paid,
            ),
            cost_per_day: per_day,
            facility_cost_anomaly: costs.facility_anomaly,
            room_board_anomaly: costs.room_board_anomaly,
            manageable_fee: costs.manageable_fee,
            manageable_days: costs.manageable_days,
            critical_care_fee: costs.critical_care_fee,
            critical_care_days: costs.critical_care_days,

            disposition: DischargeDisposition::from_status_code(discharge_status.as_deref()),
            discharge_status,
            provider_npi: provider.npi,
            provider_tin: provider.tin,
            provider_name: provider.name,
            provider_state: provider.state,

            birthweight_category: self.lowest_category(claims, |r, code| {
                r.birthweight_category(code)
            }),
            gestational_age_category: self.lowest_category(claims, |r, code| {
                r.gestational_age_category(code)
            }),
            nas: claims.iter().any(|c| {
                c.claim
                    .diagnosis_codes
                    .iter()
                    .any(|code| normalize_code(code) == NAS_DIAGNOSIS)
            }),
            stay_type: StayType::from_los(episode.los_days, self.config.long_stay_min_days),
            low_paid: is_low_paid(per_day, self.config),
            inappropriate: is_inappropriate(
                contract_type,
                episode.los_days,
                acuity.final_revenue_code,
                self.config,
            ),

            readmission_of: None,
            readmission_episode_number: None,
            days_to_readmission: None,
            readmission_count: 0,
            readmission_paid: 0.0,
            readmission_los_days: 0,
        }
    }

    fn lowest_category<F>(&self, claims: &[Arc<TaggedClaim>], lookup: F) -> Option<String>
    where
        F: for<'r> Fn(&'r ReferenceIndex, &str) -> Option<&'r str>,
    {
        claims
            .iter()
            .flat_map(|c| c.claim.diagnosis_codes.iter())
            .filter_map(|code| lookup(self.reference, code))
            .min()
            .map(str::to_string)
    }
}

/// Discharge status of the last claim carrying one
///
/// Claims are ordered by discharge, then service start, then claim key.
#[must_use]
pub fn final_discharge_status(claims: &[Arc<TaggedClaim>]) -> Option<String> {
    claims
        .iter()
        .filter(|c| c.claim.discharge_status.is_some())
        .max_by(|a, b| {
            a.claim
                .effective_discharge()
                .cmp(&b.claim.effective_discharge())
                .then(a.claim.service_from.cmp(&b.claim.service_from))
                .then(a.claim_key().cmp(b.claim_key()))
        })
        .and_then(|c| c.claim.discharge_status.clone())
}
