//! Cohort metrics
//!
//! Aggregates newborns, NICU episodes and data-quality counters into one
//! summary row per cohort (overall, Previous, Current). Every ratio is guarded
//! against a zero denominator and clamped to [0, 100].

pub mod statistics;

use log::info;

use crate::algorithm::tagging::TaggingReport;
use crate::config::PipelineConfig;
use crate::models::episode::{HospitalEpisode, RejectedEpisode, RejectionReason};
use crate::models::newborn::{BabyType, BirthMultiplicity, StayType, StudyPeriod};
use crate::models::nicu::{AcuityLevel, ContractType, DischargeDisposition, NicuEpisode};
use crate::models::summary::{Cohort, CohortSummary};
use crate::models::NewbornIdentity;

pub use statistics::{SummaryStats, percentile};

/// Percentage of a count, `None` when the total is zero
#[must_use]
pub fn percentage(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(((part as f64 * 100.0) / whole as f64).clamp(0.0, 100.0))
    }
}

/// Percentage share of an amount, `None` when the total is not positive
#[must_use]
pub fn share_pct(part: f64, whole: f64) -> Option<f64> {
    if whole > 0.0 && part.is_finite() && whole.is_finite() {
        Some(((part * 100.0) / whole).clamp(0.0, 100.0))
    } else {
        None
    }
}

fn count<T>(items: &[&T], predicate: impl Fn(&T) -> bool) -> u64 {
    items.iter().filter(|item| predicate(**item)).count() as u64
}

/// Input collections for the aggregator
#[derive(Debug, Clone, Copy)]
pub struct MetricsInput<'a> {
    pub newborns: &'a [NewbornIdentity],
    pub nicu_episodes: &'a [NicuEpisode],
    pub episodes: &'a [HospitalEpisode],
    pub rejected: &'a [RejectedEpisode],
    pub tagging: &'a TaggingReport,
}

/// Builds cohort summary rows
#[derive(Debug, Clone, Copy)]
pub struct MetricsAggregator<'a> {
    config: &'a PipelineConfig,
}

impl<'a> MetricsAggregator<'a> {
    /// Create an aggregator
    #[must_use]
    pub const fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Summarise every cohort, overall first
    #[must_use]
    pub fn summarize(&self, input: &MetricsInput<'_>) -> Vec<CohortSummary> {
        let rows: Vec<CohortSummary> = Cohort::all()
            .into_iter()
            .map(|cohort| self.summarize_cohort(cohort, input))
            .collect();
        for row in &rows {
            info!(
                "{} cohort: {} newborns, {} NICU episodes, NICU rate {}",
                row.cohort,
                row.newborn_count,
                row.nicu_episode_count,
                row.nicu_rate_pct
                    .map_or_else(|| "n/a".to_string(), |pct| format!("{pct:.1}%"))
            );
        }
        rows
    }

    /// Summarise one cohort
    #[must_use]
    pub fn summarize_cohort(&self, cohort: Cohort, input: &MetricsInput<'_>) -> CohortSummary {
        let midpoint = self.config.study_midpoint;
        let newborns: Vec<&NewbornIdentity> = input
            .newborns
            .iter()
            .filter(|n| cohort.includes(n.study_period))
            .collect();
        let nicu: Vec<&NicuEpisode> = input
            .nicu_episodes
            .iter()
            .filter(|e| cohort.includes(e.study_period))
            .collect();
        let episodes: Vec<&HospitalEpisode> = input
            .episodes
            .iter()
            .filter(|e| cohort.includes(StudyPeriod::from_delivery(e.delivery_date, midpoint)))
            .collect();

        let newborn_count = newborns.len();
        let nicu_newborns = count(&newborns, |n| n.baby_type == BabyType::Nicu);
        let readmitted = count(&newborns, |n| n.has_readmission);
        let newborn_los = SummaryStats::from_values(newborns.iter().map(|n| f64::from(n.total_los_days)));
        let newborn_paid = SummaryStats::from_values(newborns.iter().map(|n| n.total_paid));

        let nicu_paid = SummaryStats::from_values(nicu.iter().map(|e| e.total_paid));
        let nicu_los = SummaryStats::from_values(nicu.iter().map(|e| f64::from(e.los_days)));
        let cost_per_day = SummaryStats::from_values(nicu.iter().filter_map(|e| e.cost_per_day));
        let total_paid: f64 = nicu.iter().map(|e| e.total_paid).sum();
        let professional: f64 = nicu.iter().map(|e| e.professional_fee).sum();
        let facility: f64 = nicu.iter().map(|e| e.facility_cost).sum();
        let room_and_board: f64 = nicu.iter().map(|e| e.room_and_board_cost).sum();
        let low_paid = count(&nicu, |e| e.low_paid);
        let inappropriate = count(&nicu, |e| e.inappropriate);
        let attributed = count(&nicu, |e| e.provider_npi.is_some());

        let claim_total: usize = episodes.iter().map(|e| e.claims.len()).sum();
        let null_diagnosis: usize = episodes
            .iter()
            .flat_map(|e| e.claims.iter())
            .filter(|c| !c.claim.has_diagnosis())
            .count();
        let clipped = count(&episodes, |e| e.clipped_discharge);

        let overall = cohort == Cohort::Overall;
        let acuity = |level: AcuityLevel| count(&nicu, |e| e.acuity_level == Some(level));
        let contract = |kind: ContractType| count(&nicu, |e| e.contract_type == kind);
        let disposition = |kind: DischargeDisposition| count(&nicu, |e| e.disposition == kind);

        CohortSummary {
            cohort,

            newborn_count: newborn_count as u64,
            nicu_newborn_count: nicu_newborns,
            normal_newborn_count: newborn_count as u64 - nicu_newborns,
            nicu_rate_pct: percentage(nicu_newborns as usize, newborn_count),
            single_count: count(&newborns, |n| n.multiplicity == BirthMultiplicity::Single),
            twin_count: count(&newborns, |n| n.multiplicity == BirthMultiplicity::Twin),
            multiple_count: count(&newborns, |n| n.multiplicity == BirthMultiplicity::Multiple),
            long_stay_count: count(&newborns, |n| n.stay_type == StayType::LongStay),
            newborn_total_paid: newborn_paid.map_or(0.0, |s| s.sum),
            newborn_avg_los: newborn_los.map(|s| s.mean),
            newborn_avg_paid: newborn_paid.map(|s| s.mean),

            nicu_episode_count: nicu.len() as u64,
            nicu_total_paid: total_paid,
            nicu_avg_paid: nicu_paid.map(|s| s.mean),
            nicu_median_paid: nicu_paid.map(|s| s.median),
            nicu_min_paid: nicu_paid.map(|s| s.min),
            nicu_max_paid: nicu_paid.map(|s| s.max),
            nicu_avg_los: nicu_los.map(|s| s.mean),
            nicu_median_los: nicu_los.map(|s| s.median),
            nicu_p90_los: nicu_los.map(|s| s.p90),
            nicu_min_los: nicu_los.map(|s| s.min),
            nicu_max_los: nicu_los.map(|s| s.max),
            nicu_avg_cost_per_day: cost_per_day.map(|s| s.mean),
            total_professional_fee: professional,
            total_facility_cost: facility,
            total_room_and_board: room_and_board,
            pct_professional_fees: share_pct(professional, total_paid),
            pct_room_and_board: share_pct(room_and_board, facility),

            acuity_level1_count: acuity(AcuityLevel::Level1),
            acuity_level2_count: acuity(AcuityLevel::Level2),
            acuity_level3_count: acuity(AcuityLevel::Level3),
            acuity_level4_count: acuity(AcuityLevel::Level4),
            acuity_unknown_count: count(&nicu, |e| e.acuity_level.is_none()),
            revenue_leveling_count: count(&nicu, |e| e.revenue_leveling),
            drg_contract_count: contract(ContractType::Drg),
            per_diem_contract_count: contract(ContractType::PerDiem),
            other_contract_count: contract(ContractType::Other),
            routine_discharge_count: disposition(DischargeDisposition::Routine),
            transfer_discharge_count: disposition(DischargeDisposition::Transfer),
            expired_discharge_count: disposition(DischargeDisposition::Expired),
            other_discharge_count: disposition(DischargeDisposition::Other),
            invalid_discharge_count: disposition(DischargeDisposition::Invalid),

            low_paid_count: low_paid,
            low_paid_pct: percentage(low_paid as usize, nicu.len()),
            inappropriate_count: inappropriate,
            inappropriate_pct: percentage(inappropriate as usize, nicu.len()),

            readmitted_newborn_count: readmitted,
            readmission_rate_pct: percentage(readmitted as usize, newborn_count),
            readmission_event_count: newborns.iter().map(|n| u64::from(n.readmission_count)).sum(),
            readmission_paid: newborns.iter().map(|n| n.readmission_paid).sum(),

            null_diagnosis_rate_pct: percentage(null_diagnosis, claim_total),
            clipped_episode_count: clipped,
            clipping_rate_pct: percentage(clipped as usize, episodes.len()),
            provider_attribution_rate_pct: percentage(attributed as usize, nicu.len()),
            facility_cost_anomaly_count: count(&nicu, |e| e.facility_cost_anomaly),
            rejected_episode_count: overall.then_some(input.rejected.len() as u64),
            malformed_episode_count: overall.then(|| {
                input
                    .rejected
                    .iter()
                    .filter(|r| r.reason == RejectionReason::MalformedDates)
                    .count() as u64
            }),
            high_cost_claim_count: overall.then_some(input.tagging.high_cost as u64),
        }
    }
}
