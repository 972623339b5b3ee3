//! Episode stitching
//!
//! Groups an individual's inpatient and emergency claims into continuous
//! hospital stays. Claims are sorted by (admission, discharge, claim key) and
//! scanned once; a new episode starts when the next admission is more than
//! the gap tolerance after the running discharge.

use chrono::NaiveDate;
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::models::episode::{HospitalEpisode, RejectedEpisode, RejectionReason};
use crate::models::tagged::{EvidenceFlags, TaggedClaim};
use crate::utils::dates::{days_between, length_of_stay};

/// Episodes stitched for one or more individuals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchOutput {
    /// Valid episodes, ordered by individual and admission
    pub episodes: Vec<HospitalEpisode>,
    /// Episodes excluded from LOS-based metrics
    pub rejected: Vec<RejectedEpisode>,
}

impl StitchOutput {
    fn extend(&mut self, other: Self) {
        self.episodes.extend(other.episodes);
        self.rejected.extend(other.rejected);
    }
}

/// Group claims by individual, ordered by individual identifier
#[must_use]
pub fn group_by_individual(claims: &[Arc<TaggedClaim>]) -> Vec<(String, Vec<Arc<TaggedClaim>>)> {
    let mut groups: FxHashMap<&str, Vec<Arc<TaggedClaim>>> = FxHashMap::default();
    for claim in claims {
        groups
            .entry(claim.individual_id())
            .or_default()
            .push(Arc::clone(claim));
    }
    groups
        .into_iter()
        .map(|(id, claims)| (id.to_string(), claims))
        .sorted_unstable_by(|a, b| a.0.cmp(&b.0))
        .collect()
}

/// Earliest admission among an individual's qualifying hospital claims
#[must_use]
pub fn qualifying_admission(claims: &[Arc<TaggedClaim>]) -> Option<NaiveDate> {
    claims
        .iter()
        .filter(|c| c.claim_type.is_hospital_stay() && c.flags.qualifies_newborn())
        .filter(|c| !c.claim.has_malformed_dates())
        .map(|c| c.claim.effective_admission())
        .min()
}

/// Stitches claims into hospital episodes
#[derive(Debug, Clone, Copy)]
pub struct EpisodeStitcher<'a> {
    config: &'a PipelineConfig,
}

impl<'a> EpisodeStitcher<'a> {
    /// Create a stitcher using the configured gap tolerance and run-out boundary
    #[must_use]
    pub const fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Stitch every individual in parallel
    #[must_use]
    pub fn stitch_all(&self, claims: &[Arc<TaggedClaim>]) -> StitchOutput {
        group_by_individual(claims)
            .par_iter()
            .map(|(id, claims)| self.stitch_individual(id, claims))
            .collect::<Vec<_>>()
            .into_iter()
            .fold(StitchOutput::default(), |mut acc, out| {
                acc.extend(out);
                acc
            })
    }

    /// Stitch the claims of one individual
    ///
    /// Individuals without a qualifying newborn or NICU claim produce nothing.
    #[must_use]
    pub fn stitch_individual(
        &self,
        individual_id: &str,
        claims: &[Arc<TaggedClaim>],
    ) -> StitchOutput {
        let mut output = StitchOutput::default();
        let Some(first_qualifying) = qualifying_admission(claims) else {
            return output;
        };

        let (malformed, mut candidates): (Vec<_>, Vec<_>) = claims
            .iter()
            .filter(|c| c.claim_type.is_hospital_stay() && !c.high_cost)
            .filter(|c| c.claim.effective_admission() >= first_qualifying)
            .cloned()
            .partition(|c| c.claim.has_malformed_dates());

        for claim in malformed {
            output.rejected.push(rejected(
                individual_id,
                std::slice::from_ref(&claim),
                claim.claim.effective_admission(),
                claim.claim.effective_discharge(),
                RejectionReason::MalformedDates,
            ));
        }

        candidates.sort_by(|a, b| {
            a.claim
                .effective_admission()
                .cmp(&b.claim.effective_admission())
                .then_with(|| a.claim.effective_discharge().cmp(&b.claim.effective_discharge()))
                .then_with(|| a.claim_key().cmp(b.claim_key()))
        });

        let mut delivery_date = None;
        let mut episode_number = 0u32;
        for run in self.merge_runs(candidates) {
            let admit = run[0].claim.effective_admission();
            let original_discharge = run
                .iter()
                .map(|c| c.claim.effective_discharge())
                .max()
                .unwrap_or(admit);

            if admit > self.config.run_out_end {
                output.rejected.push(rejected(
                    individual_id,
                    &run,
                    admit,
                    original_discharge,
                    RejectionReason::AdmittedAfterRunOut,
                ));
                continue;
            }

            let clipped_discharge = original_discharge > self.config.run_out_end;
            let discharge = original_discharge.min(self.config.run_out_end);
            let Some(los_days) = length_of_stay(admit, discharge) else {
                output.rejected.push(rejected(
                    individual_id,
                    &run,
                    admit,
                    discharge,
                    RejectionReason::MalformedDates,
                ));
                continue;
            };

            let delivery = *delivery_date.get_or_insert(admit);
            episode_number += 1;
            if clipped_discharge {
                debug!(
                    "Individual {individual_id} episode {episode_number}: discharge {original_discharge} clipped to {discharge}"
                );
            }

            output.episodes.push(HospitalEpisode {
                individual_id: individual_id.to_string(),
                delivery_date: delivery,
                episode_number,
                admit,
                discharge,
                original_discharge,
                clipped_discharge,
                los_days,
                total_paid: run.iter().map(|c| c.claim.paid_amount).sum(),
                evidence: run
                    .iter()
                    .fold(EvidenceFlags::default(), |acc, c| acc.union(c.flags)),
                is_birth_stay: days_between(delivery, admit)
                    <= self.config.initial_stay_window_days,
                claims: run,
            });
        }

        output
    }

    /// Split sorted claims into gap-tolerant runs
    fn merge_runs(&self, sorted: Vec<Arc<TaggedClaim>>) -> Vec<Vec<Arc<TaggedClaim>>> {
        let mut runs: Vec<Vec<Arc<TaggedClaim>>> = Vec::new();
        let mut running_discharge: Option<NaiveDate> = None;

        for claim in sorted {
            let admit = claim.claim.effective_admission();
            let discharge = claim.claim.effective_discharge();
            match (running_discharge, runs.last_mut()) {
                (Some(current), Some(run))
                    if days_between(current, admit) <= self.config.gap_tolerance_days =>
                {
                    running_discharge = Some(current.max(discharge));
                    run.push(claim);
                }
                _ => {
                    running_discharge = Some(discharge);
                    runs.push(vec![claim]);
                }
            }
        }
        runs
    }
}

fn rejected(
    individual_id: &str,
    claims: &[Arc<TaggedClaim>],
    admit: NaiveDate,
    discharge: NaiveDate,
    reason: RejectionReason,
) -> RejectedEpisode {
    RejectedEpisode {
        individual_id: individual_id.to_string(),
        admit,
        discharge,
        claim_keys: claims.iter().map(|c| c.claim_key().to_string()).collect(),
        total_paid: claims.iter().map(|c| c.claim.paid_amount).sum(),
        reason,
    }
}
