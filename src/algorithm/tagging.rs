//! Claim tagging
//!
//! Evaluates every evidence predicate against the reference index for each
//! claim independently. No claim is dropped: the output has the same length
//! and order as the input.

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::models::claim::{ClaimRecord, DrgType, ServiceType, parse_numeric_code};
use crate::models::tagged::{EvidenceFlags, TaggedClaim};
use crate::reference::{ReferenceIndex, ReferenceSet};
use crate::utils::logging::{log_stage_complete, log_stage_start};

/// Match counts collected while tagging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaggingReport {
    pub total_claims: usize,
    pub newborn_icd: usize,
    pub newborn_revenue: usize,
    pub nicu_revenue: usize,
    pub nicu_msdrg: usize,
    pub nicu_aprdrg: usize,
    pub singleton_icd: usize,
    pub twin_icd: usize,
    pub multiple_icd: usize,
    pub manageable_cpt: usize,
    pub critical_care_cpt: usize,
    /// Claims without any diagnosis code
    pub null_diagnosis: usize,
    /// Claims above the high-cost threshold
    pub high_cost: usize,
    /// Claims whose service type was assigned from their codes
    pub assigned_claim_type: usize,
    /// Reference sets that were empty
    pub missing_references: Vec<ReferenceSet>,
}

impl TaggingReport {
    fn record(&mut self, tagged: &TaggedClaim, assigned: bool) {
        let flags = &tagged.flags;
        self.total_claims += 1;
        self.newborn_icd += usize::from(flags.newborn_icd);
        self.newborn_revenue += usize::from(flags.newborn_revenue);
        self.nicu_revenue += usize::from(flags.nicu_revenue);
        self.nicu_msdrg += usize::from(flags.nicu_msdrg);
        self.nicu_aprdrg += usize::from(flags.nicu_aprdrg);
        self.singleton_icd += usize::from(flags.singleton_icd);
        self.twin_icd += usize::from(flags.twin_icd);
        self.multiple_icd += usize::from(flags.multiple_icd);
        self.manageable_cpt += usize::from(flags.manageable_cpt);
        self.critical_care_cpt += usize::from(flags.critical_care_cpt);
        self.null_diagnosis += usize::from(!tagged.claim.has_diagnosis());
        self.high_cost += usize::from(tagged.high_cost);
        self.assigned_claim_type += usize::from(assigned);
    }

    /// Share of claims without a diagnosis code, in percent
    #[must_use]
    pub fn null_diagnosis_rate_pct(&self) -> Option<f64> {
        crate::algorithm::metrics::percentage(self.null_diagnosis, self.total_claims)
    }
}

/// Assign a service type to a claim that arrived without one
#[must_use]
pub fn assign_claim_type(claim: &ClaimRecord) -> ServiceType {
    let pos = claim.place_of_service.as_deref().map(str::trim);
    let revenue = claim.revenue_number();
    let cpt = claim.cpt_code.as_deref().and_then(parse_numeric_code);

    let inpatient = pos == Some("21")
        || revenue.is_some_and(|r| (100..=210).contains(&r) || r == 987)
        || cpt.is_some_and(|c| {
            (99221..=99239).contains(&c) || (99251..=99255).contains(&c) || (99261..=99263).contains(&c)
        })
        || claim.drg_code.is_some();
    if inpatient {
        return ServiceType::Inpatient;
    }

    let emergency = pos == Some("23")
        || cpt.is_some_and(|c| (99281..=99288).contains(&c))
        || revenue.is_some_and(|r| (450..=459).contains(&r) || r == 981);
    if emergency {
        ServiceType::Emergency
    } else {
        ServiceType::Outpatient
    }
}

/// Tags claims against a reference index
#[derive(Debug, Clone, Copy)]
pub struct ClaimTagger<'a> {
    reference: &'a ReferenceIndex,
    high_cost_threshold: Option<f64>,
}

impl<'a> ClaimTagger<'a> {
    /// Create a tagger for a reference index and configuration
    #[must_use]
    pub const fn new(reference: &'a ReferenceIndex, config: &PipelineConfig) -> Self {
        Self {
            reference,
            high_cost_threshold: config.high_cost_claim_threshold,
        }
    }

    /// Derive the evidence flags of a single claim
    #[must_use]
    pub fn evidence(&self, claim: &ClaimRecord) -> EvidenceFlags {
        let reference = self.reference;
        let diagnoses = claim.diagnosis_codes.as_slice();
        let revenue = claim.revenue_number();
        let drg = claim.drg_number();
        let cpt = claim.cpt_code.as_deref();

        // An explicit grouper restricts the DRG to its own range
        let (check_ms, check_apr) = match claim.drg_type {
            Some(DrgType::MsDrg) => (true, false),
            Some(DrgType::AprDrg) => (false, true),
            None => (true, true),
        };

        EvidenceFlags {
            newborn_icd: reference.is_newborn_icd(diagnoses),
            newborn_revenue: revenue.is_some_and(|r| reference.is_newborn_revenue(r)),
            nicu_revenue: revenue.is_some_and(|r| reference.is_nicu_revenue(r)),
            nicu_msdrg: check_ms && drg.is_some_and(|d| reference.is_nicu_msdrg(d)),
            nicu_aprdrg: check_apr && drg.is_some_and(|d| reference.is_nicu_aprdrg(d)),
            singleton_icd: reference.is_singleton_icd(diagnoses),
            twin_icd: reference.is_twin_icd(diagnoses),
            multiple_icd: reference.is_multiple_icd(diagnoses),
            manageable_cpt: cpt.is_some_and(|c| reference.is_manageable_cpt(c)),
            critical_care_cpt: cpt.is_some_and(|c| reference.is_critical_care_cpt(c)),
        }
    }

    /// Tag one claim; the flag reports whether the service type was assigned
    #[must_use]
    pub fn tag(&self, claim: ClaimRecord) -> (TaggedClaim, bool) {
        let flags = self.evidence(&claim);
        let high_cost = self
            .high_cost_threshold
            .is_some_and(|threshold| claim.paid_amount > threshold);
        let (claim_type, assigned) = match claim.service_type {
            Some(service_type) => (service_type, false),
            None => (assign_claim_type(&claim), true),
        };
        (
            TaggedClaim {
                claim,
                claim_type,
                flags,
                high_cost,
            },
            assigned,
        )
    }

    /// Tag all claims in parallel, preserving input order
    pub fn tag_all(&self, claims: Vec<ClaimRecord>) -> (Vec<Arc<TaggedClaim>>, TaggingReport) {
        let start = Instant::now();
        log_stage_start("Tagging claims", claims.len());

        let missing = self.reference.missing_references();
        for set in &missing {
            warn!("Reference set {set} is empty; it will never match");
        }

        let results: Vec<(TaggedClaim, bool)> =
            claims.into_par_iter().map(|claim| self.tag(claim)).collect();

        let mut report = TaggingReport {
            missing_references: missing,
            ..TaggingReport::default()
        };
        let tagged = results
            .into_iter()
            .map(|(claim, assigned)| {
                report.record(&claim, assigned);
                Arc::new(claim)
            })
            .collect::<Vec<_>>();

        debug!(
            "Tagging matches: newborn ICD {}, newborn revenue {}, NICU revenue {}, MS-DRG {}, APR-DRG {}",
            report.newborn_icd,
            report.newborn_revenue,
            report.nicu_revenue,
            report.nicu_msdrg,
            report.nicu_aprdrg
        );
        if report.high_cost > 0 {
            info!("{} claims exceed the high-cost threshold", report.high_cost);
        }
        log_stage_complete("Tagging claims", tagged.len(), start.elapsed());
        (tagged, report)
    }
}
