//! Revenue-code leveling
//!
//! The reported acuity of a NICU episode is the highest band among the
//! revenue codes on its claims. Leveling means more than one band was billed.

use smallvec::SmallVec;
use std::sync::Arc;

use crate::models::nicu::AcuityLevel;
use crate::models::tagged::TaggedClaim;
use crate::reference::ReferenceIndex;

/// Acuity derived from an episode's revenue codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcuityProfile {
    /// Highest band observed
    pub level: Option<AcuityLevel>,
    /// More than one distinct band observed
    pub leveling: bool,
    /// Revenue code carrying the highest band (highest code on ties)
    pub final_revenue_code: Option<u32>,
}

/// Derive the acuity profile of a set of claims
#[must_use]
pub fn derive_acuity(claims: &[Arc<TaggedClaim>], reference: &ReferenceIndex) -> AcuityProfile {
    let mut bands: SmallVec<[AcuityLevel; 4]> = SmallVec::new();
    let mut best: Option<(AcuityLevel, u32)> = None;

    for revenue in claims.iter().filter_map(|c| c.claim.revenue_number()) {
        let Some(level) = reference.acuity_for_revenue(revenue) else {
            continue;
        };
        if !bands.contains(&level) {
            bands.push(level);
        }
        if best.is_none_or(|current| (level, revenue) > current) {
            best = Some((level, revenue));
        }
    }

    AcuityProfile {
        level: best.map(|(level, _)| level),
        leveling: bands.len() > 1,
        final_revenue_code: best.map(|(_, code)| code),
    }
}

/// Lowest NICU-range DRG among the claims
#[must_use]
pub fn final_nicu_drg(claims: &[Arc<TaggedClaim>], reference: &ReferenceIndex) -> Option<u32> {
    claims
        .iter()
        .filter_map(|c| c.claim.drg_number())
        .filter(|&drg| reference.is_nicu_drg(drg))
        .min()
}
