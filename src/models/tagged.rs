//! Tagged claim model
//!
//! A tagged claim is a claim record plus the evidence flags derived from the
//! reference code sets. Flags are additive: a claim may satisfy any number of
//! them at once.

use serde::Serialize;

use crate::models::claim::{ClaimRecord, ServiceType};

/// Evidence flags derived for a claim or accumulated over an episode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EvidenceFlags {
    /// A diagnosis code is in the newborn ICD set
    pub newborn_icd: bool,
    /// The revenue code is in the newborn revenue set
    pub newborn_revenue: bool,
    /// The revenue code is in the NICU revenue range
    pub nicu_revenue: bool,
    /// The DRG is in the NICU MS-DRG range
    pub nicu_msdrg: bool,
    /// The DRG is in the NICU APR-DRG range
    pub nicu_aprdrg: bool,
    /// A diagnosis code marks a singleton birth
    pub singleton_icd: bool,
    /// A diagnosis code marks a twin birth
    pub twin_icd: bool,
    /// A diagnosis code marks a higher-order multiple birth
    pub multiple_icd: bool,
    /// The CPT code is a manageable professional service
    pub manageable_cpt: bool,
    /// The CPT code is neonatal critical care
    pub critical_care_cpt: bool,
}

impl EvidenceFlags {
    /// Newborn evidence by diagnosis or revenue code
    #[must_use]
    pub const fn has_newborn_evidence(&self) -> bool {
        self.newborn_icd || self.newborn_revenue
    }

    /// NICU evidence from any of the three independent sources
    #[must_use]
    pub const fn has_nicu_evidence(&self) -> bool {
        self.nicu_revenue || self.nicu_msdrg || self.nicu_aprdrg
    }

    /// Whether the flags qualify an individual as a newborn
    #[must_use]
    pub const fn qualifies_newborn(&self) -> bool {
        self.has_newborn_evidence() || self.has_nicu_evidence()
    }

    /// Combine with another set of flags (logical OR per flag)
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            newborn_icd: self.newborn_icd || other.newborn_icd,
            newborn_revenue: self.newborn_revenue || other.newborn_revenue,
            nicu_revenue: self.nicu_revenue || other.nicu_revenue,
            nicu_msdrg: self.nicu_msdrg || other.nicu_msdrg,
            nicu_aprdrg: self.nicu_aprdrg || other.nicu_aprdrg,
            singleton_icd: self.singleton_icd || other.singleton_icd,
            twin_icd: self.twin_icd || other.twin_icd,
            multiple_icd: self.multiple_icd || other.multiple_icd,
            manageable_cpt: self.manageable_cpt || other.manageable_cpt,
            critical_care_cpt: self.critical_care_cpt || other.critical_care_cpt,
        }
    }
}

/// A claim with its derived evidence
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedClaim {
    /// The underlying claim
    pub claim: ClaimRecord,
    /// Service type, taken from the claim or assigned from its codes
    pub claim_type: ServiceType,
    /// Evidence flags
    pub flags: EvidenceFlags,
    /// Paid amount exceeds the high-cost threshold
    pub high_cost: bool,
}

impl TaggedClaim {
    /// Claim key of the underlying claim
    #[must_use]
    pub fn claim_key(&self) -> &str {
        &self.claim.claim_key
    }

    /// Individual of the underlying claim
    #[must_use]
    pub fn individual_id(&self) -> &str {
        &self.claim.individual_id
    }
}
