//! Domain models for the NICU episode pipeline
//!
//! This module contains the records produced and consumed by the pipeline
//! stages. Every model is a read-only snapshot once created.

pub mod claim;
pub mod episode;
pub mod newborn;
pub mod nicu;
pub mod readmission;
pub mod summary;
pub mod tagged;

// Re-export commonly used types
pub use claim::{ClaimRecord, ClaimRow, DrgType, ProviderId, ServiceType};
pub use episode::{HospitalEpisode, RejectedEpisode, RejectionReason};
pub use newborn::{BabyType, BirthMultiplicity, NewbornIdentity, StayType, StudyPeriod};
pub use nicu::{AcuityLevel, ContractType, DischargeDisposition, NicuEpisode};
pub use readmission::{ReadmissionLink, ReadmissionSummary};
pub use summary::{Cohort, CohortSummary};
pub use tagged::{EvidenceFlags, TaggedClaim};
