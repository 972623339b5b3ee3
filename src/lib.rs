//! Newborn and NICU episode analytics over medical claims.
//!
//! Claims are tagged against reference code sets, stitched into hospital
//! episodes, classified into newborn and NICU categories, linked into
//! readmission chains and aggregated into per-cohort metrics.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod reference;
pub mod utils;

// Re-export the most common types for easier use
pub use algorithm::{
    BirthClassifier, ClaimTagger, EpisodeStitcher, MetricsAggregator, MultiplicityRule,
    NicuEpisodeBuilder, NicuPipeline, PipelineOutput, ReadmissionLinker, TaggingReport,
};
pub use config::{PipelineConfig, StudyWindow};
pub use error::{NicuError, Result};
pub use models::{
    AcuityLevel, BabyType, BirthMultiplicity, ClaimRecord, CohortSummary, ContractType,
    DischargeDisposition, HospitalEpisode, NewbornIdentity, NicuEpisode, StudyPeriod,
};
pub use reference::{ReferenceIndex, ReferenceTables};
