//! Pipeline stages
//!
//! Each stage consumes the fully materialised output of the previous one and
//! produces a new collection: tagging, stitching, classification, NICU
//! derivation, readmission linkage and cohort metrics.

pub mod classification;
pub mod metrics;
pub mod nicu;
pub mod pipeline;
pub mod readmission;
pub mod stitching;
pub mod tagging;

pub use classification::{BirthClassifier, DiagnosisMultiplicityRule, MultiplicityRule};
pub use metrics::{MetricsAggregator, MetricsInput, SummaryStats};
pub use nicu::NicuEpisodeBuilder;
pub use pipeline::{NicuPipeline, PipelineOutput};
pub use readmission::ReadmissionLinker;
pub use stitching::{EpisodeStitcher, StitchOutput};
pub use tagging::{ClaimTagger, TaggingReport};
