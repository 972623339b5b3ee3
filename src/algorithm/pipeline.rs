//! Pipeline orchestration
//!
//! Runs every stage in order: tagging, then per-individual stitching,
//! classification, NICU derivation and readmission linkage on a worker pool,
//! then cohort metrics. Outputs are sorted so repeated runs are identical.

use indicatif::ParallelProgressIterator;
use log::info;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

use crate::algorithm::classification::BirthClassifier;
use crate::algorithm::metrics::{MetricsAggregator, MetricsInput};
use crate::algorithm::nicu::NicuEpisodeBuilder;
use crate::algorithm::readmission::ReadmissionLinker;
use crate::algorithm::stitching::{EpisodeStitcher, group_by_individual};
use crate::algorithm::tagging::{ClaimTagger, TaggingReport};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::claim::ClaimRecord;
use crate::models::episode::{HospitalEpisode, RejectedEpisode};
use crate::models::newborn::NewbornIdentity;
use crate::models::nicu::NicuEpisode;
use crate::models::readmission::ReadmissionLink;
use crate::models::summary::CohortSummary;
use crate::models::tagged::TaggedClaim;
use crate::reference::ReferenceIndex;
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_stage_complete, log_stage_start,
    log_warning,
};

/// Everything a pipeline run produces
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub newborns: Vec<NewbornIdentity>,
    pub nicu_episodes: Vec<NicuEpisode>,
    pub episodes: Vec<HospitalEpisode>,
    pub cohort_summaries: Vec<CohortSummary>,
    pub readmission_links: Vec<ReadmissionLink>,
    pub rejected_episodes: Vec<RejectedEpisode>,
    pub tagging_report: TaggingReport,
}

/// Results for one individual
#[derive(Debug, Default)]
struct IndividualResult {
    newborn: Option<NewbornIdentity>,
    nicu_episodes: Vec<NicuEpisode>,
    episodes: Vec<HospitalEpisode>,
    links: Vec<ReadmissionLink>,
    rejected: Vec<RejectedEpisode>,
}

/// The NICU episode pipeline
#[derive(Debug, Default)]
pub struct NicuPipeline {
    classifier: BirthClassifier,
}

impl NicuPipeline {
    /// Create a pipeline with the default multiplicity rules
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom birth classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: BirthClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run every stage over a claim set
    pub fn run(
        &self,
        claims: Vec<ClaimRecord>,
        reference: &ReferenceIndex,
        config: &PipelineConfig,
    ) -> Result<PipelineOutput> {
        config.validate()?;
        let start = Instant::now();
        info!("Starting NICU episode pipeline with {} claims", claims.len());

        let (tagged, tagging_report) = ClaimTagger::new(reference, config).tag_all(claims);

        let groups = group_by_individual(&tagged);
        log_stage_start("Stitching and classifying individuals", groups.len());
        let stage_start = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .build()?;
        let pb = create_main_progress_bar(
            groups.len() as u64,
            Some("Individuals"),
            config.show_progress,
        );
        let results: Vec<IndividualResult> = pool.install(|| {
            groups
                .par_iter()
                .progress_with(pb.clone())
                .map(|(id, claims)| self.process_individual(id, claims, reference, config))
                .collect()
        });
        finish_progress_bar(&pb, Some("Individuals processed"));

        let mut output = PipelineOutput {
            tagging_report,
            ..PipelineOutput::default()
        };
        for result in results {
            output.newborns.extend(result.newborn);
            output.nicu_episodes.extend(result.nicu_episodes);
            output.episodes.extend(result.episodes);
            output.readmission_links.extend(result.links);
            output.rejected_episodes.extend(result.rejected);
        }
        sort_output(&mut output);
        log_stage_complete(
            "Stitching and classifying individuals",
            output.newborns.len(),
            stage_start.elapsed(),
        );

        if !output.rejected_episodes.is_empty() {
            log_warning(
                "Episodes rejected for malformed dates or late admission",
                Some(output.rejected_episodes.len()),
            );
        }
        let clipped = output.episodes.iter().filter(|e| e.clipped_discharge).count();
        if clipped > 0 {
            log_warning("Discharges clipped to the run-out boundary", Some(clipped));
        }

        output.cohort_summaries = MetricsAggregator::new(config).summarize(&MetricsInput {
            newborns: &output.newborns,
            nicu_episodes: &output.nicu_episodes,
            episodes: &output.episodes,
            rejected: &output.rejected_episodes,
            tagging: &output.tagging_report,
        });

        info!(
            "Pipeline finished in {:?}: {} newborns, {} NICU episodes",
            start.elapsed(),
            output.newborns.len(),
            output.nicu_episodes.len()
        );
        Ok(output)
    }

    fn process_individual(
        &self,
        individual_id: &str,
        claims: &[Arc<TaggedClaim>],
        reference: &ReferenceIndex,
        config: &PipelineConfig,
    ) -> IndividualResult {
        let stitched = EpisodeStitcher::new(config).stitch_individual(individual_id, claims);
        let episodes = stitched.episodes;
        let Some(newborn) = self.classifier.classify(&episodes, config) else {
            return IndividualResult {
                rejected: stitched.rejected,
                ..IndividualResult::default()
            };
        };

        let links = ReadmissionLinker::new(config.readmission_window_days).link(&episodes);
        let nicu_episodes = NicuEpisodeBuilder::new(reference, config)
            .build_all(&episodes, &newborn)
            .iter()
            .map(|nicu| ReadmissionLinker::attach_to_nicu(nicu, &episodes, &links))
            .collect();
        let newborn = ReadmissionLinker::attach_to_newborn(&newborn, &episodes, &links);

        IndividualResult {
            newborn: Some(newborn),
            nicu_episodes,
            episodes,
            links,
            rejected: stitched.rejected,
        }
    }
}

fn sort_output(output: &mut PipelineOutput) {
    output
        .newborns
        .sort_by(|a, b| (&a.individual_id, a.delivery_date).cmp(&(&b.individual_id, b.delivery_date)));
    output.nicu_episodes.sort_by(|a, b| {
        (&a.individual_id, a.admit, a.episode_number).cmp(&(&b.individual_id, b.admit, b.episode_number))
    });
    output.episodes.sort_by(|a, b| {
        (&a.individual_id, a.admit, a.episode_number).cmp(&(&b.individual_id, b.admit, b.episode_number))
    });
    output.readmission_links.sort_by(|a, b| {
        (&a.individual_id, a.origin_episode).cmp(&(&b.individual_id, b.origin_episode))
    });
    output.rejected_episodes.sort_by(|a, b| {
        (&a.individual_id, a.admit, &a.claim_keys).cmp(&(&b.individual_id, b.admit, &b.claim_keys))
    });
}
