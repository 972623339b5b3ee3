//! Newborn classification
//!
//! Resolves each (individual, delivery date) to exactly one multiplicity,
//! baby type and study period. Multiplicity comes from an ordered chain of
//! [`MultiplicityRule`]s where the first verdict wins and Single is the
//! fallback; baby type is NICU when any episode has any NICU evidence.

use log::debug;

use crate::config::PipelineConfig;
use crate::models::episode::HospitalEpisode;
use crate::models::newborn::{BabyType, BirthMultiplicity, NewbornIdentity, StayType, StudyPeriod};

/// A pluggable multiplicity heuristic
///
/// Returns `None` when the rule has no opinion about the newborn.
pub trait MultiplicityRule: Send + Sync {
    /// Evaluate the rule against a newborn's episodes
    fn evaluate(&self, episodes: &[HospitalEpisode]) -> Option<BirthMultiplicity>;
}

impl<F> MultiplicityRule for F
where
    F: Fn(&[HospitalEpisode]) -> Option<BirthMultiplicity> + Send + Sync,
{
    fn evaluate(&self, episodes: &[HospitalEpisode]) -> Option<BirthMultiplicity> {
        self(episodes)
    }
}

/// Multiplicity from multiple-birth and twin diagnosis codes on the birth stay
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosisMultiplicityRule;

impl MultiplicityRule for DiagnosisMultiplicityRule {
    fn evaluate(&self, episodes: &[HospitalEpisode]) -> Option<BirthMultiplicity> {
        let birth_stay = episodes.iter().filter(|e| e.is_birth_stay);
        let (mut twin, mut multiple) = (false, false);
        for episode in birth_stay {
            twin |= episode.evidence.twin_icd;
            multiple |= episode.evidence.multiple_icd;
        }
        if multiple {
            Some(BirthMultiplicity::Multiple)
        } else if twin {
            Some(BirthMultiplicity::Twin)
        } else {
            None
        }
    }
}

/// Classifies newborns from their stitched episodes
pub struct BirthClassifier {
    rules: Vec<Box<dyn MultiplicityRule>>,
}

impl Default for BirthClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BirthClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BirthClassifier")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl BirthClassifier {
    /// Create a classifier with the diagnosis-code multiplicity rule
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: vec![Box::new(DiagnosisMultiplicityRule)],
        }
    }

    /// Create a classifier with no rules; every newborn resolves to Single
    #[must_use]
    pub fn without_rules() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule, evaluated after the existing ones
    #[must_use]
    pub fn with_rule<R: MultiplicityRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Resolve multiplicity; the first rule with a verdict wins
    #[must_use]
    pub fn multiplicity(&self, episodes: &[HospitalEpisode]) -> BirthMultiplicity {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(episodes))
            .unwrap_or_default()
    }

    /// Resolve baby type across all episodes
    #[must_use]
    pub fn baby_type(episodes: &[HospitalEpisode]) -> BabyType {
        if episodes.iter().any(|e| e.baby_type() == BabyType::Nicu) {
            BabyType::Nicu
        } else {
            BabyType::Normal
        }
    }

    /// Build the newborn row for one individual's episodes
    ///
    /// Returns `None` when there are no episodes.
    #[must_use]
    pub fn classify(
        &self,
        episodes: &[HospitalEpisode],
        config: &PipelineConfig,
    ) -> Option<NewbornIdentity> {
        let first = episodes.first()?;
        let birth_stay: Vec<&HospitalEpisode> =
            episodes.iter().filter(|e| e.is_birth_stay).collect();

        let total_los_days = birth_stay.iter().map(|e| e.los_days).sum();
        let total_paid = birth_stay.iter().map(|e| e.total_paid).sum();
        let birth_discharge = birth_stay
            .iter()
            .map(|e| e.discharge)
            .max()
            .unwrap_or(first.discharge);

        let newborn = NewbornIdentity {
            individual_id: first.individual_id.clone(),
            delivery_date: first.delivery_date,
            multiplicity: self.multiplicity(episodes),
            baby_type: Self::baby_type(episodes),
            study_period: StudyPeriod::from_delivery(first.delivery_date, config.study_midpoint),
            birth_admit: first.admit,
            birth_discharge,
            stay_type: StayType::from_los(total_los_days, config.long_stay_min_days),
            total_los_days,
            total_paid,
            episode_count: u32::try_from(episodes.len()).unwrap_or(u32::MAX),
            nicu_episode_count: u32::try_from(
                episodes
                    .iter()
                    .filter(|e| e.baby_type() == BabyType::Nicu)
                    .count(),
            )
            .unwrap_or(u32::MAX),
            clipped_discharge: birth_stay.iter().any(|e| e.clipped_discharge),
            has_readmission: false,
            readmission_count: 0,
            readmission_paid: 0.0,
            readmission_los_days: 0,
        };
        debug!(
            "Newborn {} delivered {}: {} {} {}",
            newborn.individual_id,
            newborn.delivery_date,
            newborn.baby_type,
            newborn.multiplicity,
            newborn.study_period
        );
        Some(newborn)
    }
}
