//! Readmission linkage
//!
//! Each episode links to at most one successor: the next episode admitted
//! after its discharge and within the readmission window. Chains recurse, so
//! a successor's own successor belongs to the successor, and roll-ups follow
//! the chain to its end.

use rustc_hash::FxHashMap;

use crate::models::episode::HospitalEpisode;
use crate::models::newborn::NewbornIdentity;
use crate::models::nicu::NicuEpisode;
use crate::models::readmission::{ReadmissionLink, ReadmissionSummary};
use crate::utils::dates::days_between;

/// Links episodes into readmission chains
#[derive(Debug, Clone, Copy)]
pub struct ReadmissionLinker {
    window_days: i64,
}

impl ReadmissionLinker {
    /// Create a linker with a readmission window in days
    #[must_use]
    pub const fn new(window_days: i64) -> Self {
        Self { window_days }
    }

    /// Link one individual's episodes
    ///
    /// Links are returned in origin discharge order.
    #[must_use]
    pub fn link(&self, episodes: &[HospitalEpisode]) -> Vec<ReadmissionLink> {
        let mut ordered: Vec<&HospitalEpisode> = episodes.iter().collect();
        ordered.sort_by(|a, b| {
            a.discharge
                .cmp(&b.discharge)
                .then(a.admit.cmp(&b.admit))
                .then(a.episode_number.cmp(&b.episode_number))
        });

        let mut links = Vec::new();
        for (idx, origin) in ordered.iter().enumerate() {
            let successor = ordered[idx + 1..].iter().find_map(|next| {
                let gap = days_between(origin.discharge, next.admit);
                (gap > 0 && gap <= self.window_days).then_some((next, gap))
            });
            if let Some((next, gap)) = successor {
                links.push(ReadmissionLink {
                    individual_id: origin.individual_id.clone(),
                    origin_episode: origin.episode_number,
                    successor_episode: next.episode_number,
                    days_between: gap,
                });
            }
        }
        links
    }

    /// Follow the chain from an origin episode and roll it up
    #[must_use]
    pub fn summarize(
        origin_episode: u32,
        episodes: &[HospitalEpisode],
        links: &[ReadmissionLink],
    ) -> ReadmissionSummary {
        let next: FxHashMap<u32, u32> = links
            .iter()
            .map(|l| (l.origin_episode, l.successor_episode))
            .collect();
        let by_number: FxHashMap<u32, &HospitalEpisode> =
            episodes.iter().map(|e| (e.episode_number, e)).collect();

        let mut summary = ReadmissionSummary::default();
        let mut current = origin_episode;
        // Links only point forward in discharge order, so the walk terminates
        while let Some(&successor) = next.get(&current) {
            if let Some(episode) = by_number.get(&successor) {
                summary.count += 1;
                summary.paid += episode.total_paid;
                summary.los_days += episode.los_days;
            }
            current = successor;
        }
        summary
    }

    /// Attach readmission roll-ups to a newborn
    ///
    /// The chain starts at the last birth-stay episode.
    #[must_use]
    pub fn attach_to_newborn(
        newborn: &NewbornIdentity,
        episodes: &[HospitalEpisode],
        links: &[ReadmissionLink],
    ) -> NewbornIdentity {
        let origin = episodes
            .iter()
            .filter(|e| e.is_birth_stay)
            .max_by_key(|e| (e.discharge, e.episode_number))
            .or_else(|| episodes.first());

        let summary = origin
            .map(|o| Self::summarize(o.episode_number, episodes, links))
            .unwrap_or_default();

        NewbornIdentity {
            has_readmission: summary.count > 0,
            readmission_count: summary.count,
            readmission_paid: summary.paid,
            readmission_los_days: summary.los_days,
            ..newborn.clone()
        }
    }

    /// Attach linkage and roll-ups to a NICU episode
    #[must_use]
    pub fn attach_to_nicu(
        nicu: &NicuEpisode,
        episodes: &[HospitalEpisode],
        links: &[ReadmissionLink],
    ) -> NicuEpisode {
        let outgoing = links
            .iter()
            .find(|l| l.origin_episode == nicu.episode_number);
        let incoming = links
            .iter()
            .find(|l| l.successor_episode == nicu.episode_number);
        let summary = Self::summarize(nicu.episode_number, episodes, links);

        NicuEpisode {
            readmission_of: incoming.map(|l| l.origin_episode),
            readmission_episode_number: outgoing.map(|l| l.successor_episode),
            days_to_readmission: outgoing.map(|l| l.days_between),
            readmission_count: summary.count,
            readmission_paid: summary.paid,
            readmission_los_days: summary.los_days,
            ..nicu.clone()
        }
    }
}
