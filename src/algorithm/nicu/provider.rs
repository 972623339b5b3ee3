//! Discharging provider attribution

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::models::claim::ProviderId;
use crate::models::tagged::TaggedClaim;
use crate::utils::dates::length_of_stay;

#[derive(Debug, Clone)]
struct ProviderActivity<'a> {
    provider: &'a ProviderId,
    latest_discharge: NaiveDate,
    longest_stay: u32,
    paid: f64,
}

/// Attribute an episode to the provider that discharged the newborn
///
/// Only claims with an NPI are considered. The provider with the latest
/// discharge wins, then the longest stay, then the highest paid amount;
/// remaining ties go to the lowest NPI.
#[must_use]
pub fn attribute_provider(claims: &[Arc<TaggedClaim>]) -> Option<ProviderId> {
    let mut activity: FxHashMap<&str, ProviderActivity<'_>> = FxHashMap::default();

    for tagged in claims {
        let claim = &tagged.claim;
        let Some(npi) = claim.provider.npi.as_deref() else {
            continue;
        };
        let discharge = claim.effective_discharge();
        let stay = length_of_stay(claim.effective_admission(), discharge).unwrap_or(0);

        let entry = activity.entry(npi).or_insert(ProviderActivity {
            provider: &claim.provider,
            latest_discharge: discharge,
            longest_stay: stay,
            paid: 0.0,
        });
        entry.latest_discharge = entry.latest_discharge.max(discharge);
        entry.longest_stay = entry.longest_stay.max(stay);
        entry.paid += claim.paid_amount;
    }

    activity
        .into_iter()
        .max_by(|(npi_a, a), (npi_b, b)| {
            a.latest_discharge
                .cmp(&b.latest_discharge)
                .then(a.longest_stay.cmp(&b.longest_stay))
                .then(a.paid.total_cmp(&b.paid))
                .then(npi_b.cmp(npi_a))
        })
        .map(|(_, winner)| winner.provider.clone())
}
