use nicu_episodes::models::claim::ServiceType;
use nicu_episodes::models::episode::RejectionReason;
use nicu_episodes::{ClaimTagger, EpisodeStitcher, NicuPipeline};

use crate::utils::{ClaimBuilder, date, day, reference_index, run, test_config};

#[test]
fn test_gap_within_tolerance_merges_claims() {
    // Second claim starts three days after the first discharge
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P1", day(5), day(6)).build(),
    ]);

    assert_eq!(output.episodes.len(), 1);
    let episode = &output.episodes[0];
    assert_eq!(episode.admit, day(0));
    assert_eq!(episode.discharge, day(6));
    assert_eq!(episode.los_days, 6);
    assert_eq!(episode.claim_keys(), vec!["C1".to_string(), "C2".to_string()]);
}

#[test]
fn test_gap_beyond_tolerance_splits_episodes() {
    // Five days between discharge and the next admission
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P1", day(7), day(8)).build(),
    ]);

    assert_eq!(output.episodes.len(), 2);
    assert_eq!(output.episodes[0].episode_number, 1);
    assert_eq!(output.episodes[1].episode_number, 2);
    assert_eq!(output.episodes[1].admit, day(7));
}

#[test]
fn test_wide_initial_stay_window_spans_several_episodes() {
    let config = test_config().with_initial_stay_window_days(30);
    let claims = vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P1", day(10), day(12)).build(),
        ClaimBuilder::new("C3", "P1", day(40), day(41)).build(),
    ];
    let output = NicuPipeline::new()
        .run(claims, &reference_index(), &config)
        .unwrap();

    let birth_stay: Vec<bool> = output.episodes.iter().map(|e| e.is_birth_stay).collect();
    assert_eq!(birth_stay, vec![true, true, false]);

    let newborn = &output.newborns[0];
    assert!((newborn.total_paid - 2000.0).abs() < f64::EPSILON);
    assert_eq!(newborn.birth_discharge, day(12));
    // The chain starts at the last birth-stay episode
    assert_eq!(newborn.readmission_count, 1);
    assert!((newborn.readmission_paid - 1000.0).abs() < f64::EPSILON);
}

#[test]
fn test_default_window_keeps_only_the_first_episode_in_the_birth_stay() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P1", day(10), day(12)).build(),
    ]);

    let birth_stay: Vec<bool> = output.episodes.iter().map(|e| e.is_birth_stay).collect();
    assert_eq!(birth_stay, vec![true, false]);
    assert!((output.newborns[0].total_paid - 1000.0).abs() < f64::EPSILON);
}

#[test]
fn test_overlapping_claims_extend_the_episode() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(10)).build(),
        ClaimBuilder::new("C2", "P1", day(3), day(4)).build(),
        ClaimBuilder::new("C3", "P1", day(12), day(13)).build(),
    ]);

    assert_eq!(output.episodes.len(), 1);
    assert_eq!(output.episodes[0].discharge, day(13));
}

#[test]
fn test_episode_claims_are_disjoint() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P1", day(20), day(21)).build(),
        ClaimBuilder::new("C3", "P1", day(40), day(41)).build(),
    ]);

    let mut keys: Vec<String> = output.episodes.iter().flat_map(|e| e.claim_keys()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
    assert_eq!(total, 3);
}

#[test]
fn test_discharge_is_clipped_to_run_out_boundary() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", date(2024, 3, 25), date(2024, 4, 10)).build(),
    ]);

    let episode = &output.episodes[0];
    assert!(episode.clipped_discharge);
    assert_eq!(episode.discharge, date(2024, 3, 31));
    assert_eq!(episode.original_discharge, date(2024, 4, 10));
    assert_eq!(episode.los_days, 6);
    assert_eq!(episode.unclipped_los_days(), 16);

    let newborn = &output.newborns[0];
    assert!(newborn.clipped_discharge);
    assert_eq!(newborn.birth_discharge, date(2024, 3, 31));
    assert_eq!(newborn.total_los_days, 6);
}

#[test]
fn test_admission_after_run_out_is_rejected() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P1", date(2024, 4, 5), date(2024, 4, 8)).build(),
    ]);

    assert_eq!(output.episodes.len(), 1);
    assert_eq!(output.rejected_episodes.len(), 1);
    assert_eq!(output.rejected_episodes[0].reason, RejectionReason::AdmittedAfterRunOut);
    assert_eq!(output.rejected_episodes[0].claim_keys, vec!["C2".to_string()]);
}

#[test]
fn test_malformed_claim_is_rejected_not_merged() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P1", day(1), day(0)).build(),
    ]);

    assert_eq!(output.episodes.len(), 1);
    assert_eq!(output.episodes[0].claim_keys(), vec!["C1".to_string()]);
    assert_eq!(output.rejected_episodes.len(), 1);
    assert_eq!(output.rejected_episodes[0].reason, RejectionReason::MalformedDates);
    assert_eq!(output.cohort_summaries[0].malformed_episode_count, Some(1));
}

#[test]
fn test_non_hospital_claims_do_not_form_episodes() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P1", day(30), day(30))
            .service_type(Some(ServiceType::Outpatient))
            .build(),
    ]);

    assert_eq!(output.episodes.len(), 1);
    assert_eq!(output.newborns[0].episode_count, 1);
}

#[test]
fn test_individual_without_evidence_is_not_a_newborn() {
    let output = run(vec![ClaimBuilder::new("C1", "P9", day(0), day(3)).diagnosis("J18.9").build()]);

    assert!(output.newborns.is_empty());
    assert!(output.episodes.is_empty());
}

#[test]
fn test_stitch_all_orders_by_individual() {
    let reference = reference_index();
    let config = test_config();
    let (tagged, _) = ClaimTagger::new(&reference, &config).tag_all(vec![
        ClaimBuilder::newborn("B1", "P2", day(0), day(2)).build(),
        ClaimBuilder::newborn("A1", "P1", day(5), day(6)).build(),
        ClaimBuilder::new("A2", "P1", day(30), day(31)).build(),
    ]);

    let output = EpisodeStitcher::new(&config).stitch_all(&tagged);
    let order: Vec<(&str, u32)> = output
        .episodes
        .iter()
        .map(|e| (e.individual_id.as_str(), e.episode_number))
        .collect();
    assert_eq!(order, vec![("P1", 1), ("P1", 2), ("P2", 1)]);
    assert!(output.rejected.is_empty());
}
