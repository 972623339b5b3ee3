use nicu_episodes::{NicuError, NicuPipeline, PipelineConfig, PipelineOutput};

use crate::utils::{ClaimBuilder, date, day, reference_index, run};

fn mixed_claims() -> Vec<nicu_episodes::ClaimRecord> {
    vec![
        ClaimBuilder::newborn("A1", "P1", day(0), day(2)).npi("1000000001").build(),
        ClaimBuilder::new("A2", "P1", day(15), day(25)).revenue("0173").status("01").build(),
        ClaimBuilder::new("B1", "P2", date(2023, 3, 3), date(2023, 3, 20))
            .diagnosis("Z38.30")
            .revenue("0174")
            .cpt("99469")
            .paid(40_000.0)
            .build(),
        ClaimBuilder::new("B2", "P2", date(2023, 3, 20), date(2023, 3, 22)).apr_drg("612").build(),
        ClaimBuilder::newborn("C1", "P3", date(2024, 3, 28), date(2024, 4, 3)).build(),
        ClaimBuilder::new("D1", "P4", day(3), day(4)).diagnosis("J06.9").build(),
        ClaimBuilder::newborn("E1", "P5", day(1), day(3)).paid(900_000.0).build(),
        ClaimBuilder::newborn("E2", "P5", day(1), day(3)).build(),
    ]
}

fn assert_same(a: &PipelineOutput, b: &PipelineOutput) {
    assert_eq!(a.newborns, b.newborns);
    assert_eq!(a.nicu_episodes, b.nicu_episodes);
    assert_eq!(a.episodes, b.episodes);
    assert_eq!(a.readmission_links, b.readmission_links);
    assert_eq!(a.rejected_episodes, b.rejected_episodes);
    assert_eq!(a.cohort_summaries, b.cohort_summaries);
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = run(mixed_claims());
    let second = run(mixed_claims());
    assert_same(&first, &second);
}

#[test]
fn test_input_order_does_not_matter() {
    let mut reversed = mixed_claims();
    reversed.reverse();
    assert_same(&run(mixed_claims()), &run(reversed));
}

#[test]
fn test_mixed_claim_set_end_to_end() {
    let output = run(mixed_claims());

    let ids: Vec<&str> = output.newborns.iter().map(|n| n.individual_id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P2", "P3", "P5"]);
    assert_eq!(output.tagging_report.total_claims, 8);
    assert_eq!(output.tagging_report.high_cost, 1);
    assert_eq!(output.cohort_summaries[0].high_cost_claim_count, Some(1));

    // High-cost claims never enter an episode
    let p5 = output.episodes.iter().find(|e| e.individual_id == "P5").unwrap();
    assert_eq!(p5.claim_keys(), vec!["E2".to_string()]);

    let p2 = &output.newborns[1];
    assert_eq!(p2.episode_count, 1);
    assert_eq!(p2.nicu_episode_count, 1);
    assert_eq!(output.nicu_episodes.iter().filter(|e| e.individual_id == "P2").count(), 1);

    assert!(output.newborns[2].clipped_discharge);
    assert_eq!(output.cohort_summaries[0].clipped_episode_count, 1);

    // Every NICU episode belongs to a newborn with a matching delivery date
    for nicu in &output.nicu_episodes {
        assert!(output
            .newborns
            .iter()
            .any(|n| n.individual_id == nicu.individual_id && n.delivery_date == nicu.delivery_date));
    }
}

#[test]
fn test_episode_numbers_are_sequential_per_individual() {
    let output = run(mixed_claims());
    for newborn in &output.newborns {
        let numbers: Vec<u32> = output
            .episodes
            .iter()
            .filter(|e| e.individual_id == newborn.individual_id)
            .map(|e| e.episode_number)
            .collect();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected);
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = PipelineConfig::new(date(2024, 1, 1), date(2023, 1, 1));
    let err = NicuPipeline::new()
        .run(mixed_claims(), &reference_index(), &config)
        .unwrap_err();
    assert!(matches!(err, NicuError::InvalidConfig(_)));
}

#[test]
fn test_empty_input_produces_empty_output() {
    let output = run(Vec::new());
    assert!(output.newborns.is_empty());
    assert!(output.nicu_episodes.is_empty());
    assert_eq!(output.cohort_summaries.len(), 3);
    assert_eq!(output.cohort_summaries[0].nicu_rate_pct, None);
}

#[test]
fn test_thresholds_follow_the_configuration() {
    let claims = vec![
        ClaimBuilder::newborn("A1", "P1", day(0), day(1)).build(),
        ClaimBuilder::new("A2", "P1", day(15), day(17)).revenue("0172").apr_drg("601").paid(900.0).build(),
    ];
    let config = crate::utils::test_config()
        .with_readmission_window_days(10)
        .with_low_paid_cost_per_day(100.0)
        .with_inappropriate_max_los_days(1);
    let output = NicuPipeline::new()
        .run(claims, &reference_index(), &config)
        .unwrap();

    assert!(output.readmission_links.is_empty());
    let nicu = &output.nicu_episodes[0];
    assert_eq!(nicu.cost_per_day, Some(450.0));
    assert!(!nicu.low_paid);
    assert!(!nicu.inappropriate);
}
