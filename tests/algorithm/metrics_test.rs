use nicu_episodes::algorithm::{MetricsAggregator, MetricsInput, TaggingReport};
use nicu_episodes::models::Cohort;

use crate::utils::{ClaimBuilder, date, day, run, test_config};

#[test]
fn test_nicu_rate_is_zero_without_nicu_newborns() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(1)).build(),
        ClaimBuilder::newborn("C2", "P2", day(3), day(5)).build(),
    ]);

    let overall = &output.cohort_summaries[0];
    assert_eq!(overall.cohort, Cohort::Overall);
    assert_eq!(overall.newborn_count, 2);
    assert_eq!(overall.nicu_rate_pct, Some(0.0));
    assert_eq!(overall.nicu_episode_count, 0);
    assert_eq!(overall.nicu_avg_paid, None);
    assert_eq!(overall.pct_professional_fees, None);
}

#[test]
fn test_nicu_rate_is_hundred_when_every_newborn_is_nicu() {
    let output = run(vec![
        ClaimBuilder::new("C1", "P1", day(0), day(6)).revenue("0172").build(),
        ClaimBuilder::new("C2", "P2", day(0), day(6)).ms_drg("791").build(),
    ]);

    assert_eq!(output.cohort_summaries[0].nicu_rate_pct, Some(100.0));
}

#[test]
fn test_empty_cohort_has_no_ratios() {
    let aggregator_config = test_config();
    let rows = MetricsAggregator::new(&aggregator_config).summarize(&MetricsInput {
        newborns: &[],
        nicu_episodes: &[],
        episodes: &[],
        rejected: &[],
        tagging: &TaggingReport::default(),
    });

    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.newborn_count, 0);
        assert_eq!(row.nicu_rate_pct, None);
        assert_eq!(row.readmission_rate_pct, None);
        assert_eq!(row.nicu_median_los, None);
    }
    assert_eq!(rows[0].rejected_episode_count, Some(0));
    assert_eq!(rows[1].rejected_episode_count, None);
}

#[test]
fn test_period_cohorts_partition_overall() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", date(2023, 2, 1), date(2023, 2, 3)).build(),
        ClaimBuilder::new("C2", "P2", date(2023, 3, 1), date(2023, 3, 9)).revenue("0174").build(),
        ClaimBuilder::newborn("C3", "P3", date(2023, 10, 1), date(2023, 10, 2)).build(),
    ]);

    let rows = &output.cohort_summaries;
    assert_eq!(rows.iter().map(|r| r.cohort).collect::<Vec<_>>(), Cohort::all().to_vec());
    let (overall, previous, current) = (&rows[0], &rows[1], &rows[2]);
    assert_eq!(previous.newborn_count + current.newborn_count, overall.newborn_count);
    assert_eq!(previous.nicu_episode_count + current.nicu_episode_count, overall.nicu_episode_count);
    assert_eq!(previous.nicu_rate_pct, Some(50.0));
    assert_eq!(current.nicu_rate_pct, Some(0.0));
}

#[test]
fn test_ratios_stay_within_bounds() {
    let claims = (0..25u64)
        .flat_map(|i| {
            let id = format!("P{i:02}");
            let mut claims = vec![ClaimBuilder::new(&format!("A{i}"), &id, day(i), day(i + i % 9))
                .revenue(if i % 3 == 0 { "0171" } else { "0173" })
                .paid(100.0 * (i + 1) as f64)
                .status(if i % 2 == 0 { "01" } else { "02" })
                .build()];
            if i % 5 == 0 {
                claims.push(ClaimBuilder::new(&format!("B{i}"), &id, day(i + 20), day(i + 22)).build());
            }
            claims
        })
        .collect();
    let output = run(claims);

    for row in &output.cohort_summaries {
        for pct in [
            row.nicu_rate_pct,
            row.pct_professional_fees,
            row.pct_room_and_board,
            row.low_paid_pct,
            row.inappropriate_pct,
            row.readmission_rate_pct,
            row.null_diagnosis_rate_pct,
            row.clipping_rate_pct,
            row.provider_attribution_rate_pct,
        ]
        .into_iter()
        .flatten()
        {
            assert!((0.0..=100.0).contains(&pct), "{} out of range in {}", pct, row.cohort);
        }
    }
}
