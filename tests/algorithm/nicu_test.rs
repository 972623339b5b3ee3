use nicu_episodes::models::{AcuityLevel, ContractType, DischargeDisposition, StayType};

use crate::utils::{ClaimBuilder, day, run};

#[test]
fn test_cost_decomposition_of_facility_and_professional_lines() {
    let output = run(vec![
        ClaimBuilder::new("F1", "P1", day(0), day(10))
            .diagnosis("Z38.00")
            .revenue("0174")
            .paid(7000.0)
            .build(),
        ClaimBuilder::new("PR1", "P1", day(1), day(1))
            .cpt("99468")
            .paid(3000.0)
            .build(),
    ]);

    let nicu = &output.nicu_episodes[0];
    assert!((nicu.total_paid - 10_000.0).abs() < 1e-9);
    assert!((nicu.professional_fee - 3000.0).abs() < 1e-9);
    assert!((nicu.facility_cost - 7000.0).abs() < 1e-9);
    assert!((nicu.room_and_board_cost - 7000.0).abs() < 1e-9);
    assert_eq!(nicu.pct_professional_fees, Some(30.0));
    assert_eq!(nicu.cost_per_day, Some(1000.0));
    assert!(!nicu.facility_cost_anomaly);
    assert!((nicu.critical_care_fee - 3000.0).abs() < 1e-9);
    assert_eq!(nicu.critical_care_days, 1);
    assert_eq!(nicu.contract_type, ContractType::PerDiem);

    let overall = &output.cohort_summaries[0];
    assert_eq!(overall.pct_professional_fees, Some(30.0));
    assert_eq!(overall.pct_room_and_board, Some(100.0));
}

#[test]
fn test_professional_fees_above_total_are_flagged() {
    let mut claim = ClaimBuilder::new("C1", "P1", day(0), day(4)).revenue("0173").paid(500.0).build();
    claim.professional_fee = Some(800.0);
    let output = run(vec![claim]);

    let nicu = &output.nicu_episodes[0];
    assert!(nicu.facility_cost_anomaly);
    assert!(nicu.facility_cost.abs() < f64::EPSILON);
    assert_eq!(nicu.pct_professional_fees, Some(100.0));
}

#[test]
fn test_nan_fee_keeps_episode_and_cohort_costs_finite() {
    let mut claim = ClaimBuilder::newborn("C1", "P1", day(0), day(4)).revenue("0174").paid(10_000.0).build();
    claim.professional_fee = Some(f64::NAN);
    let output = run(vec![claim]);

    let nicu = &output.nicu_episodes[0];
    assert!(nicu.professional_fee.abs() < f64::EPSILON);
    assert!((nicu.facility_cost - 10_000.0).abs() < 1e-9);
    assert!(!nicu.facility_cost_anomaly);
    assert!(output.cohort_summaries.iter().all(|s| s.total_professional_fee.is_finite()));
}

#[test]
fn test_negative_fee_is_flagged_and_facility_stays_within_total() {
    let mut claim = ClaimBuilder::new("C1", "P1", day(0), day(4)).revenue("0173").paid(500.0).build();
    claim.professional_fee = Some(-200.0);
    let output = run(vec![claim]);

    let nicu = &output.nicu_episodes[0];
    assert!(nicu.facility_cost_anomaly);
    assert!((nicu.facility_cost - 500.0).abs() < 1e-9);
    assert!(nicu.facility_cost <= nicu.total_paid);
}

#[test]
fn test_revenue_leveling_reports_highest_band() {
    let output = run(vec![
        ClaimBuilder::new("C1", "P1", day(0), day(5)).revenue("0172").build(),
        ClaimBuilder::new("C2", "P1", day(5), day(12)).revenue("0174").build(),
    ]);

    let nicu = &output.nicu_episodes[0];
    assert_eq!(nicu.acuity_level, Some(AcuityLevel::Level4));
    assert!(nicu.revenue_leveling);
    assert_eq!(nicu.final_revenue_code, Some(174));
    assert_eq!(nicu.stay_type, StayType::LongStay);
}

#[test]
fn test_short_drg_stay_is_inappropriate_and_low_paid() {
    let output = run(vec![
        ClaimBuilder::new("C1", "P1", day(0), day(3))
            .diagnosis("Z38.00")
            .apr_drg("602")
            .paid(300.0)
            .build(),
    ]);

    let nicu = &output.nicu_episodes[0];
    assert_eq!(nicu.contract_type, ContractType::Drg);
    assert_eq!(nicu.final_drg_code, Some(602));
    assert_eq!(nicu.cost_per_day, Some(100.0));
    assert!(nicu.low_paid);
    assert!(nicu.inappropriate);

    let overall = &output.cohort_summaries[0];
    assert_eq!(overall.low_paid_count, 1);
    assert_eq!(overall.inappropriate_pct, Some(100.0));
}

#[test]
fn test_disposition_and_provider_follow_the_last_discharge() {
    let output = run(vec![
        ClaimBuilder::new("C1", "P1", day(0), day(6))
            .revenue("0173")
            .status("02")
            .npi("1111111111")
            .paid(20_000.0)
            .build(),
        ClaimBuilder::new("C2", "P1", day(6), day(9))
            .revenue("0173")
            .status("20")
            .npi("2222222222")
            .paid(5000.0)
            .build(),
    ]);

    let nicu = &output.nicu_episodes[0];
    assert_eq!(nicu.discharge_status.as_deref(), Some("20"));
    assert_eq!(nicu.disposition, DischargeDisposition::Expired);
    assert_eq!(nicu.provider_npi.as_deref(), Some("2222222222"));
    assert_eq!(output.cohort_summaries[0].expired_discharge_count, 1);
    assert_eq!(output.cohort_summaries[0].provider_attribution_rate_pct, Some(100.0));
}

#[test]
fn test_clinical_markers_on_nicu_episode() {
    let output = run(vec![
        ClaimBuilder::new("C1", "P1", day(0), day(30))
            .revenue("0174")
            .diagnosis("P07.14")
            .diagnosis("P07.02")
            .diagnosis("P07.32")
            .diagnosis("P96.1")
            .build(),
    ]);

    let nicu = &output.nicu_episodes[0];
    assert_eq!(nicu.birthweight_category.as_deref(), Some("1: 500-749g"));
    assert_eq!(nicu.gestational_age_category.as_deref(), Some("3: 29 weeks"));
    assert!(nicu.nas);
}

#[test]
fn test_missing_status_is_invalid_disposition() {
    let output = run(vec![ClaimBuilder::new("C1", "P1", day(0), day(4)).revenue("0172").build()]);

    let nicu = &output.nicu_episodes[0];
    assert_eq!(nicu.discharge_status, None);
    assert_eq!(nicu.disposition, DischargeDisposition::Invalid);
    assert_eq!(nicu.provider_npi, None);
}
