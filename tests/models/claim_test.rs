use nicu_episodes::NicuError;
use nicu_episodes::models::claim::{ClaimRow, DrgType, ServiceType};

use crate::utils::date;

fn row() -> ClaimRow {
    ClaimRow {
        claim_key: Some("C1".to_string()),
        individual_id: Some("P1".to_string()),
        service_type: Some("ip".to_string()),
        service_from: Some("2023-09-01".to_string()),
        admission_date: Some("09/01/2023".to_string()),
        discharge_date: Some("20230905".to_string()),
        paid_amount: Some(1250.0),
        diag_1: Some("Z38.00".to_string()),
        diag_3: Some("  ".to_string()),
        diag_4: Some("P07.14".to_string()),
        revenue_code: Some("0174".to_string()),
        drg_code: Some("790".to_string()),
        drg_type: Some("MS-DRG".to_string()),
        provider_npi: Some(" 1234567890 ".to_string()),
        ..ClaimRow::default()
    }
}

#[test]
fn test_row_conversion_normalizes_fields() {
    let claim = row().into_record(0).unwrap();

    assert_eq!(claim.service_type, Some(ServiceType::Inpatient));
    assert_eq!(claim.admission_date, Some(date(2023, 9, 1)));
    assert_eq!(claim.discharge_date, Some(date(2023, 9, 5)));
    assert_eq!(claim.diagnosis_codes, vec!["Z38.00".to_string(), "P07.14".to_string()]);
    assert_eq!(claim.drg_type, Some(DrgType::MsDrg));
    assert_eq!(claim.drg_number(), Some(790));
    assert_eq!(claim.revenue_number(), Some(174));
    assert_eq!(claim.provider.npi.as_deref(), Some("1234567890"));
}

#[test]
fn test_missing_individual_reports_claim_key() {
    let err = ClaimRow {
        individual_id: None,
        ..row()
    }
    .into_record(7)
    .unwrap_err();

    match err {
        NicuError::MissingField { row, claim_key, field } => {
            assert_eq!(row, 7);
            assert_eq!(claim_key, "C1");
            assert_eq!(field, "individual_id");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unparseable_date_is_rejected() {
    let err = ClaimRow {
        discharge_date: Some("not a date".to_string()),
        ..row()
    }
    .into_record(0)
    .unwrap_err();

    assert!(matches!(err, NicuError::InvalidDate { .. }));
    assert!(err.is_record_error());
}

#[test]
fn test_effective_dates_fall_back_to_service_dates() {
    let claim = ClaimRow {
        admission_date: None,
        discharge_date: None,
        service_thru: Some("2023-09-03".to_string()),
        ..row()
    }
    .into_record(0)
    .unwrap();

    assert_eq!(claim.effective_admission(), date(2023, 9, 1));
    assert_eq!(claim.effective_discharge(), date(2023, 9, 3));
    assert!(!claim.has_malformed_dates());
}

#[test]
fn test_non_finite_professional_fee_is_rejected() {
    let err = ClaimRow {
        paid_amount: Some(10_000.0),
        professional_fee: Some(f64::NAN),
        ..row()
    }
    .into_record(3)
    .unwrap_err();

    match &err {
        NicuError::InvalidAmount { row, claim_key, field, value } => {
            assert_eq!(*row, 3);
            assert_eq!(claim_key, "C1");
            assert_eq!(*field, "professional_fee");
            assert!(value.is_nan());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_record_error());
}

#[test]
fn test_non_finite_billed_and_paid_amounts_are_rejected() {
    let billed = ClaimRow {
        billed_amount: Some(f64::INFINITY),
        ..row()
    }
    .into_record(0)
    .unwrap_err();
    assert!(matches!(billed, NicuError::InvalidAmount { field: "billed_amount", .. }));

    let paid = ClaimRow {
        paid_amount: Some(f64::NAN),
        ..row()
    }
    .into_record(0)
    .unwrap_err();
    assert!(matches!(paid, NicuError::InvalidAmount { field: "paid_amount", .. }));

    let missing = ClaimRow {
        paid_amount: None,
        ..row()
    }
    .into_record(0)
    .unwrap_err();
    assert!(matches!(missing, NicuError::MissingField { field: "paid_amount", .. }));
}

#[test]
fn test_non_finite_fee_on_a_built_claim_falls_back_to_cpt_rule() {
    let mut claim = row().into_record(0).unwrap();
    claim.professional_fee = Some(f64::NAN);
    assert!(claim.professional_fee_amount().abs() < f64::EPSILON);

    claim.cpt_code = Some("99468".to_string());
    assert!((claim.professional_fee_amount() - 1250.0).abs() < f64::EPSILON);
}
