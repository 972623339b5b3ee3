use std::fs::File;

use nicu_episodes::models::claim::ClaimRow;
use nicu_episodes::utils::io::{read_claims, write_json, write_records};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::utils::{ClaimBuilder, day, run, scratch_dir};

fn claim_row(key: &str, individual: &str, admit: &str, discharge: &str) -> ClaimRow {
    ClaimRow {
        claim_key: Some(key.to_string()),
        individual_id: Some(individual.to_string()),
        service_type: Some("IP".to_string()),
        service_from: Some(admit.to_string()),
        admission_date: Some(admit.to_string()),
        discharge_date: Some(discharge.to_string()),
        paid_amount: Some(2500.0),
        diag_1: Some("Z38.00".to_string()),
        revenue_code: Some("0173".to_string()),
        ..ClaimRow::default()
    }
}

#[test]
fn test_claims_parquet_feeds_the_pipeline() {
    let dir = scratch_dir("claims_parquet");
    let path = dir.join("claims.parquet");
    let rows = vec![
        claim_row("C1", "P1", "2023-09-01", "2023-09-08"),
        claim_row("C2", "P1", "2023-09-10", "2023-09-12"),
        claim_row("C3", "P2", "2023-10-01", "2023-10-02"),
    ];
    write_records(&path, &rows).unwrap();

    let claims = read_claims(&path).unwrap();
    assert_eq!(claims.len(), 3);
    assert_eq!(claims[1].claim_key, "C2");

    let output = run(claims);
    assert_eq!(output.newborns.len(), 2);
    assert_eq!(output.episodes.len(), 2);
    assert_eq!(output.nicu_episodes.len(), 2);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_invalid_claim_row_fails_the_read() {
    let dir = scratch_dir("claims_invalid");
    let path = dir.join("claims.parquet");
    let mut bad = claim_row("C2", "P1", "2023-09-10", "2023-09-12");
    bad.paid_amount = None;
    write_records(&path, &[claim_row("C1", "P1", "2023-09-01", "2023-09-08"), bad]).unwrap();

    let err = read_claims(&path).unwrap_err();
    assert!(err.is_record_error());
    assert!(err.to_string().contains("C2"));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_outputs_are_written_with_every_row() {
    let dir = scratch_dir("outputs");
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", day(0), day(2)).build(),
        ClaimBuilder::new("C2", "P2", day(0), day(9)).revenue("0174").build(),
    ]);

    let newborns = dir.join("newborns.parquet");
    write_records(&newborns, &output.newborns).unwrap();
    let nicu = dir.join("nicu_episodes.parquet");
    write_records(&nicu, &output.nicu_episodes).unwrap();
    let summary = dir.join("cohort_summary.json");
    write_json(&summary, &output.cohort_summaries).unwrap();

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&newborns).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let rows: usize = reader.map(|batch| batch.unwrap().num_rows()).sum();
    assert_eq!(rows, 2);

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&nicu).unwrap()).unwrap();
    assert!(builder.schema().field_with_name("acuity_level").is_ok());
    assert!(builder.schema().field_with_name("pct_professional_fees").is_ok());

    let json: serde_json::Value =
        serde_json::from_reader(File::open(&summary).unwrap()).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(3));
    assert_eq!(json[0]["cohort"], "Overall");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_empty_output_still_writes_a_schema() {
    let dir = scratch_dir("empty_output");
    let path = dir.join("rejected.parquet");
    write_records::<nicu_episodes::models::RejectedEpisode>(&path, &[]).unwrap();

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap()).unwrap();
    assert!(builder.schema().field_with_name("reason").is_ok());
    std::fs::remove_dir_all(dir).ok();
}
