//! Parquet file operations
//!
//! This module reads claim extracts into [`ClaimRecord`]s and writes the
//! pipeline's output collections. Input batches are normalised to the fixed
//! claim schema before being decoded with `serde_arrow`; output schemas are
//! traced from the record types so empty outputs still carry every column.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, new_null_array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::{NicuError, Result};
use crate::models::claim::{ClaimRecord, ClaimRow, REQUIRED_CLAIM_COLUMNS};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Claim columns carrying amounts; every other column is read as text
const AMOUNT_COLUMNS: [&str; 3] = ["paid_amount", "billed_amount", "professional_fee"];

/// All claim columns in the order of [`ClaimRow`]
pub const CLAIM_COLUMNS: [&str; 25] = [
    "claim_key",
    "individual_id",
    "service_type",
    "place_of_service",
    "service_from",
    "service_thru",
    "admission_date",
    "discharge_date",
    "paid_amount",
    "billed_amount",
    "diag_1",
    "diag_2",
    "diag_3",
    "diag_4",
    "diag_5",
    "revenue_code",
    "drg_code",
    "drg_type",
    "cpt_code",
    "discharge_status",
    "provider_npi",
    "provider_tin",
    "provider_name",
    "provider_state",
    "professional_fee",
];

/// The schema claim batches are normalised to
#[must_use]
pub fn claim_schema() -> SchemaRef {
    let fields: Vec<Field> = CLAIM_COLUMNS
        .iter()
        .map(|name| {
            let data_type = if AMOUNT_COLUMNS.contains(name) {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(*name, data_type, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}

/// Check that a claim extract carries every required column
pub fn validate_claim_schema(schema: &Schema) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_CLAIM_COLUMNS
        .iter()
        .copied()
        .filter(|name| schema.field_with_name(name).is_err())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(NicuError::Schema(format!(
            "claim extract is missing required columns: {}",
            missing.join(", ")
        )))
    }
}

/// Cast a batch to the claim schema, filling absent optional columns with nulls
pub fn normalize_claim_batch(batch: &RecordBatch) -> Result<RecordBatch> {
    validate_claim_schema(&batch.schema())?;
    let target = claim_schema();
    let columns: Vec<ArrayRef> = target
        .fields()
        .iter()
        .map(|field| match batch.column_by_name(field.name()) {
            Some(column) if column.data_type() == field.data_type() => Ok(Arc::clone(column)),
            Some(column) => cast(column, field.data_type()).map_err(NicuError::from),
            None => Ok(new_null_array(field.data_type(), batch.num_rows())),
        })
        .collect::<Result<_>>()?;
    Ok(RecordBatch::try_new(target, columns)?)
}

/// Decode one batch into claim records
///
/// `row_offset` is the number of rows read before this batch and is used to
/// report the position of an invalid record.
pub fn claims_from_batch(batch: &RecordBatch, row_offset: usize) -> Result<Vec<ClaimRecord>> {
    let normalized = normalize_claim_batch(batch)?;
    let rows: Vec<ClaimRow> = serde_arrow::from_record_batch(&normalized)?;
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| row.into_record(row_offset + idx))
        .collect()
}

/// Read a claims Parquet file
///
/// Fails on the first structurally invalid record.
pub fn read_claims(path: &Path) -> Result<Vec<ClaimRecord>> {
    log_operation_start("Reading claims from", path);
    let start = Instant::now();

    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    validate_claim_schema(builder.schema())?;
    let reader = builder
        .with_batch_size(get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE))
        .build()?;

    let mut claims = Vec::new();
    for batch in reader {
        let batch = batch?;
        let decoded = claims_from_batch(&batch, claims.len())?;
        claims.extend(decoded);
    }

    log_operation_complete("read", path, claims.len(), Some(start.elapsed()));
    Ok(claims)
}

/// Convert records to a batch with a schema traced from their type
pub fn records_to_batch<T>(records: &[T]) -> Result<RecordBatch>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let fields = Vec::<FieldRef>::from_type::<T>(
        TracingOptions::default()
            .allow_null_fields(true)
            .enums_without_data_as_strings(true),
    )?;
    Ok(serde_arrow::to_record_batch(&fields, &records)?)
}

/// Write records to a Parquet file
pub fn write_records<T>(path: &Path, records: &[T]) -> Result<()>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    log_operation_start("Writing", path);
    let start = Instant::now();

    let batch = records_to_batch(records)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    log_operation_complete("wrote", path, records.len(), Some(start.elapsed()));
    Ok(())
}

/// Write records to a pretty-printed JSON file
pub fn write_json<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    log_operation_start("Writing", path);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), records)?;
    log_operation_complete("wrote", path, records.len(), None);
    Ok(())
}
