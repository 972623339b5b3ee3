//! Claim record model
//!
//! This module contains the claim record consumed by the pipeline, together
//! with the flat row layout used at the Arrow boundary. A claim is one billed
//! service line for an individual and is immutable once ingested.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NicuError, Result};
use crate::utils::dates::parse_claim_date;

/// Maximum number of diagnosis codes carried per claim
pub const MAX_DIAGNOSIS_CODES: usize = 5;

/// Setting in which a claim was billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// Inpatient facility or professional service
    Inpatient,
    /// Emergency room service
    Emergency,
    /// Anything else
    Outpatient,
}

impl ServiceType {
    /// Parse a service-type code as found in claim extracts
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "IP" | "I" | "INPATIENT" => Some(Self::Inpatient),
            "ER" | "E" | "ED" | "EMERGENCY" => Some(Self::Emergency),
            "OP" | "O" | "OUTPATIENT" => Some(Self::Outpatient),
            _ => None,
        }
    }

    /// Short code used in output tables
    #[must_use]
    pub const fn as_code(self) -> &'static str {
        match self {
            Self::Inpatient => "IP",
            Self::Emergency => "ER",
            Self::Outpatient => "OP",
        }
    }

    /// Whether claims of this type can contribute to a hospital stay
    #[must_use]
    pub const fn is_hospital_stay(self) -> bool {
        matches!(self, Self::Inpatient | Self::Emergency)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// DRG grouper a claim's DRG code was assigned by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrgType {
    /// Medicare Severity DRG
    MsDrg,
    /// All Patient Refined DRG
    AprDrg,
}

impl DrgType {
    /// Parse a DRG type indicator
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().replace(['-', '_', ' '], "").as_str() {
            "MS" | "MSDRG" | "M" => Some(Self::MsDrg),
            "APR" | "APRDRG" | "A" => Some(Self::AprDrg),
            _ => None,
        }
    }
}

/// Billing provider identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderId {
    /// National Provider Identifier
    pub npi: Option<String>,
    /// Tax Identification Number
    pub tin: Option<String>,
    /// Full provider name
    pub name: Option<String>,
    /// Provider state
    pub state: Option<String>,
}

/// One billed claim line
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
    /// Stable claim key
    pub claim_key: String,
    /// Individual the claim belongs to
    pub individual_id: String,
    /// Billed setting, if supplied by the extract
    pub service_type: Option<ServiceType>,
    /// Place-of-service code
    pub place_of_service: Option<String>,
    /// First date of service
    pub service_from: NaiveDate,
    /// Last date of service
    pub service_thru: Option<NaiveDate>,
    /// Facility admission date
    pub admission_date: Option<NaiveDate>,
    /// Facility discharge date
    pub discharge_date: Option<NaiveDate>,
    /// Net paid amount
    pub paid_amount: f64,
    /// Submitted charge
    pub billed_amount: Option<f64>,
    /// Diagnosis codes in billed order, at most [`MAX_DIAGNOSIS_CODES`]
    pub diagnosis_codes: Vec<String>,
    /// Facility revenue code
    pub revenue_code: Option<String>,
    /// DRG code (MS-DRG or APR-DRG)
    pub drg_code: Option<String>,
    /// DRG grouper indicator
    pub drg_type: Option<DrgType>,
    /// CPT/HCPCS procedure code of professional lines
    pub cpt_code: Option<String>,
    /// UB-04 patient discharge status code
    pub discharge_status: Option<String>,
    /// Billing provider
    pub provider: ProviderId,
    /// Professional-fee amount, when the extract splits it out
    pub professional_fee: Option<f64>,
}

impl ClaimRecord {
    /// Create a claim with the required fields and everything else empty
    #[must_use]
    pub fn new(
        claim_key: impl Into<String>,
        individual_id: impl Into<String>,
        service_from: NaiveDate,
        paid_amount: f64,
    ) -> Self {
        Self {
            claim_key: claim_key.into(),
            individual_id: individual_id.into(),
            service_type: None,
            place_of_service: None,
            service_from,
            service_thru: None,
            admission_date: None,
            discharge_date: None,
            paid_amount,
            billed_amount: None,
            diagnosis_codes: Vec::new(),
            revenue_code: None,
            drg_code: None,
            drg_type: None,
            cpt_code: None,
            discharge_status: None,
            provider: ProviderId::default(),
            professional_fee: None,
        }
    }

    /// Admission date, falling back to the first service date
    #[must_use]
    pub fn effective_admission(&self) -> NaiveDate {
        self.admission_date.unwrap_or(self.service_from)
    }

    /// Discharge date, falling back to the last service date and then the admission
    #[must_use]
    pub fn effective_discharge(&self) -> NaiveDate {
        self.discharge_date
            .or(self.service_thru)
            .unwrap_or_else(|| self.effective_admission())
    }

    /// Whether the claim is discharged before it is admitted
    #[must_use]
    pub fn has_malformed_dates(&self) -> bool {
        self.effective_discharge() < self.effective_admission()
    }

    /// Professional-fee portion of the paid amount
    ///
    /// Uses the explicit amount when present and finite; otherwise
    /// professional lines (those with a CPT code) count their whole paid amount.
    #[must_use]
    pub fn professional_fee_amount(&self) -> f64 {
        match self.professional_fee {
            Some(fee) if fee.is_finite() => fee,
            _ if has_value(self.cpt_code.as_deref()) => self.paid_amount,
            _ => 0.0,
        }
    }

    /// Whether this is a professional (CPT-billed) line
    #[must_use]
    pub fn is_professional(&self) -> bool {
        has_value(self.cpt_code.as_deref())
    }

    /// Numeric revenue code, ignoring leading zeros
    #[must_use]
    pub fn revenue_number(&self) -> Option<u32> {
        self.revenue_code.as_deref().and_then(parse_numeric_code)
    }

    /// Numeric three-digit DRG base
    #[must_use]
    pub fn drg_number(&self) -> Option<u32> {
        self.drg_code.as_deref().and_then(|code| {
            let code = code.trim();
            code.get(..3.min(code.len())).and_then(parse_numeric_code)
        })
    }

    /// Whether any diagnosis code is present
    #[must_use]
    pub fn has_diagnosis(&self) -> bool {
        self.diagnosis_codes.iter().any(|code| !code.trim().is_empty())
    }
}

/// Parse a numeric billing code such as `0174` or `791`
#[must_use]
pub fn parse_numeric_code(code: &str) -> Option<u32> {
    let code = code.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}

fn has_value(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Flat claim row as it arrives from the ingestion layer
///
/// Every column is optional at this level so that missing required values
/// can be reported with the offending row and claim key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimRow {
    pub claim_key: Option<String>,
    pub individual_id: Option<String>,
    pub service_type: Option<String>,
    pub place_of_service: Option<String>,
    pub service_from: Option<String>,
    pub service_thru: Option<String>,
    pub admission_date: Option<String>,
    pub discharge_date: Option<String>,
    pub paid_amount: Option<f64>,
    pub billed_amount: Option<f64>,
    pub diag_1: Option<String>,
    pub diag_2: Option<String>,
    pub diag_3: Option<String>,
    pub diag_4: Option<String>,
    pub diag_5: Option<String>,
    pub revenue_code: Option<String>,
    pub drg_code: Option<String>,
    pub drg_type: Option<String>,
    pub cpt_code: Option<String>,
    pub discharge_status: Option<String>,
    pub provider_npi: Option<String>,
    pub provider_tin: Option<String>,
    pub provider_name: Option<String>,
    pub provider_state: Option<String>,
    pub professional_fee: Option<f64>,
}

/// Columns that must be present in every claim extract
pub const REQUIRED_CLAIM_COLUMNS: [&str; 4] =
    ["claim_key", "individual_id", "service_from", "paid_amount"];

impl ClaimRow {
    /// Validate the row and convert it into a [`ClaimRecord`]
    ///
    /// `row` is the zero-based position in the claim stream and is only used
    /// for error context.
    pub fn into_record(self, row: usize) -> Result<ClaimRecord> {
        let claim_key = non_empty(self.claim_key)
            .ok_or_else(|| NicuError::missing_field(row, None, "claim_key"))?;
        let individual_id = non_empty(self.individual_id)
            .ok_or_else(|| NicuError::missing_field(row, Some(&claim_key), "individual_id"))?;

        let date = |value: Option<String>, field: &str| -> Result<Option<NaiveDate>> {
            match non_empty(value) {
                None => Ok(None),
                Some(raw) => parse_claim_date(&raw).map(Some).ok_or_else(|| {
                    NicuError::invalid_date(row, &claim_key, format!("{field} = `{raw}`"))
                }),
            }
        };

        let service_from = date(self.service_from, "service_from")?
            .ok_or_else(|| NicuError::missing_field(row, Some(&claim_key), "service_from"))?;
        let service_thru = date(self.service_thru, "service_thru")?;
        let admission_date = date(self.admission_date, "admission_date")?;
        let discharge_date = date(self.discharge_date, "discharge_date")?;

        let amount = |value: Option<f64>, field: &'static str| -> Result<Option<f64>> {
            match value {
                Some(v) if !v.is_finite() => Err(NicuError::invalid_amount(row, &claim_key, field, v)),
                other => Ok(other),
            }
        };
        let paid_amount = amount(self.paid_amount, "paid_amount")?
            .ok_or_else(|| NicuError::missing_field(row, Some(&claim_key), "paid_amount"))?;
        let billed_amount = amount(self.billed_amount, "billed_amount")?;
        let professional_fee = amount(self.professional_fee, "professional_fee")?;

        let diagnosis_codes = [self.diag_1, self.diag_2, self.diag_3, self.diag_4, self.diag_5]
            .into_iter()
            .filter_map(non_empty)
            .collect();

        Ok(ClaimRecord {
            service_type: self.service_type.as_deref().and_then(ServiceType::from_code),
            place_of_service: non_empty(self.place_of_service),
            service_from,
            service_thru,
            admission_date,
            discharge_date,
            paid_amount,
            billed_amount,
            diagnosis_codes,
            revenue_code: non_empty(self.revenue_code),
            drg_code: non_empty(self.drg_code),
            drg_type: self.drg_type.as_deref().and_then(DrgType::from_code),
            cpt_code: non_empty(self.cpt_code),
            discharge_status: non_empty(self.discharge_status),
            provider: ProviderId {
                npi: non_empty(self.provider_npi),
                tin: non_empty(self.provider_tin),
                name: non_empty(self.provider_name),
                state: non_empty(self.provider_state),
            },
            professional_fee,
            claim_key,
            individual_id,
        })
    }
}
