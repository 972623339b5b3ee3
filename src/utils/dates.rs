//! Date parsing and day arithmetic for claim data.

use chrono::NaiveDate;

/// Date formats accepted in claim extracts, tried in order
pub const CLAIM_DATE_FORMATS: [&str; 4] = [
    "%Y-%m-%d", // ISO format: 2023-01-15
    "%m/%d/%Y", // US: 01/15/2023
    "%Y%m%d",   // Compact: 20230115
    "%Y/%m/%d", // 2023/01/15
];

/// Parse a claim date string with multiple format attempts
///
/// Timestamps such as `2023-01-15 00:00:00` or `2023-01-15T00:00:00` are
/// truncated to their date part.
#[must_use]
pub fn parse_claim_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let s = match s.find(['T', ' ']) {
        Some(idx) if idx >= 8 => &s[..idx],
        _ => s,
    };

    CLAIM_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Signed number of days from `from` to `to`
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Length of stay in days for an admit/discharge pair
///
/// Same-day stays count as one day. Returns `None` when the discharge
/// precedes the admission.
#[must_use]
pub fn length_of_stay(admit: NaiveDate, discharge: NaiveDate) -> Option<u32> {
    let days = days_between(admit, discharge);
    if days < 0 {
        None
    } else {
        Some(u32::try_from(days.max(1)).unwrap_or(u32::MAX))
    }
}
