//! Appropriateness flags for NICU episodes

use crate::config::PipelineConfig;
use crate::models::nicu::ContractType;

/// Paid amount per LOS day
#[must_use]
pub fn cost_per_day(total_paid: f64, los_days: u32) -> Option<f64> {
    (los_days > 0).then(|| total_paid / f64::from(los_days))
}

/// Cost per day below the low-paid threshold
#[must_use]
pub fn is_low_paid(cost_per_day: Option<f64>, config: &PipelineConfig) -> bool {
    cost_per_day.is_some_and(|cost| cost < config.low_paid_cost_per_day)
}

/// DRG-contracted stay shorter than the configured maximum
///
/// When revenue codes are configured, the episode's final NICU revenue code
/// must also be one of them.
#[must_use]
pub fn is_inappropriate(
    contract: ContractType,
    los_days: u32,
    final_revenue_code: Option<u32>,
    config: &PipelineConfig,
) -> bool {
    let revenue_matches = config.inappropriate_revenue_codes.is_empty()
        || final_revenue_code.is_some_and(|code| config.inappropriate_revenue_codes.contains(&code));
    contract == ContractType::Drg && los_days <= config.inappropriate_max_los_days && revenue_matches
}
