//! Readmission linkage model

use serde::{Deserialize, Serialize};

/// Directed link from an origin episode to its readmission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmissionLink {
    pub individual_id: String,
    /// Episode number of the origin
    pub origin_episode: u32,
    /// Episode number of the readmission
    pub successor_episode: u32,
    /// Days from origin discharge to successor admission
    pub days_between: i64,
}

/// Readmission chain rolled up from one origin episode
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadmissionSummary {
    /// Number of episodes in the chain after the origin
    pub count: u32,
    /// Paid amount of those episodes
    pub paid: f64,
    /// LOS of those episodes
    pub los_days: u32,
}
