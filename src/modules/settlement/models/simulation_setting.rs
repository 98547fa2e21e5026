use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Process-wide settlement mode toggle. A single row, mutated only through a
/// version compare-and-set so concurrent admin actions cannot interleave
/// into a half-applied cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationModeSetting {
    pub enabled: bool,
    pub version: i64,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
