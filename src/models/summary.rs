use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::breathing::PhaseTotals;

/// Results of one completed session, handed to the results view and the
/// stats store, then dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub pattern_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Wall-clock seconds from start to completion, pauses included.
    pub total_elapsed_secs: u64,
    pub cycles: u32,
    pub phase_totals: PhaseTotals,
}

impl SessionSummary {
    /// Whole minutes credited to the stats store.
    pub fn minutes(&self) -> u64 {
        self.total_elapsed_secs / 60
    }
}
