use std::time::Duration;

use chrono::{DateTime, Utc};
use log::error;

use crate::{breathing::PhaseState, models::SessionSummary};

use super::StatsSink;

/// Collects what a session needs to report at completion and reports it once.
#[derive(Debug)]
pub struct SummaryAggregator {
    session_id: String,
    pattern_id: String,
    started_at: DateTime<Utc>,
    emitted: bool,
}

impl SummaryAggregator {
    pub fn new(session_id: String, pattern_id: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id,
            pattern_id: pattern_id.to_string(),
            started_at,
            emitted: false,
        }
    }

    /// Package the summary and credit the stats store, adding the session
    /// before bumping the streak. Returns `None` if already emitted.
    ///
    /// `elapsed` is measured by the caller on a monotonic clock so that time
    /// spent paused is included without trusting the countdown.
    pub fn finish(
        &mut self,
        phase: &PhaseState,
        elapsed: Duration,
        ended_at: DateTime<Utc>,
        stats: &dyn StatsSink,
    ) -> Option<SessionSummary> {
        if self.emitted {
            return None;
        }
        self.emitted = true;

        let summary = SessionSummary {
            session_id: self.session_id.clone(),
            pattern_id: self.pattern_id.clone(),
            started_at: self.started_at,
            ended_at,
            total_elapsed_secs: elapsed.as_secs(),
            cycles: phase.cycles,
            phase_totals: phase.totals,
        };

        if let Err(e) = stats.add_session(summary.minutes()) {
            error!("Failed to record session {}: {}", summary.session_id, e);
        }
        if let Err(e) = stats.increment_streak() {
            error!("Failed to update streak: {}", e);
        }

        Some(summary)
    }
}
