use serde::Serialize;

use crate::{
    audio::AmbientSnapshot,
    breathing::{ClockState, Phase, PhaseState},
    models::{SessionStatus, SessionSummary},
};

/// Everything the UI layer hears from a running session.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    Started {
        session_id: String,
        pattern_id: String,
        ambiance_id: String,
        target_secs: u64,
    },
    #[serde(rename_all = "camelCase")]
    PhaseChanged { phase: Phase, cycles: u32 },
    #[serde(rename_all = "camelCase")]
    Tick { remaining_secs: u64 },
    Paused,
    Resumed,
    #[serde(rename_all = "camelCase")]
    Completed { summary: SessionSummary },
    Stopped,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub pattern_id: Option<&'static str>,
    pub ambiance_id: Option<&'static str>,
    pub phase: Option<PhaseState>,
    pub clock: Option<ClockState>,
    /// Present while an ambient loop is engaged.
    pub ambient: Option<AmbientSnapshot>,
}
