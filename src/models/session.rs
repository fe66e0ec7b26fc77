use serde::{Deserialize, Serialize};

use crate::{
    catalog::{self, Ambiance, BreathingPattern},
    session::PreferenceSource,
};

/// Shortest practice the engine will run, in seconds.
pub const MIN_TARGET_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

impl SessionStatus {
    /// Running or paused: a session exists and has not ended.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::Paused)
    }
}

/// What the host asks for when the user taps start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub pattern_id: Option<String>,
    pub duration_minutes: u32,
    pub ambiance_id: Option<String>,
}

impl SessionRequest {
    pub fn from_preferences(preferences: &dyn PreferenceSource) -> Self {
        Self {
            pattern_id: preferences.selected_pattern_id(),
            duration_minutes: preferences.practice_duration_minutes(),
            ambiance_id: Some(preferences.default_ambiance()),
        }
    }
}

/// A request with every id resolved against the catalog. Read-only for the
/// lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub pattern: BreathingPattern,
    pub target_secs: u64,
    pub ambiance: &'static Ambiance,
}

impl SessionConfig {
    pub fn resolve(request: &SessionRequest) -> Self {
        let target_secs = (u64::from(request.duration_minutes) * 60).max(MIN_TARGET_SECS);
        Self {
            pattern: *catalog::pattern_or_default(request.pattern_id.as_deref()),
            target_secs,
            ambiance: catalog::ambiance_or_default(request.ambiance_id.as_deref()),
        }
    }
}
