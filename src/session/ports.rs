use std::sync::Arc;

use anyhow::Result;

/// Read side of the user's persisted preferences.
pub trait PreferenceSource: Send + Sync {
    fn practice_duration_minutes(&self) -> u32;
    fn selected_pattern_id(&self) -> Option<String>;
    fn default_ambiance(&self) -> String;
    fn is_premium(&self) -> bool;
}

/// Write side of the user's practice statistics.
pub trait StatsSink: Send + Sync {
    fn add_session(&self, minutes: u64) -> Result<()>;
    /// Bump the daily streak. A second call on the same day is a no-op.
    fn increment_streak(&self) -> Result<()>;
}

/// Fire-and-forget haptics. Implementations must return immediately.
pub trait HapticFeedback: Send + Sync {
    fn light(&self);
    fn medium(&self);
    fn success(&self);
}

pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn light(&self) {}
    fn medium(&self) {}
    fn success(&self) {}
}

/// Everything outside the engine that a session talks to.
#[derive(Clone)]
pub struct SessionPorts {
    pub preferences: Arc<dyn PreferenceSource>,
    pub stats: Arc<dyn StatsSink>,
    pub haptics: Arc<dyn HapticFeedback>,
}

impl SessionPorts {
    pub fn new(preferences: Arc<dyn PreferenceSource>, stats: Arc<dyn StatsSink>) -> Self {
        Self {
            preferences,
            stats,
            haptics: Arc::new(NoHaptics),
        }
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn HapticFeedback>) -> Self {
        self.haptics = haptics;
        self
    }
}
