use serde::{Deserialize, Serialize};

use super::Phase;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClockState {
    pub target_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
}

/// What the countdown demands once it has run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockExpiry {
    /// Out of time mid-cycle: cut the current phase short and rest.
    ForceRest,
    /// Out of time while resting: the session is over.
    Complete,
}

/// One-second countdown over the target practice duration.
///
/// Ticks are counted, not measured: pausing stops the count and resuming
/// continues from the stored value with no catch-up.
#[derive(Debug, Clone)]
pub struct SessionClock {
    state: ClockState,
}

impl SessionClock {
    pub fn new(target_secs: u64) -> Self {
        Self {
            state: ClockState {
                target_secs,
                remaining_secs: target_secs,
                running: false,
            },
        }
    }

    pub fn snapshot(&self) -> ClockState {
        self.state
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.state.target_secs - self.state.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn start(&mut self) {
        self.state.running = true;
    }

    pub fn pause(&mut self) {
        self.state.running = false;
    }

    pub fn resume(&mut self) {
        self.start();
    }

    /// Count one second down. Returns the new remaining value, or `None` when
    /// the clock is not running.
    pub fn tick(&mut self) -> Option<u64> {
        if !self.state.running {
            return None;
        }
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        Some(self.state.remaining_secs)
    }

    pub fn expiry(&self, phase: Phase) -> Option<ClockExpiry> {
        if self.state.remaining_secs > 0 {
            return None;
        }
        match phase {
            Phase::Rest => Some(ClockExpiry::Complete),
            Phase::Completed => None,
            _ => Some(ClockExpiry::ForceRest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_clock_does_not_tick() {
        let mut clock = SessionClock::new(60);
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.remaining_secs(), 60);
    }

    #[test]
    fn countdown_floors_at_zero() {
        let mut clock = SessionClock::new(2);
        clock.start();
        assert_eq!(clock.tick(), Some(1));
        assert_eq!(clock.tick(), Some(0));
        assert_eq!(clock.tick(), Some(0));
        assert_eq!(clock.elapsed_secs(), 2);
    }

    #[test]
    fn pause_freezes_remaining() {
        let mut clock = SessionClock::new(10);
        clock.start();
        clock.tick();
        clock.pause();
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.tick(), None);
        clock.resume();
        assert_eq!(clock.tick(), Some(8));
    }

    #[test]
    fn expiry_depends_on_phase() {
        let mut clock = SessionClock::new(1);
        assert_eq!(clock.expiry(Phase::Inhale), None);

        clock.start();
        clock.tick();
        assert_eq!(clock.expiry(Phase::Exhale), Some(ClockExpiry::ForceRest));
        assert_eq!(clock.expiry(Phase::Rest), Some(ClockExpiry::Complete));
        assert_eq!(clock.expiry(Phase::Completed), None);
    }
}
