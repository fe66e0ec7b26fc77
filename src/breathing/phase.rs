use serde::{Deserialize, Serialize};

use crate::catalog::BreathingPattern;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
    HoldAfterExhale,
    Rest,
    Completed,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Inhale
    }
}

impl Phase {
    /// True for the four phases that make up a breathing cycle.
    pub fn is_breathing(&self) -> bool {
        matches!(
            self,
            Phase::Inhale | Phase::Hold | Phase::Exhale | Phase::HoldAfterExhale
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Inhale => "inhale",
            Phase::Hold => "hold",
            Phase::Exhale => "exhale",
            Phase::HoldAfterExhale => "holdAfterExhale",
            Phase::Rest => "rest",
            Phase::Completed => "completed",
        }
    }
}

/// Seconds spent in each breathing phase over a whole session. Rest is not tracked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTotals {
    pub inhale: u64,
    pub hold: u64,
    pub exhale: u64,
    pub hold_after_exhale: u64,
}

impl PhaseTotals {
    pub fn record(&mut self, phase: Phase, secs: u64) {
        match phase {
            Phase::Inhale => self.inhale += secs,
            Phase::Hold => self.hold += secs,
            Phase::Exhale => self.exhale += secs,
            Phase::HoldAfterExhale => self.hold_after_exhale += secs,
            Phase::Rest | Phase::Completed => {}
        }
    }

    pub fn get(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::Hold => self.hold,
            Phase::Exhale => self.exhale,
            Phase::HoldAfterExhale => self.hold_after_exhale,
            Phase::Rest | Phase::Completed => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.inhale + self.hold + self.exhale + self.hold_after_exhale
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseState {
    pub phase: Phase,
    pub cycles: u32,
    pub totals: PhaseTotals,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
    pub cycle_completed: bool,
}

/// Breathing phase state machine for a single pattern.
///
/// The scheduler never measures time itself. Whoever owns the phase timer
/// calls [`PhaseScheduler::advance`] when the current phase has run its
/// configured duration, passing the countdown's remaining seconds so the
/// cycle boundary can decide between another cycle and `Rest`.
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    pattern: BreathingPattern,
    state: PhaseState,
}

impl PhaseScheduler {
    pub fn new(pattern: BreathingPattern) -> Self {
        Self {
            pattern,
            state: PhaseState::default(),
        }
    }

    pub fn pattern(&self) -> &BreathingPattern {
        &self.pattern
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn cycles(&self) -> u32 {
        self.state.cycles
    }

    pub fn snapshot(&self) -> PhaseState {
        self.state
    }

    /// Configured length of the current phase. `Rest` and `Completed` have no
    /// phase timer and return `None`.
    pub fn phase_secs(&self) -> Option<u64> {
        self.secs_for(self.state.phase)
    }

    fn secs_for(&self, phase: Phase) -> Option<u64> {
        match phase {
            Phase::Inhale => Some(self.pattern.inhale()),
            Phase::Hold => Some(self.pattern.hold()),
            Phase::Exhale => Some(self.pattern.exhale()),
            Phase::HoldAfterExhale => Some(self.pattern.hold_after_exhale()),
            Phase::Rest | Phase::Completed => None,
        }
    }

    /// Leave the current phase after it ran to completion.
    ///
    /// Breathing phases always move on, crediting their full configured
    /// duration. `Rest` only moves to `Completed` once `remaining_secs` is zero.
    pub fn advance(&mut self, remaining_secs: u64) -> Option<PhaseChange> {
        let from = self.state.phase;
        let (to, cycle_completed) = match from {
            Phase::Inhale => {
                let next = if self.pattern.hold() > 0 {
                    Phase::Hold
                } else {
                    Phase::Exhale
                };
                (next, false)
            }
            Phase::Hold => (Phase::Exhale, false),
            Phase::Exhale if self.pattern.hold_after_exhale() > 0 => (Phase::HoldAfterExhale, false),
            Phase::Exhale | Phase::HoldAfterExhale => (self.cycle_boundary(remaining_secs), true),
            Phase::Rest if remaining_secs == 0 => return self.complete(),
            Phase::Rest | Phase::Completed => return None,
        };

        if let Some(secs) = self.secs_for(from) {
            self.state.totals.record(from, secs);
        }
        if cycle_completed {
            self.state.cycles += 1;
        }
        self.state.phase = to;

        Some(PhaseChange {
            from,
            to,
            cycle_completed,
        })
    }

    fn cycle_boundary(&self, remaining_secs: u64) -> Phase {
        if remaining_secs >= self.pattern.cycle_secs() {
            Phase::Inhale
        } else {
            Phase::Rest
        }
    }

    /// Pre-empt the phase in progress because the countdown ran out. The
    /// interrupted phase is not credited and no cycle is counted.
    pub fn force_rest(&mut self) -> Option<PhaseChange> {
        let from = self.state.phase;
        if !from.is_breathing() {
            return None;
        }
        self.state.phase = Phase::Rest;
        Some(PhaseChange {
            from,
            to: Phase::Rest,
            cycle_completed: false,
        })
    }

    pub fn complete(&mut self) -> Option<PhaseChange> {
        if self.state.phase != Phase::Rest {
            return None;
        }
        self.state.phase = Phase::Completed;
        Some(PhaseChange {
            from: Phase::Rest,
            to: Phase::Completed,
            cycle_completed: false,
        })
    }
}
