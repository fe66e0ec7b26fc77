use crate::catalog::BreathingPattern;

use super::{ClockExpiry, ClockState, Phase, PhaseChange, PhaseScheduler, PhaseState, SessionClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Ticked { remaining_secs: u64 },
    PhaseChanged(PhaseChange),
    Completed,
}

/// Couples the phase scheduler with the countdown for one practice run.
///
/// Owns no timers. The driver reports the two kinds of timer events it owns:
/// a phase timer running out ([`BreathingSession::on_phase_elapsed`]) and a
/// countdown tick ([`BreathingSession::on_tick`]). When both fall on the same
/// instant the driver reports them together through `on_tick(true)`, which
/// applies the tick, then the due phase boundary, then the zero check.
#[derive(Debug, Clone)]
pub struct BreathingSession {
    scheduler: PhaseScheduler,
    clock: SessionClock,
}

impl BreathingSession {
    pub fn new(pattern: BreathingPattern, target_secs: u64) -> Self {
        Self {
            scheduler: PhaseScheduler::new(pattern),
            clock: SessionClock::new(target_secs),
        }
    }

    pub fn pattern(&self) -> &BreathingPattern {
        self.scheduler.pattern()
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    /// Full configured length of the current phase, `None` while resting.
    pub fn phase_secs(&self) -> Option<u64> {
        self.scheduler.phase_secs()
    }

    pub fn phase_state(&self) -> PhaseState {
        self.scheduler.snapshot()
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn is_completed(&self) -> bool {
        self.scheduler.phase() == Phase::Completed
    }

    pub fn start(&mut self) {
        if !self.is_completed() {
            self.clock.start();
        }
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        if !self.is_completed() {
            self.clock.resume();
        }
    }

    /// The current phase ran for its whole configured duration.
    pub fn on_phase_elapsed(&mut self) -> Vec<SessionStep> {
        if !self.clock.is_running() || !self.scheduler.phase().is_breathing() {
            return Vec::new();
        }
        self.scheduler
            .advance(self.clock.remaining_secs())
            .map(SessionStep::PhaseChanged)
            .into_iter()
            .collect()
    }

    pub fn on_tick(&mut self, phase_due: bool) -> Vec<SessionStep> {
        let Some(remaining_secs) = self.clock.tick() else {
            return Vec::new();
        };

        let mut steps = vec![SessionStep::Ticked { remaining_secs }];
        if phase_due && self.scheduler.phase().is_breathing() {
            if let Some(change) = self.scheduler.advance(remaining_secs) {
                steps.push(SessionStep::PhaseChanged(change));
            }
        }

        match self.clock.expiry(self.scheduler.phase()) {
            // A forced rest has no time left to run, so it completes at once.
            Some(ClockExpiry::ForceRest) => {
                if let Some(change) = self.scheduler.force_rest() {
                    steps.push(SessionStep::PhaseChanged(change));
                    self.complete_into(&mut steps);
                }
            }
            Some(ClockExpiry::Complete) => self.complete_into(&mut steps),
            None => {}
        }

        steps
    }

    fn complete_into(&mut self, steps: &mut Vec<SessionStep>) {
        if let Some(change) = self.scheduler.complete() {
            self.clock.pause();
            steps.push(SessionStep::PhaseChanged(change));
            steps.push(SessionStep::Completed);
        }
    }
}
