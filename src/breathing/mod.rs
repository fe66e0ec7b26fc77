pub mod clock;
pub mod phase;
pub mod session;

pub use clock::{ClockExpiry, ClockState, SessionClock};
pub use phase::{Phase, PhaseChange, PhaseScheduler, PhaseState, PhaseTotals};
pub use session::{BreathingSession, SessionStep};
