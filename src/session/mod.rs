//! Session orchestration: the host-facing controller, its timer driver, the
//! summary aggregator and the ports through which a session reaches the
//! outside world.

pub mod aggregator;
pub mod controller;
mod driver;
pub mod events;
pub mod ports;

pub use aggregator::SummaryAggregator;
pub use controller::SessionController;
pub use events::{SessionEvent, SessionSnapshot};
pub use ports::{HapticFeedback, NoHaptics, PreferenceSource, SessionPorts, StatsSink};
