pub mod session;
pub mod summary;

pub use session::{SessionConfig, SessionRequest, SessionStatus, MIN_TARGET_SECS};
pub use summary::SessionSummary;
