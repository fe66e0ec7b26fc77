//! The timer task behind a running session.
//!
//! Owns the two awaited timers: the one-second countdown interval and the
//! current phase's one-shot timer. Both are dropped when the task is
//! cancelled, so pausing really stops them.

use std::sync::Arc;

use tokio::{
    task::JoinHandle,
    time::{self, Duration, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    breathing::{Phase, SessionStep},
    config::TICK_INTERVAL,
};

use super::{controller::Shared, SessionEvent};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error};

pub(super) struct Driver {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl Driver {
    pub(super) fn spawn(shared: Arc<Shared>) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(drive(shared, cancel.clone()));
        Self { handle, cancel }
    }

    /// Cancel both timers and wait for the task to exit.
    pub(super) async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                log_error!("session driver task failed: {}", e);
            }
        }
    }
}

enum Trigger {
    Tick { at: Instant, phase_due: bool },
    PhaseElapsed { at: Instant },
}

async fn drive(shared: Arc<Shared>, cancel: CancellationToken) {
    let origin = Instant::now();
    let mut ticker = time::interval_at(origin + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // A phase entered or resumed always gets its full configured duration.
    let mut deadline = shared
        .current_phase_secs()
        .await
        .map(|secs| origin + Duration::from_secs(secs));

    loop {
        // Biased so that a tick and a phase timer due on the same instant are
        // handled as one tick with the phase boundary folded in.
        let trigger = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log_debug!("session driver cancelled");
                break;
            }
            at = ticker.tick() => Trigger::Tick {
                at,
                phase_due: deadline.is_some_and(|due| due <= at),
            },
            at = phase_timer(deadline) => Trigger::PhaseElapsed { at },
        };

        let (at, from_phase_timer, applied) = match trigger {
            Trigger::Tick { at, phase_due } => (
                at,
                false,
                shared.apply(|session| session.on_tick(phase_due)).await,
            ),
            Trigger::PhaseElapsed { at } => (
                at,
                true,
                shared.apply(|session| session.on_phase_elapsed()).await,
            ),
        };
        let Some(applied) = applied else {
            log_debug!("session no longer running, driver exiting");
            break;
        };

        let mut completed = false;
        let mut phase_changed = false;
        for step in &applied.steps {
            match step {
                SessionStep::Ticked { remaining_secs } => {
                    shared.emit(SessionEvent::Tick {
                        remaining_secs: *remaining_secs,
                    });
                }
                SessionStep::PhaseChanged(change) => {
                    phase_changed = true;
                    log_debug!(
                        "phase {} -> {} (cycles {})",
                        change.from.as_str(),
                        change.to.as_str(),
                        applied.cycles
                    );
                    shared.emit(SessionEvent::PhaseChanged {
                        phase: change.to,
                        cycles: applied.cycles,
                    });
                    if change.to != Phase::Completed {
                        shared.ports.haptics.light();
                    }
                }
                SessionStep::Completed => completed = true,
            }
        }

        if completed {
            shared.finish().await;
            break;
        }

        // Entering rest leaves no phase timer, so a pending one is dropped.
        if phase_changed || from_phase_timer {
            deadline = applied
                .phase_secs
                .map(|secs| at + Duration::from_secs(secs));
        }
    }
}

/// Outcome of feeding one timer event to the session.
pub(super) struct Applied {
    pub(super) steps: Vec<SessionStep>,
    pub(super) phase_secs: Option<u64>,
    pub(super) cycles: u32,
}

async fn phase_timer(deadline: Option<Instant>) -> Instant {
    match deadline {
        Some(at) => {
            time::sleep_until(at).await;
            at
        }
        None => std::future::pending().await,
    }
}
