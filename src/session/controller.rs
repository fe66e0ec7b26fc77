use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use log::{debug, info, warn};
use tokio::{
    sync::{
        mpsc::{self, UnboundedReceiver, UnboundedSender},
        Mutex,
    },
    time::Instant,
};
use uuid::Uuid;

use crate::{
    audio::{AmbientLoopPlayer, AudioBackend},
    breathing::{BreathingSession, SessionStep},
    catalog::{self, Ambiance},
    config::EngineConfig,
    models::{SessionConfig, SessionRequest, SessionStatus},
};

use super::{
    driver::{Applied, Driver},
    SessionEvent, SessionPorts, SessionSnapshot, SummaryAggregator,
};

#[derive(Default)]
struct ControllerState {
    status: SessionStatus,
    session_id: Option<String>,
    config: Option<SessionConfig>,
    session: Option<BreathingSession>,
    aggregator: Option<SummaryAggregator>,
    /// Monotonic start instant; total elapsed time includes pauses.
    started: Option<Instant>,
}

/// State shared between the controller and its driver task.
pub(super) struct Shared {
    state: Mutex<ControllerState>,
    /// Engaged or preloaded ambient loop. `None` means silence.
    ambient: Mutex<Option<AmbientLoopPlayer>>,
    pub(super) ports: SessionPorts,
    events: UnboundedSender<SessionEvent>,
    audio: Option<Arc<dyn AudioBackend>>,
    config: EngineConfig,
}

impl Shared {
    pub(super) fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("Session event dropped: no listener");
        }
    }

    pub(super) async fn current_phase_secs(&self) -> Option<u64> {
        let state = self.state.lock().await;
        state.session.as_ref().and_then(BreathingSession::phase_secs)
    }

    /// Feed one timer event to the running session. `None` once the session
    /// is no longer running.
    pub(super) async fn apply<F>(&self, step: F) -> Option<Applied>
    where
        F: FnOnce(&mut BreathingSession) -> Vec<SessionStep>,
    {
        let mut state = self.state.lock().await;
        if state.status != SessionStatus::Running {
            return None;
        }
        let session = state.session.as_mut()?;
        let steps = step(session);
        Some(Applied {
            steps,
            phase_secs: session.phase_secs(),
            cycles: session.phase_state().cycles,
        })
    }

    /// Natural completion: silence the ambient loop, report stats once, then
    /// tell the UI.
    pub(super) async fn finish(&self) {
        let (mut aggregator, phase, elapsed) = {
            let mut state = self.state.lock().await;
            if state.status != SessionStatus::Running {
                return;
            }
            state.status = SessionStatus::Completed;
            let Some(session) = state.session.as_ref() else {
                return;
            };
            let phase = session.phase_state();
            let elapsed = state.started.map(|at| at.elapsed()).unwrap_or_default();
            let Some(aggregator) = state.aggregator.take() else {
                return;
            };
            (aggregator, phase, elapsed)
        };

        self.teardown_ambient().await;

        if let Some(summary) =
            aggregator.finish(&phase, elapsed, Utc::now(), self.ports.stats.as_ref())
        {
            info!(
                "Session {} completed: {} cycles in {}s",
                summary.session_id, summary.cycles, summary.total_elapsed_secs
            );
            self.emit(SessionEvent::Completed { summary });
            self.ports.haptics.success();
        }
    }

    fn open_player(&self, ambiance: &'static Ambiance) -> Option<AmbientLoopPlayer> {
        let Some(asset) = ambiance.sound_asset(&self.config.asset_root) else {
            info!("Ambiance '{}' has no sound; running silently", ambiance.id);
            return None;
        };
        let Some(backend) = self.audio.as_ref() else {
            info!("No audio backend; running '{}' silently", ambiance.id);
            return None;
        };
        match AmbientLoopPlayer::create(
            backend.as_ref(),
            ambiance.id,
            &asset,
            self.config.ambient.clone(),
        ) {
            Ok(player) => Some(player),
            Err(e) => {
                warn!("Ambient sound for '{}' unavailable: {:#}", ambiance.id, e);
                None
            }
        }
    }

    /// Make sure the ambient slot holds a player for `ambiance`, reusing a
    /// preloaded one when it matches.
    async fn ensure_player(&self, ambiance: &'static Ambiance) {
        let mut slot = self.ambient.lock().await;
        if slot
            .as_ref()
            .is_some_and(|player| player.ambiance_id() == ambiance.id)
        {
            return;
        }
        if let Some(mut old) = slot.take() {
            old.stop().await;
        }
        *slot = self.open_player(ambiance);
    }

    async fn start_ambient(&self, ambiance: &'static Ambiance) {
        self.ensure_player(ambiance).await;
        if let Some(player) = self.ambient.lock().await.as_mut() {
            if !player.is_started() {
                player.start().await;
            }
        }
    }

    async fn teardown_ambient(&self) {
        if let Some(mut player) = self.ambient.lock().await.take() {
            player.stop().await;
        }
    }
}

/// Host-facing handle on the breathing session engine.
///
/// Commands are serialized through the driver slot lock so that a pause or
/// stop always sees a quiescent driver.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
    driver: Arc<Mutex<Option<Driver>>>,
}

impl SessionController {
    pub fn new(
        ports: SessionPorts,
        audio: Option<Arc<dyn AudioBackend>>,
        config: EngineConfig,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ControllerState::default()),
                ambient: Mutex::new(None),
                ports,
                events,
                audio,
                config,
            }),
            driver: Arc::new(Mutex::new(None)),
        };
        (controller, rx)
    }

    /// Start a new session, or resume the paused one.
    pub async fn start(&self, request: SessionRequest) -> Result<SessionSnapshot> {
        let mut driver = self.driver.lock().await;

        let status = self.shared.state.lock().await.status;
        match status {
            SessionStatus::Running => bail!("session already running"),
            SessionStatus::Paused => {
                drop(driver);
                return self.resume().await;
            }
            _ => {}
        }

        // A completed session's driver has already exited; reap it.
        if let Some(old) = driver.take() {
            old.shutdown().await;
        }

        let config = SessionConfig::resolve(&request);
        let session_id = Uuid::new_v4().to_string();
        {
            let mut state = self.shared.state.lock().await;
            let mut session = BreathingSession::new(config.pattern, config.target_secs);
            session.start();
            *state = ControllerState {
                status: SessionStatus::Running,
                session_id: Some(session_id.clone()),
                config: Some(config),
                session: Some(session),
                aggregator: Some(SummaryAggregator::new(
                    session_id.clone(),
                    config.pattern.id,
                    Utc::now(),
                )),
                started: Some(Instant::now()),
            };
        }

        info!(
            "Session {} started: pattern '{}', {}s, ambiance '{}'",
            session_id, config.pattern.id, config.target_secs, config.ambiance.id
        );
        self.shared.ports.haptics.medium();
        self.shared.emit(SessionEvent::Started {
            session_id,
            pattern_id: config.pattern.id.to_string(),
            ambiance_id: config.ambiance.id.to_string(),
            target_secs: config.target_secs,
        });

        self.shared.start_ambient(config.ambiance).await;
        *driver = Some(Driver::spawn(self.shared.clone()));
        drop(driver);

        Ok(self.snapshot().await)
    }

    pub async fn start_from_preferences(&self) -> Result<SessionSnapshot> {
        let request = SessionRequest::from_preferences(self.shared.ports.preferences.as_ref());
        self.start(request).await
    }

    pub async fn pause(&self) -> Result<SessionSnapshot> {
        let mut driver = self.driver.lock().await;
        if let Some(running) = driver.take() {
            running.shutdown().await;
        }

        {
            let mut state = self.shared.state.lock().await;
            if state.status != SessionStatus::Running {
                bail!("no running session to pause");
            }
            if let Some(session) = state.session.as_mut() {
                session.pause();
            }
            state.status = SessionStatus::Paused;
        }

        if let Some(player) = self.shared.ambient.lock().await.as_mut() {
            player.pause().await;
        }
        self.shared.emit(SessionEvent::Paused);
        drop(driver);

        Ok(self.snapshot().await)
    }

    /// Resume the paused session. The current phase restarts with its full
    /// duration; the countdown continues from where it stopped.
    pub async fn resume(&self) -> Result<SessionSnapshot> {
        let mut driver = self.driver.lock().await;

        {
            let mut state = self.shared.state.lock().await;
            if state.status != SessionStatus::Paused {
                bail!("no paused session to resume");
            }
            if let Some(session) = state.session.as_mut() {
                session.resume();
            }
            state.status = SessionStatus::Running;
        }

        self.shared.emit(SessionEvent::Resumed);
        if let Some(player) = self.shared.ambient.lock().await.as_mut() {
            player.resume().await;
        }
        *driver = Some(Driver::spawn(self.shared.clone()));
        drop(driver);

        Ok(self.snapshot().await)
    }

    /// Cancel the session and release all audio. Safe from any state,
    /// including before the first start.
    pub async fn stop(&self) -> SessionSnapshot {
        let mut driver = self.driver.lock().await;
        if let Some(running) = driver.take() {
            running.shutdown().await;
        }

        let stopped = {
            let mut state = self.shared.state.lock().await;
            if state.status.is_active() {
                if let Some(session) = state.session.as_mut() {
                    session.pause();
                }
                state.status = SessionStatus::Cancelled;
                state.aggregator = None;
                true
            } else {
                false
            }
        };

        self.shared.teardown_ambient().await;
        if stopped {
            info!("Session stopped by user");
            self.shared.emit(SessionEvent::Stopped);
        }
        drop(driver);

        self.snapshot().await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.state.lock().await;
        let ambient = if state.status.is_active() {
            match self.shared.ambient.lock().await.as_ref() {
                Some(player) => Some(player.snapshot().await),
                None => None,
            }
        } else {
            None
        };

        SessionSnapshot {
            status: state.status,
            session_id: state.session_id.clone(),
            pattern_id: state.config.map(|config| config.pattern.id),
            ambiance_id: state.config.map(|config| config.ambiance.id),
            phase: state.session.as_ref().map(BreathingSession::phase_state),
            clock: state.session.as_ref().map(BreathingSession::clock_state),
            ambient,
        }
    }

    /// Load the ambiance's buffers ahead of the next start. Silent
    /// ambiances and audio failures leave nothing preloaded.
    pub async fn preload_ambiance(&self, ambiance_id: &str) {
        if self.shared.state.lock().await.status.is_active() {
            debug!("Ignoring preload of '{}' during a session", ambiance_id);
            return;
        }
        let ambiance = catalog::ambiance_or_default(Some(ambiance_id));
        self.shared.ensure_player(ambiance).await;
    }

    /// Switch the background sound. While a session runs the new loop starts
    /// straight away; while paused it starts on resume.
    pub async fn change_ambiance(&self, ambiance_id: &str) {
        let _driver = self.driver.lock().await;
        let ambiance = catalog::ambiance_or_default(Some(ambiance_id));

        let status = {
            let mut state = self.shared.state.lock().await;
            let status = state.status;
            if status.is_active() {
                if let Some(config) = state.config.as_mut() {
                    config.ambiance = ambiance;
                }
            }
            status
        };

        match status {
            SessionStatus::Running => self.shared.start_ambient(ambiance).await,
            _ => self.shared.ensure_player(ambiance).await,
        }
    }
}
