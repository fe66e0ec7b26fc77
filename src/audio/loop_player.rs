//! Gapless ambient looping with two buffers.
//!
//! Both buffers hold the same sound. The active one plays at the target
//! volume; once it reports 80% progress the other starts at volume zero and
//! the two ramp in lockstep until the roles swap. The faded-out buffer is
//! paused, silenced and rewound, ready to be the next one faded in.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::{self, Duration, Instant, Interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{catalog::SoundAsset, config::AmbientConfig};

use super::{AudioBackend, AudioBuffer, BufferRole, PlaybackStatus, StatusReporter};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BufferSnapshot {
    pub loaded: bool,
    pub playing: bool,
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmbientSnapshot {
    pub active: BufferRole,
    pub crossfading: bool,
    pub primary: BufferSnapshot,
    pub secondary: BufferSnapshot,
}

impl AmbientSnapshot {
    pub fn buffer(&self, role: BufferRole) -> &BufferSnapshot {
        match role {
            BufferRole::Primary => &self.primary,
            BufferRole::Secondary => &self.secondary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusOutcome {
    Ignored,
    Observed,
    Rewound,
    CrossfadeStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RampOutcome {
    Idle,
    Ramping,
    Finished,
}

/// Buffer pair plus the crossfade state machine. Synchronous; the player
/// below feeds it status reports and ramp ticks.
pub(crate) struct LoopCore {
    primary: Box<dyn AudioBuffer>,
    secondary: Box<dyn AudioBuffer>,
    active: BufferRole,
    /// Steps taken in the crossfade under way, if any.
    fade_step: Option<u32>,
    engaged: bool,
    released: bool,
    target_volume: f32,
    ramp_steps: u32,
    crossfade_trigger: f64,
}

impl LoopCore {
    pub(crate) fn new(
        primary: Box<dyn AudioBuffer>,
        secondary: Box<dyn AudioBuffer>,
        config: &AmbientConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            active: BufferRole::Primary,
            fade_step: None,
            engaged: false,
            released: false,
            target_volume: config.target_volume.clamp(0.0, 1.0),
            ramp_steps: config.ramp_steps.max(1),
            crossfade_trigger: config.crossfade_trigger,
        }
    }

    fn buffer(&mut self, role: BufferRole) -> &mut dyn AudioBuffer {
        match role {
            BufferRole::Primary => self.primary.as_mut(),
            BufferRole::Secondary => self.secondary.as_mut(),
        }
    }

    fn buffer_ref(&self, role: BufferRole) -> &dyn AudioBuffer {
        match role {
            BufferRole::Primary => self.primary.as_ref(),
            BufferRole::Secondary => self.secondary.as_ref(),
        }
    }

    pub(crate) fn is_engaged(&self) -> bool {
        self.engaged && !self.released
    }

    pub(crate) fn active_is_loaded(&self) -> bool {
        self.buffer_ref(self.active).is_loaded()
    }

    /// Silence both buffers and rewind them while nothing is playing yet.
    pub(crate) fn preload(&mut self) {
        for role in [BufferRole::Primary, BufferRole::Secondary] {
            let buffer = self.buffer(role);
            buffer.set_volume(0.0);
            if let Err(e) = buffer.seek_to_start() {
                log_warn!("Failed to preload {} ambient buffer: {}", role, e);
            }
        }
    }

    /// Reset for a fresh start: primary audible at target, secondary silent,
    /// both at the top of the track.
    pub(crate) fn prepare(&mut self) {
        if self.released {
            return;
        }
        self.fade_step = None;
        self.active = BufferRole::Primary;
        for role in [BufferRole::Primary, BufferRole::Secondary] {
            if let Err(e) = self.buffer(role).seek_to_start() {
                log_warn!("Failed to rewind {} ambient buffer: {}", role, e);
            }
        }
        if self.secondary.is_playing() {
            if let Err(e) = self.secondary.pause() {
                log_warn!("Failed to pause secondary ambient buffer: {}", e);
            }
        }
        let target = self.target_volume;
        self.primary.set_volume(target);
        self.secondary.set_volume(0.0);
        self.engaged = true;
    }

    pub(crate) fn play_active(&mut self) {
        let role = self.active;
        if let Err(e) = self.buffer(role).play() {
            log_warn!("Failed to play {} ambient buffer: {}", role, e);
        }
    }

    pub(crate) fn handle_status(
        &mut self,
        role: BufferRole,
        status: &PlaybackStatus,
    ) -> StatusOutcome {
        if !self.is_engaged() || role != self.active || !status.is_loaded {
            return StatusOutcome::Ignored;
        }

        if status.did_just_finish {
            if self.fade_step.is_some() {
                log_debug!("{} buffer ended mid-crossfade, settling", role);
                self.finish_crossfade();
                return StatusOutcome::Rewound;
            }
            let buffer = self.buffer(role);
            if let Err(e) = buffer.seek_to_start() {
                log_warn!("Failed to rewind finished {} buffer: {}", role, e);
            }
            buffer.set_volume(0.0);
            // The report still carries the end-of-track position; the next
            // one from the top decides about crossfading.
            return StatusOutcome::Rewound;
        }

        let Some(progress) = status.progress() else {
            return StatusOutcome::Observed;
        };
        if progress < self.crossfade_trigger || self.fade_step.is_some() {
            return StatusOutcome::Observed;
        }

        let incoming = role.other();
        let next = self.buffer(incoming);
        if !next.is_loaded() || next.is_playing() {
            return StatusOutcome::Observed;
        }
        next.set_volume(0.0);
        if let Err(e) = next.play() {
            log_warn!("Failed to start {} buffer for crossfade: {}", incoming, e);
            return StatusOutcome::Observed;
        }
        log_debug!("Crossfading {} -> {} at {:.0}%", role, incoming, progress * 100.0);
        self.fade_step = Some(0);
        StatusOutcome::CrossfadeStarted
    }

    pub(crate) fn ramp_step(&mut self) -> RampOutcome {
        let Some(step) = self.fade_step else {
            return RampOutcome::Idle;
        };
        let step = step + 1;
        if step >= self.ramp_steps {
            self.finish_crossfade();
            return RampOutcome::Finished;
        }
        self.fade_step = Some(step);
        self.apply_ramp(self.active.other(), step as f32 / self.ramp_steps as f32);
        RampOutcome::Ramping
    }

    /// Move both volumes together so they always sum to the target.
    fn apply_ramp(&mut self, incoming: BufferRole, fraction: f32) {
        let target = self.target_volume;
        let rising = (target * fraction.clamp(0.0, 1.0)).min(target);
        self.buffer(incoming).set_volume(rising);
        self.buffer(incoming.other()).set_volume((target - rising).max(0.0));
    }

    fn finish_crossfade(&mut self) {
        let outgoing = self.active;
        let incoming = outgoing.other();
        let target = self.target_volume;

        self.buffer(incoming).set_volume(target);
        let faded = self.buffer(outgoing);
        if let Err(e) = faded.pause() {
            log_warn!("Failed to pause {} buffer after crossfade: {}", outgoing, e);
        }
        faded.set_volume(0.0);
        if let Err(e) = faded.seek_to_start() {
            log_warn!("Failed to rewind {} buffer after crossfade: {}", outgoing, e);
        }

        self.active = incoming;
        self.fade_step = None;
    }

    /// Pause without releasing. A crossfade under way is settled first so
    /// that only one buffer resumes.
    pub(crate) fn pause(&mut self) {
        if self.released {
            return;
        }
        if self.fade_step.is_some() {
            self.finish_crossfade();
        }
        for role in [BufferRole::Primary, BufferRole::Secondary] {
            if let Err(e) = self.buffer(role).pause() {
                log_warn!("Failed to pause {} ambient buffer: {}", role, e);
            }
        }
        self.engaged = false;
    }

    pub(crate) fn resume(&mut self) {
        if !self.released {
            self.engaged = true;
        }
    }

    pub(crate) fn release(&mut self) {
        if self.released {
            return;
        }
        for role in [BufferRole::Primary, BufferRole::Secondary] {
            let buffer = self.buffer(role);
            if let Err(e) = buffer.pause() {
                log_debug!("Pause before release failed for {}: {}", role, e);
            }
            buffer.release();
        }
        self.fade_step = None;
        self.engaged = false;
        self.released = true;
    }

    pub(crate) fn snapshot(&self) -> AmbientSnapshot {
        let describe = |buffer: &dyn AudioBuffer| BufferSnapshot {
            loaded: buffer.is_loaded(),
            playing: buffer.is_playing(),
            volume: buffer.volume(),
        };
        AmbientSnapshot {
            active: self.active,
            crossfading: self.fade_step.is_some(),
            primary: describe(self.primary.as_ref()),
            secondary: describe(self.secondary.as_ref()),
        }
    }
}

/// Background sound for one ambiance, looped without gaps.
///
/// Owns a worker task reacting to the buffers' status reports and running
/// the crossfade ramp. Playback trouble is logged and never returned.
pub struct AmbientLoopPlayer {
    ambiance_id: String,
    core: Arc<Mutex<LoopCore>>,
    config: AmbientConfig,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
    starter: Option<JoinHandle<()>>,
    started: bool,
}

impl AmbientLoopPlayer {
    /// Create and preload both buffers. Must be called inside a tokio runtime.
    pub fn create(
        backend: &dyn AudioBackend,
        ambiance_id: &str,
        asset: &SoundAsset,
        config: AmbientConfig,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let primary = backend.create_buffer(asset, StatusReporter::new(BufferRole::Primary, tx.clone()))?;
        let secondary = match backend.create_buffer(asset, StatusReporter::new(BufferRole::Secondary, tx)) {
            Ok(buffer) => buffer,
            Err(e) => {
                let mut primary = primary;
                primary.release();
                return Err(e);
            }
        };

        let mut core = LoopCore::new(primary, secondary, &config);
        core.preload();
        let core = Arc::new(Mutex::new(core));

        let cancel = CancellationToken::new();
        let worker = tokio::spawn(loop_worker(
            core.clone(),
            rx,
            cancel.clone(),
            config.ramp_interval,
        ));

        log_info!("Ambient player ready for '{}' ({})", ambiance_id, asset.path.display());

        Ok(Self {
            ambiance_id: ambiance_id.to_string(),
            core,
            config,
            cancel,
            worker: Some(worker),
            starter: None,
            started: false,
        })
    }

    pub fn ambiance_id(&self) -> &str {
        &self.ambiance_id
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub async fn start(&mut self) {
        self.core.lock().await.prepare();
        self.started = true;
        self.spawn_starter();
    }

    pub async fn pause(&mut self) {
        if let Some(handle) = self.starter.take() {
            handle.abort();
        }
        self.core.lock().await.pause();
    }

    /// Continue the active buffer where it was paused. A player that was
    /// only preloaded is started from the top instead.
    pub async fn resume(&mut self) {
        if !self.started {
            self.start().await;
            return;
        }
        self.core.lock().await.resume();
        self.spawn_starter();
    }

    /// Pause, release both buffers and stop the worker. Idempotent.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.starter.take() {
            handle.abort();
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.await;
        }
        self.core.lock().await.release();
    }

    pub async fn snapshot(&self) -> AmbientSnapshot {
        self.core.lock().await.snapshot()
    }

    fn spawn_starter(&mut self) {
        if let Some(handle) = self.starter.take() {
            handle.abort();
        }
        self.starter = Some(tokio::spawn(play_when_loaded(
            self.core.clone(),
            self.config.load_attempts,
            self.config.load_retry_delay,
            self.cancel.child_token(),
        )));
    }
}

impl Drop for AmbientLoopPlayer {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.starter.take() {
            handle.abort();
        }
        if let Ok(mut core) = self.core.try_lock() {
            core.release();
        }
    }
}

/// Play the active buffer as soon as it has loaded, polling a bounded number
/// of times. On exhaustion, try once anyway and log.
async fn play_when_loaded(
    core: Arc<Mutex<LoopCore>>,
    attempts: u32,
    delay: Duration,
    cancel: CancellationToken,
) {
    for attempt in 1..=attempts {
        {
            let mut core = core.lock().await;
            if !core.is_engaged() {
                return;
            }
            if core.active_is_loaded() {
                core.play_active();
                return;
            }
        }
        log_debug!("Ambient buffer not loaded yet (attempt {}/{})", attempt, attempts);
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = time::sleep(delay) => {}
        }
    }

    log_warn!(
        "Ambient buffer did not load after {} attempts, trying to play anyway",
        attempts
    );
    let mut core = core.lock().await;
    if core.is_engaged() {
        core.play_active();
    }
}

async fn loop_worker(
    core: Arc<Mutex<LoopCore>>,
    mut status_rx: mpsc::UnboundedReceiver<(BufferRole, PlaybackStatus)>,
    cancel: CancellationToken,
    ramp_interval: Duration,
) {
    let mut ramp: Option<Interval> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                log_debug!("ambient loop worker shutting down");
                break;
            }
            received = status_rx.recv() => {
                let Some((role, status)) = received else {
                    break;
                };
                let outcome = core.lock().await.handle_status(role, &status);
                if outcome == StatusOutcome::CrossfadeStarted {
                    let mut interval = time::interval_at(Instant::now() + ramp_interval, ramp_interval);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    ramp = Some(interval);
                }
            }
            _ = next_ramp_tick(&mut ramp) => {
                if core.lock().await.ramp_step() != RampOutcome::Ramping {
                    ramp = None;
                }
            }
        }
    }
}

async fn next_ramp_tick(ramp: &mut Option<Interval>) {
    match ramp {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mock::MockBackend;
    use std::path::PathBuf;

    const TARGET: f32 = 0.5;

    fn asset() -> SoundAsset {
        SoundAsset {
            path: PathBuf::from("sounds/rainandthunder.wav"),
        }
    }

    fn core(backend: &MockBackend) -> LoopCore {
        let (tx, _rx) = mpsc::unbounded_channel();
        let primary = backend
            .create_buffer(&asset(), StatusReporter::new(BufferRole::Primary, tx.clone()))
            .unwrap();
        let secondary = backend
            .create_buffer(&asset(), StatusReporter::new(BufferRole::Secondary, tx))
            .unwrap();
        LoopCore::new(primary, secondary, &AmbientConfig::default())
    }

    fn status(current_time: f64, duration: f64) -> PlaybackStatus {
        PlaybackStatus {
            is_loaded: true,
            current_time,
            duration: Some(duration),
            did_just_finish: false,
        }
    }

    fn started(backend: &MockBackend) -> LoopCore {
        let mut core = core(backend);
        core.prepare();
        core.play_active();
        core
    }

    #[test]
    fn prepare_makes_primary_audible() {
        let backend = MockBackend::new();
        let core = started(&backend);
        let snapshot = core.snapshot();

        assert_eq!(snapshot.active, BufferRole::Primary);
        assert!(snapshot.primary.playing);
        assert_eq!(snapshot.primary.volume, TARGET);
        assert!(!snapshot.secondary.playing);
        assert_eq!(snapshot.secondary.volume, 0.0);
        assert_eq!(backend.handle(BufferRole::Secondary).get().seeks, 1);
    }

    #[test]
    fn crossfade_waits_for_the_trigger() {
        let backend = MockBackend::new();
        let mut core = started(&backend);

        assert_eq!(core.handle_status(BufferRole::Primary, &status(7.9, 10.0)), StatusOutcome::Observed);
        assert!(!core.snapshot().crossfading);

        assert_eq!(
            core.handle_status(BufferRole::Primary, &status(8.0, 10.0)),
            StatusOutcome::CrossfadeStarted
        );
        let snapshot = core.snapshot();
        assert!(snapshot.crossfading);
        assert!(snapshot.secondary.playing);
        assert_eq!(snapshot.secondary.volume, 0.0);

        // Later reports do not start a second crossfade.
        assert_eq!(core.handle_status(BufferRole::Primary, &status(8.5, 10.0)), StatusOutcome::Observed);
        assert_eq!(backend.handle(BufferRole::Secondary).get().plays, 1);
    }

    #[test]
    fn crossfade_never_exceeds_target() {
        let backend = MockBackend::new();
        let mut core = started(&backend);
        core.handle_status(BufferRole::Primary, &status(9.0, 10.0));

        let mut steps = 0;
        loop {
            let outcome = core.ramp_step();
            let snapshot = core.snapshot();
            let sum = snapshot.primary.volume + snapshot.secondary.volume;
            assert!(sum <= TARGET + 1e-6, "step {steps}: {sum}");
            steps += 1;
            if outcome == RampOutcome::Finished {
                break;
            }
            assert!(snapshot.secondary.volume > 0.0);
        }
        assert_eq!(steps, 20);
        assert_eq!(core.ramp_step(), RampOutcome::Idle);
    }

    #[test]
    fn finished_crossfade_swaps_roles() {
        let backend = MockBackend::new();
        let mut core = started(&backend);
        core.handle_status(BufferRole::Primary, &status(8.0, 10.0));
        while core.ramp_step() == RampOutcome::Ramping {}

        let snapshot = core.snapshot();
        assert_eq!(snapshot.active, BufferRole::Secondary);
        assert!(snapshot.secondary.playing);
        assert_eq!(snapshot.secondary.volume, TARGET);
        assert!(!snapshot.primary.playing);
        assert_eq!(snapshot.primary.volume, 0.0);

        // The old primary no longer drives anything; the new one does.
        assert_eq!(core.handle_status(BufferRole::Primary, &status(9.0, 10.0)), StatusOutcome::Ignored);
        assert_eq!(
            core.handle_status(BufferRole::Secondary, &status(8.2, 10.0)),
            StatusOutcome::CrossfadeStarted
        );
        while core.ramp_step() == RampOutcome::Ramping {}
        assert_eq!(core.snapshot().active, BufferRole::Primary);
    }

    #[test]
    fn natural_end_rewinds_silently() {
        let backend = MockBackend::new();
        let mut core = started(&backend);
        backend.handle(BufferRole::Secondary).set_loaded(false);

        let finished = PlaybackStatus {
            did_just_finish: true,
            ..status(10.0, 10.0)
        };
        assert_eq!(core.handle_status(BufferRole::Primary, &finished), StatusOutcome::Rewound);

        let primary = backend.handle(BufferRole::Primary).get();
        assert_eq!(primary.volume, 0.0);
        assert_eq!(primary.seeks, 2);
        assert!(!core.snapshot().crossfading);
    }

    #[test]
    fn natural_end_waits_for_the_next_report_to_crossfade() {
        let backend = MockBackend::new();
        let mut core = started(&backend);

        let finished = PlaybackStatus {
            did_just_finish: true,
            ..status(10.0, 10.0)
        };
        assert_eq!(core.handle_status(BufferRole::Primary, &finished), StatusOutcome::Rewound);
        assert!(!core.snapshot().crossfading);
        assert!(!backend.handle(BufferRole::Secondary).get().playing);
        assert_eq!(core.ramp_step(), RampOutcome::Idle);
        assert_eq!(backend.handle(BufferRole::Primary).get().volume, 0.0);

        assert_eq!(
            core.handle_status(BufferRole::Primary, &status(0.5, 10.0)),
            StatusOutcome::Observed
        );
        assert_eq!(
            core.handle_status(BufferRole::Primary, &status(8.0, 10.0)),
            StatusOutcome::CrossfadeStarted
        );
    }

    #[test]
    fn end_during_crossfade_settles_it() {
        let backend = MockBackend::new();
        let mut core = started(&backend);
        core.handle_status(BufferRole::Primary, &status(8.0, 10.0));
        core.ramp_step();

        let finished = PlaybackStatus {
            did_just_finish: true,
            ..status(10.0, 10.0)
        };
        assert_eq!(core.handle_status(BufferRole::Primary, &finished), StatusOutcome::Rewound);
        let snapshot = core.snapshot();
        assert_eq!(snapshot.active, BufferRole::Secondary);
        assert_eq!(snapshot.secondary.volume, TARGET);
        assert!(!snapshot.primary.playing);
    }

    #[test]
    fn unknown_duration_is_ignored() {
        let backend = MockBackend::new();
        let mut core = started(&backend);
        let no_duration = PlaybackStatus {
            duration: None,
            ..status(9.0, 10.0)
        };
        assert_eq!(core.handle_status(BufferRole::Primary, &no_duration), StatusOutcome::Observed);
        assert!(!core.snapshot().crossfading);
    }

    #[test]
    fn pause_mid_crossfade_leaves_one_buffer() {
        let backend = MockBackend::new();
        let mut core = started(&backend);
        core.handle_status(BufferRole::Primary, &status(8.0, 10.0));
        core.ramp_step();
        core.ramp_step();

        core.pause();
        let snapshot = core.snapshot();
        assert!(!snapshot.crossfading);
        assert!(!snapshot.primary.playing && !snapshot.secondary.playing);
        assert_eq!(snapshot.active, BufferRole::Secondary);
        assert_eq!(snapshot.secondary.volume, TARGET);
        assert_eq!(snapshot.primary.volume, 0.0);

        // Paused players ignore stray reports.
        assert_eq!(core.handle_status(BufferRole::Secondary, &status(9.0, 10.0)), StatusOutcome::Ignored);

        core.resume();
        core.play_active();
        let snapshot = core.snapshot();
        assert!(snapshot.secondary.playing && !snapshot.primary.playing);
    }

    #[test]
    fn release_is_idempotent() {
        let backend = MockBackend::new();
        let mut core = started(&backend);
        core.release();
        core.release();

        assert!(backend.handle(BufferRole::Primary).get().released);
        assert!(backend.handle(BufferRole::Secondary).get().released);
        assert!(!core.is_engaged());
        core.prepare();
        assert!(!core.is_engaged());
    }

    #[tokio::test(start_paused = true)]
    async fn player_crossfades_on_status_reports() {
        let backend = MockBackend::new();
        let mut player =
            AmbientLoopPlayer::create(&backend, "rain", &asset(), AmbientConfig::default()).unwrap();
        player.start().await;
        time::sleep(Duration::from_millis(10)).await;
        assert!(player.snapshot().await.primary.playing);

        backend.handle(BufferRole::Primary).report(8.5, 10.0);
        time::sleep(Duration::from_millis(200)).await;
        let midway = player.snapshot().await;
        assert!(midway.crossfading);
        assert!(midway.primary.volume + midway.secondary.volume <= TARGET + 1e-6);

        time::sleep(Duration::from_secs(1)).await;
        let settled = player.snapshot().await;
        assert!(!settled.crossfading);
        assert_eq!(settled.active, BufferRole::Secondary);
        assert_eq!(settled.secondary.volume, TARGET);
        assert!(!settled.primary.playing);

        player.stop().await;
        player.stop().await;
        assert!(backend.handle(BufferRole::Primary).get().released);
    }

    #[tokio::test(start_paused = true)]
    async fn player_waits_for_load() {
        let backend = MockBackend::unloaded();
        let mut player =
            AmbientLoopPlayer::create(&backend, "rain", &asset(), AmbientConfig::default()).unwrap();
        player.start().await;

        time::sleep(Duration::from_millis(120)).await;
        assert!(!backend.handle(BufferRole::Primary).get().playing);

        backend.handle(BufferRole::Primary).set_loaded(true);
        time::sleep(Duration::from_millis(60)).await;
        assert!(backend.handle(BufferRole::Primary).get().playing);
        player.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn player_gives_up_waiting_and_tries_anyway() {
        let backend = MockBackend::unloaded();
        let config = AmbientConfig::default();
        let give_up_after = config.load_retry_delay * config.load_attempts;
        let mut player = AmbientLoopPlayer::create(&backend, "rain", &asset(), config).unwrap();
        player.start().await;

        time::sleep(give_up_after + Duration::from_millis(10)).await;
        let primary = backend.handle(BufferRole::Primary).get();
        assert_eq!(primary.plays, 1);
        player.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_backend_reports_an_error() {
        let backend = MockBackend::failing();
        let result = AmbientLoopPlayer::create(&backend, "rain", &asset(), AmbientConfig::default());
        assert!(result.is_err());
    }
}
