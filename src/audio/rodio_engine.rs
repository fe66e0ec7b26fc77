//! rodio-backed ambient buffers.
//!
//! rodio's output stream is not `Send`, so every sink lives on one dedicated
//! "audio-engine" thread. Buffers talk to it over a command channel and read
//! their state back from shared atomics. The thread also polls each playing
//! sink and pushes position reports to the buffer's [`StatusReporter`].

use std::{
    collections::HashMap,
    fs,
    io::Cursor,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
        mpsc::{self, RecvTimeoutError, Sender},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::catalog::SoundAsset;

use super::{AudioBackend, AudioBuffer, PlaybackStatus, StatusReporter};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

enum EngineCommand {
    Load {
        id: u64,
        bytes: Arc<[u8]>,
        shared: Arc<VoiceShared>,
        reporter: StatusReporter,
    },
    Play(u64),
    Pause(u64),
    SetVolume(u64, f32),
    Rewind(u64),
    Release(u64),
}

/// State a buffer can read without a round trip to the engine thread.
#[derive(Default)]
struct VoiceShared {
    loaded: AtomicBool,
    playing: AtomicBool,
    /// f32 bits.
    volume: AtomicU32,
}

impl VoiceShared {
    fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::SeqCst))
    }

    fn set_volume(&self, volume: f32) {
        self.volume.store(volume.to_bits(), Ordering::SeqCst);
    }
}

struct Voice {
    sink: Sink,
    bytes: Arc<[u8]>,
    duration: Option<Duration>,
    shared: Arc<VoiceShared>,
    reporter: StatusReporter,
    finish_reported: bool,
}

impl Voice {
    fn append_source(&mut self) -> Result<()> {
        let decoder = Decoder::new(Cursor::new(self.bytes.clone()))
            .map_err(|e| anyhow!("Failed to decode ambient sound: {}", e))?;
        self.sink.append(decoder);
        self.finish_reported = false;
        Ok(())
    }

    fn status(&mut self) -> Option<PlaybackStatus> {
        if !self.shared.playing.load(Ordering::SeqCst) {
            return None;
        }
        let duration = self.duration.map(|d| d.as_secs_f64());
        if self.sink.empty() {
            if self.finish_reported {
                return None;
            }
            self.finish_reported = true;
            return Some(PlaybackStatus {
                is_loaded: true,
                current_time: duration.unwrap_or(0.0),
                duration,
                did_just_finish: true,
            });
        }
        Some(PlaybackStatus {
            is_loaded: true,
            current_time: self.sink.get_pos().as_secs_f64(),
            duration,
            did_just_finish: false,
        })
    }
}

#[derive(Clone)]
struct EngineHandle {
    tx: Arc<Mutex<Option<Sender<EngineCommand>>>>,
    status_interval: Duration,
}

impl EngineHandle {
    fn new(status_interval: Duration) -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            status_interval,
        }
    }

    fn ensure_thread(&self) -> Result<Sender<EngineCommand>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|e| anyhow!("audio engine lock poisoned: {}", e))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<EngineCommand>();
        let status_interval = self.status_interval;

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || run_engine(rx, status_interval))
            .context("Failed to spawn audio engine thread")?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    fn send(&self, command: EngineCommand) -> Result<()> {
        let tx = self.ensure_thread()?;
        tx.send(command)
            .map_err(|_| anyhow!("audio engine thread has stopped"))
    }
}

fn ensure_stream(
    stream: &mut Option<(OutputStream, OutputStreamHandle)>,
) -> Result<OutputStreamHandle> {
    if stream.is_none() {
        let opened = OutputStream::try_default()
            .map_err(|e| anyhow!("Failed to create audio output stream: {}", e))?;
        *stream = Some(opened);
    }
    stream
        .as_ref()
        .map(|(_, handle)| handle.clone())
        .ok_or_else(|| anyhow!("audio output stream unavailable"))
}

fn load_voice(
    stream: &mut Option<(OutputStream, OutputStreamHandle)>,
    bytes: Arc<[u8]>,
    shared: Arc<VoiceShared>,
    reporter: StatusReporter,
) -> Result<Voice> {
    let handle = ensure_stream(stream)?;
    let sink =
        Sink::try_new(&handle).map_err(|e| anyhow!("Failed to create audio sink: {}", e))?;
    sink.pause();
    sink.set_volume(shared.volume());

    let duration = Decoder::new(Cursor::new(bytes.clone()))
        .map_err(|e| anyhow!("Failed to decode ambient sound: {}", e))?
        .total_duration();

    let mut voice = Voice {
        sink,
        bytes,
        duration,
        shared,
        reporter,
        finish_reported: false,
    };
    voice.append_source()?;
    Ok(voice)
}

fn run_engine(rx: mpsc::Receiver<EngineCommand>, status_interval: Duration) {
    let mut stream: Option<(OutputStream, OutputStreamHandle)> = None;
    let mut voices: HashMap<u64, Voice> = HashMap::new();
    let mut last_report = Instant::now();

    log_debug!("audio engine thread started");

    loop {
        match rx.recv_timeout(status_interval) {
            Ok(command) => handle_command(command, &mut stream, &mut voices),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_report.elapsed() >= status_interval {
            last_report = Instant::now();
            for voice in voices.values_mut() {
                if let Some(status) = voice.status() {
                    voice.reporter.report(status);
                }
            }
        }
    }

    for (_, voice) in voices.drain() {
        voice.sink.stop();
    }
    log_debug!("audio engine thread stopped");
}

fn handle_command(
    command: EngineCommand,
    stream: &mut Option<(OutputStream, OutputStreamHandle)>,
    voices: &mut HashMap<u64, Voice>,
) {
    match command {
        EngineCommand::Load {
            id,
            bytes,
            shared,
            reporter,
        } => match load_voice(stream, bytes, shared.clone(), reporter) {
            Ok(voice) => {
                shared.loaded.store(true, Ordering::SeqCst);
                if shared.playing.load(Ordering::SeqCst) {
                    voice.sink.play();
                }
                voices.insert(id, voice);
                log_debug!("ambient voice {} loaded", id);
            }
            Err(e) => log_error!("Failed to load ambient voice {}: {}", id, e),
        },
        EngineCommand::Play(id) => {
            if let Some(voice) = voices.get_mut(&id) {
                if voice.sink.empty() {
                    if let Err(e) = voice.append_source() {
                        log_warn!("{}", e);
                    }
                }
                voice.sink.play();
            }
        }
        EngineCommand::Pause(id) => {
            if let Some(voice) = voices.get(&id) {
                voice.sink.pause();
            }
        }
        EngineCommand::SetVolume(id, volume) => {
            if let Some(voice) = voices.get(&id) {
                voice.sink.set_volume(volume.clamp(0.0, 1.0));
            }
        }
        EngineCommand::Rewind(id) => {
            if let Some(voice) = voices.get_mut(&id) {
                // clear() also pauses the sink.
                voice.sink.clear();
                if let Err(e) = voice.append_source() {
                    log_warn!("{}", e);
                }
                if voice.shared.playing.load(Ordering::SeqCst) {
                    voice.sink.play();
                }
            }
        }
        EngineCommand::Release(id) => {
            if let Some(voice) = voices.remove(&id) {
                voice.sink.stop();
                log_debug!("ambient voice {} released", id);
            }
        }
    }
}

/// [`AudioBackend`] playing decoded sound files through the default output
/// device.
pub struct RodioBackend {
    engine: EngineHandle,
    next_id: AtomicU64,
}

impl RodioBackend {
    pub fn new(status_interval: Duration) -> Self {
        Self {
            engine: EngineHandle::new(status_interval),
            next_id: AtomicU64::new(1),
        }
    }
}

impl AudioBackend for RodioBackend {
    fn create_buffer(
        &self,
        asset: &SoundAsset,
        reporter: StatusReporter,
    ) -> Result<Box<dyn AudioBuffer>> {
        let bytes: Arc<[u8]> = fs::read(&asset.path)
            .with_context(|| format!("Failed to read {}", asset.path.display()))?
            .into();

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let shared = Arc::new(VoiceShared::default());
        log_info!(
            "Loading {} buffer {} from {}",
            reporter.role(),
            id,
            asset.path.display()
        );
        self.engine.send(EngineCommand::Load {
            id,
            bytes,
            shared: shared.clone(),
            reporter,
        })?;

        Ok(Box::new(RodioBuffer {
            id,
            engine: self.engine.clone(),
            shared,
            released: false,
        }))
    }
}

struct RodioBuffer {
    id: u64,
    engine: EngineHandle,
    shared: Arc<VoiceShared>,
    released: bool,
}

impl AudioBuffer for RodioBuffer {
    fn is_loaded(&self) -> bool {
        !self.released && self.shared.loaded.load(Ordering::SeqCst)
    }

    fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::SeqCst)
    }

    fn volume(&self) -> f32 {
        self.shared.volume()
    }

    fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.shared.set_volume(volume);
        if self.released {
            return;
        }
        if let Err(e) = self.engine.send(EngineCommand::SetVolume(self.id, volume)) {
            log_warn!("Failed to set volume on voice {}: {}", self.id, e);
        }
    }

    fn play(&mut self) -> Result<()> {
        if self.released {
            return Err(anyhow!("voice {} already released", self.id));
        }
        self.shared.playing.store(true, Ordering::SeqCst);
        self.engine.send(EngineCommand::Play(self.id))
    }

    fn pause(&mut self) -> Result<()> {
        self.shared.playing.store(false, Ordering::SeqCst);
        if self.released {
            return Ok(());
        }
        self.engine.send(EngineCommand::Pause(self.id))
    }

    fn seek_to_start(&mut self) -> Result<()> {
        if self.released {
            return Err(anyhow!("voice {} already released", self.id));
        }
        self.engine.send(EngineCommand::Rewind(self.id))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.shared.playing.store(false, Ordering::SeqCst);
        self.shared.loaded.store(false, Ordering::SeqCst);
        if let Err(e) = self.engine.send(EngineCommand::Release(self.id)) {
            log_debug!("Release of voice {} not delivered: {}", self.id, e);
        }
    }
}

impl Drop for RodioBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::BufferRole;
    use std::path::PathBuf;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn missing_sound_file_is_an_error() {
        let backend = RodioBackend::new(Duration::from_millis(100));
        let (tx, _rx) = unbounded_channel();
        let asset = SoundAsset {
            path: PathBuf::from("/nonexistent/sounds/rainandthunder.wav"),
        };

        let result = backend.create_buffer(&asset, StatusReporter::new(BufferRole::Primary, tx));
        let message = format!("{:#}", result.err().expect("read should fail"));
        assert!(message.contains("rainandthunder.wav"));
    }

    #[test]
    fn volume_survives_the_atomic_round_trip() {
        let shared = VoiceShared::default();
        assert_eq!(shared.volume(), 0.0);
        shared.set_volume(0.35);
        assert_eq!(shared.volume(), 0.35);
    }
}
