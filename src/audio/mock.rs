//! In-memory audio backend for tests. Buffers record what they were told and
//! expose their state through a shared handle.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::catalog::SoundAsset;

use super::{AudioBackend, AudioBuffer, BufferRole, PlaybackStatus, StatusReporter};

#[derive(Debug, Default, Clone)]
pub struct MockState {
    pub loaded: bool,
    pub playing: bool,
    pub volume: f32,
    pub seeks: u32,
    pub released: bool,
    pub plays: u32,
}

#[derive(Clone)]
pub struct MockHandle {
    pub state: Arc<Mutex<MockState>>,
    pub reporter: StatusReporter,
}

impl MockHandle {
    pub fn get(&self) -> MockState {
        self.state.lock().unwrap().clone()
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.state.lock().unwrap().loaded = loaded;
    }

    pub fn report(&self, current_time: f64, duration: f64) {
        self.reporter.report(PlaybackStatus {
            is_loaded: true,
            current_time,
            duration: Some(duration),
            did_just_finish: false,
        });
    }
}

pub struct MockBuffer {
    state: Arc<Mutex<MockState>>,
}

impl AudioBuffer for MockBuffer {
    fn is_loaded(&self) -> bool {
        self.state.lock().unwrap().loaded
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.released {
            bail!("buffer released");
        }
        state.playing = true;
        state.plays += 1;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.state.lock().unwrap().playing = false;
        Ok(())
    }

    fn seek_to_start(&mut self) -> Result<()> {
        self.state.lock().unwrap().seeks += 1;
        Ok(())
    }

    fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.playing = false;
        state.released = true;
    }
}

/// Hands out buffers that start loaded unless `loaded` is false, and keeps a
/// handle on each so tests can inspect and drive them.
pub struct MockBackend {
    pub loaded: bool,
    pub fail: bool,
    pub handles: Mutex<Vec<MockHandle>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            loaded: true,
            fail: false,
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn unloaded() -> Self {
        Self {
            loaded: false,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn handle(&self, role: BufferRole) -> MockHandle {
        self.handles
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|handle| handle.reporter.role() == role)
            .cloned()
            .expect("buffer was created")
    }

    pub fn created(&self) -> usize {
        self.handles.lock().unwrap().len()
    }
}

impl AudioBackend for MockBackend {
    fn create_buffer(
        &self,
        asset: &SoundAsset,
        reporter: StatusReporter,
    ) -> Result<Box<dyn AudioBuffer>> {
        if self.fail {
            bail!("cannot open {}", asset.path.display());
        }
        let state = Arc::new(Mutex::new(MockState {
            loaded: self.loaded,
            ..Default::default()
        }));
        self.handles.lock().unwrap().push(MockHandle {
            state: state.clone(),
            reporter,
        });
        Ok(Box::new(MockBuffer { state }))
    }
}
