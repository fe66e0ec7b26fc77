//! Ambient sound playback.
//!
//! The loop player works against the [`AudioBackend`] / [`AudioBuffer`]
//! traits; [`RodioBackend`] is the production implementation.

pub mod loop_player;
pub mod rodio_engine;

#[cfg(test)]
pub(crate) mod mock;

pub use loop_player::{AmbientLoopPlayer, AmbientSnapshot, BufferSnapshot};
pub use rodio_engine::RodioBackend;

use std::fmt;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::catalog::SoundAsset;

/// The two interchangeable buffers of an ambient loop.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum BufferRole {
    Primary,
    Secondary,
}

impl BufferRole {
    pub fn other(&self) -> Self {
        match self {
            BufferRole::Primary => BufferRole::Secondary,
            BufferRole::Secondary => BufferRole::Primary,
        }
    }
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferRole::Primary => f.write_str("primary"),
            BufferRole::Secondary => f.write_str("secondary"),
        }
    }
}

/// A playback position report from the audio subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStatus {
    pub is_loaded: bool,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    /// Fraction of the track played, if the duration is known.
    pub fn progress(&self) -> Option<f64> {
        match self.duration {
            Some(duration) if duration > 0.0 => Some(self.current_time / duration),
            _ => None,
        }
    }
}

/// Pushes a buffer's status reports to whoever listens for them.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    role: BufferRole,
    tx: UnboundedSender<(BufferRole, PlaybackStatus)>,
}

impl StatusReporter {
    pub fn new(role: BufferRole, tx: UnboundedSender<(BufferRole, PlaybackStatus)>) -> Self {
        Self { role, tx }
    }

    pub fn role(&self) -> BufferRole {
        self.role
    }

    /// Returns false once nobody is listening any more.
    pub fn report(&self, status: PlaybackStatus) -> bool {
        self.tx.send((self.role, status)).is_ok()
    }
}

/// One playable copy of an ambient sound.
///
/// Commands are fire-and-forget: an `Err` means the command could not be
/// issued, not that playback failed later.
pub trait AudioBuffer: Send {
    fn is_loaded(&self) -> bool;
    fn is_playing(&self) -> bool;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn seek_to_start(&mut self) -> Result<()>;
    /// Free the underlying resources. Safe to call more than once.
    fn release(&mut self);
}

pub trait AudioBackend: Send + Sync {
    /// Create a buffer for `asset`. Loading may finish after this returns;
    /// poll [`AudioBuffer::is_loaded`].
    fn create_buffer(
        &self,
        asset: &SoundAsset,
        reporter: StatusReporter,
    ) -> Result<Box<dyn AudioBuffer>>;
}
