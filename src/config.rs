use std::{env, path::PathBuf, time::Duration};

use log::warn;

/// Countdown resolution. Fixed: the clock counts whole seconds.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct AmbientConfig {
    /// Steady-state volume of the audible buffer, 0.0..=1.0.
    pub target_volume: f32,
    /// Fraction of the track after which the next buffer starts fading in.
    pub crossfade_trigger: f64,
    pub ramp_steps: u32,
    pub ramp_interval: Duration,
    pub load_attempts: u32,
    pub load_retry_delay: Duration,
    /// How often the audio engine reports playback position.
    pub status_interval: Duration,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            target_volume: 0.5,
            crossfade_trigger: 0.80,
            ramp_steps: 20,
            ramp_interval: Duration::from_millis(50),
            load_attempts: 50,
            load_retry_delay: Duration::from_millis(50),
            status_interval: Duration::from_millis(100),
        }
    }
}

impl AmbientConfig {
    pub fn crossfade_duration(&self) -> Duration {
        self.ramp_interval * self.ramp_steps
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory the ambiance sound and image paths are relative to.
    pub asset_root: PathBuf,
    pub ambient: AmbientConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            ambient: AmbientConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `NEFESAL_ASSET_DIR`, `NEFESAL_AMBIENT_VOLUME`
    /// and `NEFESAL_DEBUG`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("NEFESAL_ASSET_DIR") {
            config.asset_root = PathBuf::from(dir);
        }

        if let Ok(raw) = env::var("NEFESAL_AMBIENT_VOLUME") {
            match raw.trim().parse::<f32>() {
                Ok(volume) if volume.is_finite() => {
                    config.ambient.target_volume = volume.clamp(0.0, 1.0);
                }
                _ => warn!("Ignoring NEFESAL_AMBIENT_VOLUME={raw:?}: not a number"),
            }
        }

        let debug_mode = env::var("NEFESAL_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            config.ambient.status_interval = Duration::from_millis(25);
        }

        config
    }
}
