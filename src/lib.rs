pub mod audio;
pub mod breathing;
pub mod catalog;
pub mod config;
pub mod models;
pub mod session;
pub mod settings;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;

use audio::{AudioBackend, RodioBackend};
use config::EngineConfig;
use session::{SessionController, SessionEvent, SessionPorts};
use settings::SettingsStore;

/// A wired-up engine for a host app: the controller, the stream of events
/// for the UI, and the settings store backing preferences and stats.
pub struct Engine {
    pub controller: SessionController,
    pub events: UnboundedReceiver<SessionEvent>,
    pub settings: Arc<SettingsStore>,
}

/// Initialize logging (reads RUST_LOG env var, defaults to info). Safe to
/// call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}

/// Open the settings at `settings_path` and build a controller playing
/// ambient sound through the default output device. Must be called inside a
/// tokio runtime.
pub fn build_engine(settings_path: PathBuf) -> Result<Engine> {
    let settings = Arc::new(SettingsStore::new(settings_path)?);
    let config = EngineConfig::from_env();

    log::info!(
        "Nefesal engine starting (assets in {})",
        config.asset_root.display()
    );

    let audio: Arc<dyn AudioBackend> =
        Arc::new(RodioBackend::new(config.ambient.status_interval));
    let ports = SessionPorts::new(settings.clone(), settings.clone());
    let (controller, events) = SessionController::new(ports, Some(audio), config);

    Ok(Engine {
        controller,
        events,
        settings,
    })
}
