use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AmbianceIcon {
    Rain,
    Forest,
    Ocean,
    Cosmic,
    Zen,
    Fire,
}

/// A background sound and image pairing. Paths are relative to the asset root.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ambiance {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub sound_file: Option<&'static str>,
    pub image_file: Option<&'static str>,
    pub is_premium: bool,
    pub icon: AmbianceIcon,
}

/// Resolved location of an ambient sound on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundAsset {
    pub path: PathBuf,
}

impl Ambiance {
    pub fn sound_asset(&self, asset_root: &Path) -> Option<SoundAsset> {
        self.sound_file.map(|file| SoundAsset {
            path: asset_root.join(file),
        })
    }

    pub fn image_path(&self, asset_root: &Path) -> Option<PathBuf> {
        self.image_file.map(|file| asset_root.join(file))
    }

    pub fn has_sound(&self) -> bool {
        self.sound_file.is_some()
    }
}

pub(super) static AMBIANCES: [Ambiance; 6] = [
    Ambiance {
        id: "rain",
        name: "Gentle Rain",
        description: "Soothing droplets for calm",
        sound_file: Some("sounds/rainandthunder.wav"),
        image_file: Some("images/rainandthunder.jpg"),
        is_premium: false,
        icon: AmbianceIcon::Rain,
    },
    Ambiance {
        id: "forest",
        name: "Forest Stream",
        description: "Nature's melody for focus",
        sound_file: None,
        image_file: None,
        is_premium: false,
        icon: AmbianceIcon::Forest,
    },
    Ambiance {
        id: "ocean",
        name: "Ocean Waves",
        description: "Rhythmic waves for deep relaxation",
        sound_file: None,
        image_file: None,
        is_premium: false,
        icon: AmbianceIcon::Ocean,
    },
    Ambiance {
        id: "cosmic",
        name: "Cosmic Hum",
        description: "Ethereal tones for transcendence",
        sound_file: None,
        image_file: None,
        is_premium: true,
        icon: AmbianceIcon::Cosmic,
    },
    Ambiance {
        id: "zen",
        name: "Zen Garden",
        description: "Subtle chimes and wind",
        sound_file: None,
        image_file: None,
        is_premium: true,
        icon: AmbianceIcon::Zen,
    },
    Ambiance {
        id: "fire",
        name: "Fire Crackle",
        description: "Warm, comforting hearth sounds",
        sound_file: None,
        image_file: None,
        is_premium: false,
        icon: AmbianceIcon::Fire,
    },
];
