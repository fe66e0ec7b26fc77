use anyhow::{bail, Result};
use serde::Serialize;

/// A breathing rhythm, durations in whole seconds.
///
/// `hold` and `hold_after_exhale` may be zero, in which case the phase is
/// skipped. `inhale` and `exhale` are always positive; the durations are
/// private so that [`BreathingPattern::new`] is the only way to set them.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BreathingPattern {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub display: &'static str,
    inhale: u64,
    hold: u64,
    exhale: u64,
    hold_after_exhale: u64,
    pub is_premium: bool,
}

impl BreathingPattern {
    /// Build a pattern outside the built-in catalog.
    pub fn new(
        id: &'static str,
        inhale: u64,
        hold: u64,
        exhale: u64,
        hold_after_exhale: u64,
    ) -> Result<Self> {
        if inhale == 0 || exhale == 0 {
            bail!("pattern '{id}' needs a non-zero inhale and exhale");
        }

        Ok(Self {
            id,
            name: id,
            description: "",
            display: "",
            inhale,
            hold,
            exhale,
            hold_after_exhale,
            is_premium: false,
        })
    }

    pub fn inhale(&self) -> u64 {
        self.inhale
    }

    pub fn hold(&self) -> u64 {
        self.hold
    }

    pub fn exhale(&self) -> u64 {
        self.exhale
    }

    pub fn hold_after_exhale(&self) -> u64 {
        self.hold_after_exhale
    }

    pub fn cycle_secs(&self) -> u64 {
        self.inhale + self.hold + self.exhale + self.hold_after_exhale
    }

    pub fn breaths_per_minute(&self) -> f64 {
        60.0 / self.cycle_secs() as f64
    }
}

pub(super) static PATTERNS: [BreathingPattern; 6] = [
    BreathingPattern {
        id: "478",
        name: "4-7-8 Breathing",
        description: "Deep relaxation · 4-7-8 rhythm",
        display: "4-7-8",
        inhale: 4,
        hold: 7,
        exhale: 8,
        hold_after_exhale: 0,
        is_premium: false,
    },
    BreathingPattern {
        id: "box",
        name: "Box Breathing",
        description: "Focus & balance · 4-4-4-4",
        display: "4-4-4-4",
        inhale: 4,
        hold: 4,
        exhale: 4,
        hold_after_exhale: 4,
        is_premium: false,
    },
    BreathingPattern {
        id: "relax",
        name: "Relax Breathing",
        description: "Calming pattern · 4-4-6",
        display: "4-4-6",
        inhale: 4,
        hold: 4,
        exhale: 6,
        hold_after_exhale: 0,
        is_premium: false,
    },
    BreathingPattern {
        id: "calm",
        name: "Calm Breathing",
        description: "Gentle rhythm · 3-3-3",
        display: "3-3-3",
        inhale: 3,
        hold: 3,
        exhale: 3,
        hold_after_exhale: 0,
        is_premium: false,
    },
    BreathingPattern {
        id: "focus",
        name: "Focus Breathing",
        description: "Clarity & attention · 5-5-5",
        display: "5-5-5",
        inhale: 5,
        hold: 5,
        exhale: 5,
        hold_after_exhale: 0,
        is_premium: false,
    },
    BreathingPattern {
        id: "sleep",
        name: "Sleep Breathing",
        description: "Slow soothing · 4-7-8 (slow mode)",
        display: "4-7-8",
        inhale: 4,
        hold: 7,
        exhale: 8,
        hold_after_exhale: 0,
        is_premium: true,
    },
];
