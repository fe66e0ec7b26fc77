//! Built-in breathing patterns and ambiances.
//!
//! Lookups never fail: an absent or unknown pattern id resolves to the first
//! pattern, an absent or unknown ambiance id resolves to the default ambiance.

mod ambiances;
mod patterns;

pub use ambiances::{Ambiance, AmbianceIcon, SoundAsset};
pub use patterns::BreathingPattern;

use ambiances::AMBIANCES;
use patterns::PATTERNS;

use log::debug;

pub const DEFAULT_AMBIANCE_ID: &str = "ocean";

pub fn patterns() -> &'static [BreathingPattern] {
    &PATTERNS
}

pub fn ambiances() -> &'static [Ambiance] {
    &AMBIANCES
}

pub fn find_pattern(id: &str) -> Option<&'static BreathingPattern> {
    PATTERNS.iter().find(|pattern| pattern.id == id)
}

pub fn find_ambiance(id: &str) -> Option<&'static Ambiance> {
    AMBIANCES.iter().find(|ambiance| ambiance.id == id)
}

/// Resolve a pattern id, substituting the first catalog pattern when the id
/// is absent or unknown.
pub fn pattern_or_default(id: Option<&str>) -> &'static BreathingPattern {
    match id.and_then(find_pattern) {
        Some(pattern) => pattern,
        None => {
            if let Some(id) = id {
                debug!("unknown pattern '{}', falling back to '{}'", id, PATTERNS[0].id);
            }
            &PATTERNS[0]
        }
    }
}

pub fn ambiance_or_default(id: Option<&str>) -> &'static Ambiance {
    match id.and_then(find_ambiance) {
        Some(ambiance) => ambiance,
        None => {
            if let Some(id) = id {
                debug!("unknown ambiance '{}', falling back to '{}'", id, DEFAULT_AMBIANCE_ID);
            }
            default_ambiance()
        }
    }
}

fn default_ambiance() -> &'static Ambiance {
    find_ambiance(DEFAULT_AMBIANCE_ID).unwrap_or(&AMBIANCES[0])
}

/// Patterns a user may pick given their premium status.
pub fn available_patterns(is_premium: bool) -> Vec<&'static BreathingPattern> {
    PATTERNS
        .iter()
        .filter(|pattern| is_premium || !pattern.is_premium)
        .collect()
}

pub fn available_ambiances(is_premium: bool) -> Vec<&'static Ambiance> {
    AMBIANCES
        .iter()
        .filter(|ambiance| is_premium || !ambiance.is_premium)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn unknown_pattern_falls_back_to_first() {
        let pattern = pattern_or_default(Some("xyz"));
        assert_eq!(pattern.id, "478");
        assert_eq!(pattern, &patterns()[0]);
    }

    #[test]
    fn absent_pattern_falls_back_to_first() {
        assert_eq!(pattern_or_default(None).id, "478");
    }

    #[test]
    fn known_pattern_is_returned() {
        let pattern = pattern_or_default(Some("box"));
        assert_eq!(
            (pattern.inhale(), pattern.hold(), pattern.exhale(), pattern.hold_after_exhale()),
            (4, 4, 4, 4)
        );
        assert_eq!(pattern.cycle_secs(), 16);
    }

    #[test]
    fn catalog_patterns_breathe() {
        for pattern in patterns() {
            assert!(pattern.inhale() > 0, "{} has no inhale", pattern.id);
            assert!(pattern.exhale() > 0, "{} has no exhale", pattern.id);
        }
    }

    #[test]
    fn pattern_without_exhale_is_rejected() {
        assert!(BreathingPattern::new("bad", 4, 4, 0, 0).is_err());
        assert!(BreathingPattern::new("bad", 0, 4, 4, 0).is_err());
        assert!(BreathingPattern::new("ok", 4, 0, 4, 0).is_ok());
    }

    #[test]
    fn breaths_per_minute_follow_cycle_length() {
        let pattern = BreathingPattern::new("even", 3, 0, 3, 0).unwrap();
        assert!((pattern.breaths_per_minute() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn only_rain_has_a_sound() {
        let root = Path::new("assets");
        let rain = ambiance_or_default(Some("rain"));
        assert_eq!(
            rain.sound_asset(root).map(|asset| asset.path),
            Some(root.join("sounds/rainandthunder.wav"))
        );
        assert!(rain.image_path(root).is_some());

        for ambiance in ambiances().iter().filter(|a| a.id != "rain") {
            assert!(!ambiance.has_sound(), "{} should be silent", ambiance.id);
        }
    }

    #[test]
    fn unknown_ambiance_falls_back_to_ocean() {
        assert_eq!(ambiance_or_default(Some("volcano")).id, DEFAULT_AMBIANCE_ID);
        assert_eq!(ambiance_or_default(None).id, DEFAULT_AMBIANCE_ID);
    }

    #[test]
    fn premium_items_are_hidden_from_free_users() {
        let free: Vec<_> = available_patterns(false).iter().map(|p| p.id).collect();
        assert!(!free.contains(&"sleep"));
        assert_eq!(available_patterns(true).len(), patterns().len());

        let free_ambiances: Vec<_> = available_ambiances(false).iter().map(|a| a.id).collect();
        assert_eq!(free_ambiances, vec!["rain", "forest", "ocean", "fire"]);
    }
}
