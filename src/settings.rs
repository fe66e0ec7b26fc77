use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard},
};

use crate::{
    catalog::DEFAULT_AMBIANCE_ID,
    session::{PreferenceSource, StatsSink},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PracticeStats {
    pub streak: u32,
    /// `YYYY-MM-DD` of the last day the streak was bumped.
    pub last_streak_date: Option<String>,
    pub total_sessions: u64,
    pub total_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub practice_duration: u32,
    pub selected_pattern_id: Option<String>,
    pub default_ambiance: String,
    pub is_premium: bool,
    pub stats: PracticeStats,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            practice_duration: 1,
            selected_pattern_id: None,
            default_ambiance: DEFAULT_AMBIANCE_ID.into(),
            is_premium: false,
            stats: PracticeStats::default(),
        }
    }
}

/// JSON-file backed preferences and stats. Every mutation is written through.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings at {}: {}", path.display(), err);
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn settings(&self) -> UserSettings {
        self.read().clone()
    }

    pub fn stats(&self) -> PracticeStats {
        self.read().stats.clone()
    }

    pub fn set_practice_duration(&self, minutes: u32) -> Result<()> {
        self.update(|data| data.practice_duration = minutes.max(1))
    }

    pub fn set_selected_pattern(&self, pattern_id: &str) -> Result<()> {
        self.update(|data| data.selected_pattern_id = Some(pattern_id.to_string()))
    }

    pub fn set_default_ambiance(&self, ambiance_id: &str) -> Result<()> {
        self.update(|data| data.default_ambiance = ambiance_id.to_string())
    }

    pub fn set_premium(&self, premium: bool) -> Result<()> {
        self.update(|data| data.is_premium = premium)
    }

    pub fn reset_streak(&self) -> Result<()> {
        self.update(|data| {
            data.stats.streak = 0;
            data.stats.last_streak_date = None;
        })
    }

    /// Bump the streak unless it was already bumped on `today`.
    pub fn increment_streak_on(&self, today: NaiveDate) -> Result<()> {
        let today = today.format("%Y-%m-%d").to_string();
        self.update(|data| {
            if data.stats.last_streak_date.as_deref() != Some(today.as_str()) {
                data.stats.streak += 1;
                data.stats.last_streak_date = Some(today);
            }
        })
    }

    fn update(&self, apply: impl FnOnce(&mut UserSettings)) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

impl PreferenceSource for SettingsStore {
    fn practice_duration_minutes(&self) -> u32 {
        self.read().practice_duration
    }

    fn selected_pattern_id(&self) -> Option<String> {
        self.read().selected_pattern_id.clone()
    }

    fn default_ambiance(&self) -> String {
        self.read().default_ambiance.clone()
    }

    fn is_premium(&self) -> bool {
        self.read().is_premium
    }
}

impl StatsSink for SettingsStore {
    fn add_session(&self, minutes: u64) -> Result<()> {
        self.update(|data| {
            data.stats.total_sessions += 1;
            data.stats.total_minutes += minutes;
        })
    }

    fn increment_streak(&self) -> Result<()> {
        self.increment_streak_on(Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_file_is_missing() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        assert_eq!(store.practice_duration_minutes(), 1);
        assert_eq!(store.default_ambiance(), "ocean");
        assert_eq!(store.selected_pattern_id(), None);
        assert!(!store.is_premium());
    }

    #[test]
    fn changes_survive_a_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        {
            let store = SettingsStore::new(path.clone()).unwrap();
            store.set_practice_duration(5).unwrap();
            store.set_selected_pattern("box").unwrap();
            store.set_default_ambiance("rain").unwrap();
            store.add_session(5).unwrap();
        }

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.practice_duration_minutes(), 5);
        assert_eq!(store.selected_pattern_id().as_deref(), Some("box"));
        assert_eq!(store.default_ambiance(), "rain");
        assert_eq!(store.stats().total_sessions, 1);
        assert_eq!(store.stats().total_minutes, 5);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.settings(), UserSettings::default());
    }

    #[test]
    fn partial_file_keeps_missing_fields_at_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "practiceDuration": 3 }"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.practice_duration_minutes(), 3);
        assert_eq!(store.default_ambiance(), "ocean");
    }

    #[test]
    fn streak_bumps_once_per_day() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let tuesday = monday.succ_opt().unwrap();

        store.increment_streak_on(monday).unwrap();
        store.increment_streak_on(monday).unwrap();
        assert_eq!(store.stats().streak, 1);
        assert_eq!(store.stats().last_streak_date.as_deref(), Some("2026-10-12"));

        store.increment_streak_on(tuesday).unwrap();
        assert_eq!(store.stats().streak, 2);

        store.reset_streak().unwrap();
        assert_eq!(store.stats(), PracticeStats::default());
    }

    #[test]
    fn practice_duration_has_a_floor() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        store.set_practice_duration(0).unwrap();
        assert_eq!(store.practice_duration_minutes(), 1);
        store.set_premium(true).unwrap();
        assert!(store.is_premium());
    }
}
