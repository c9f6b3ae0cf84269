use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

pub const MIN_TICK_INTERVAL_MS: u64 = 50;
pub const MAX_TICK_INTERVAL_MS: u64 = 300;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BadgeSize {
    Small,
    Medium,
    Large,
}

impl Default for BadgeSize {
    fn default() -> Self {
        BadgeSize::Medium
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PredictionMode {
    /// Candidates inside a cone ahead of the moving pointer.
    Trajectory,
    /// Candidates within a radius of the pointer, regardless of heading.
    Proximity,
}

impl Default for PredictionMode {
    fn default() -> Self {
        PredictionMode::Trajectory
    }
}

/// User-facing settings. Unknown or missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HintSettings {
    /// Largest angle in degrees between the heading and a predicted target.
    pub cone_angle: f64,
    pub max_distance: f64,
    pub top_k: usize,
    /// Hysteresis window in milliseconds.
    pub hysteresis: u64,
    pub risk_confirmation: bool,
    pub badge_size: BadgeSize,
    pub tick_interval_ms: u64,
    pub prediction_mode: PredictionMode,
    pub proximity_radius: f64,
    pub voice_enabled: bool,
}

impl Default for HintSettings {
    fn default() -> Self {
        Self {
            cone_angle: 40.0,
            max_distance: 600.0,
            top_k: 6,
            hysteresis: 800,
            risk_confirmation: true,
            badge_size: BadgeSize::Medium,
            tick_interval_ms: 300,
            prediction_mode: PredictionMode::Trajectory,
            proximity_radius: 200.0,
            voice_enabled: false,
        }
    }
}

impl HintSettings {
    pub fn validate(&self) -> Result<()> {
        if !(10.0..=180.0).contains(&self.cone_angle) {
            bail!("coneAngle must be within 10..=180 degrees, got {}", self.cone_angle);
        }
        if !(self.max_distance.is_finite() && self.max_distance > 0.0) {
            bail!("maxDistance must be positive, got {}", self.max_distance);
        }
        if !(1..=9).contains(&self.top_k) {
            bail!("topK must be within 1..=9, got {}", self.top_k);
        }
        if !(self.proximity_radius.is_finite() && self.proximity_radius > 0.0) {
            bail!("proximityRadius must be positive, got {}", self.proximity_radius);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(
            self.tick_interval_ms
                .clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS),
        )
    }

    pub fn hysteresis_window(&self) -> Duration {
        Duration::from_millis(self.hysteresis)
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<HintSettings>,
}

impl SettingsStore {
    /// Load from `path`. A missing, unreadable-as-JSON or invalid file
    /// yields defaults; only I/O errors on an existing file fail.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            parse_or_default(&contents)
        } else {
            HintSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> HintSettings {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update(&self, settings: HintSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: HintSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        data.validate()?;
        *self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = data;
        Ok(())
    }

    fn persist(&self, data: &HintSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

fn parse_or_default(contents: &str) -> HintSettings {
    match serde_json::from_str::<HintSettings>(contents) {
        Ok(settings) if settings.validate().is_ok() => settings,
        Ok(_) => {
            log::warn!("settings file holds out-of-range values, using defaults");
            HintSettings::default()
        }
        Err(err) => {
            log::warn!("settings file unreadable ({}), using defaults", err);
            HintSettings::default()
        }
    }
}
