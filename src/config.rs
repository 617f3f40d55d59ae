//! Persisted user settings, kept as JSON in the OS config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::calendar::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::workload::AllocatorConfig;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub zoom: u32,
    pub daily_capacity_hours: f64,
    pub working_days_per_week: u32,
    pub default_estimate_minutes: u32,
    /// Snapshot reopened on startup.
    pub last_snapshot: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let allocator = AllocatorConfig::default();
        Self {
            zoom: DEFAULT_ZOOM,
            daily_capacity_hours: allocator.daily_capacity_hours,
            working_days_per_week: allocator.working_days_per_week,
            default_estimate_minutes: allocator.default_estimate_minutes,
            last_snapshot: None,
        }
    }
}

impl Settings {
    /// Application directory under the platform config root.
    pub fn config_dir() -> Result<PathBuf> {
        directories::ProjectDirs::from("", "", "ShopTimeline")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(Error::NoConfigDir)
    }

    /// Settings from the default location. Anything unreadable falls back
    /// to defaults.
    pub fn load() -> Self {
        match Self::config_dir() {
            Ok(dir) => Self::load_or_default(&dir.join(SETTINGS_FILE)),
            Err(e) => {
                warn!(error = %e, "using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir()?.join(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str::<Self>(&json)?.sanitized())
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file yet");
            return Self::default();
        }
        Self::load_from(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "failed to load settings, using defaults");
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn allocator_config(&self) -> AllocatorConfig {
        AllocatorConfig {
            daily_capacity_hours: self.daily_capacity_hours,
            working_days_per_week: self.working_days_per_week,
            default_estimate_minutes: self.default_estimate_minutes,
        }
    }

    /// Pull hand-edited values back into range.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if !self.daily_capacity_hours.is_finite() || self.daily_capacity_hours <= 0.0 {
            self.daily_capacity_hours = defaults.daily_capacity_hours;
        }
        self.working_days_per_week = self.working_days_per_week.clamp(1, 7);
        self
    }
}
