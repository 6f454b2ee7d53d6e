use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::capture::{CaptureConstraints, FacingMode};
use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraSettings {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub jpeg_quality: u8,
}

impl Default for CameraSettings {
    fn default() -> Self {
        let constraints = CaptureConstraints::default();
        Self {
            facing_mode: constraints.facing_mode,
            ideal_width: constraints.ideal_width,
            ideal_height: constraints.ideal_height,
            jpeg_quality: crate::capture::controller::DEFAULT_JPEG_QUALITY,
        }
    }
}

impl CameraSettings {
    pub fn constraints(&self) -> CaptureConstraints {
        CaptureConstraints {
            facing_mode: self.facing_mode,
            ideal_width: self.ideal_width,
            ideal_height: self.ideal_height,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringSettings {
    pub par_seconds: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            par_seconds: ScoringConfig::default().par_seconds,
        }
    }
}

impl ScoringSettings {
    pub fn config(&self) -> ScoringConfig {
        ScoringConfig::with_par_seconds(self.par_seconds)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub camera: CameraSettings,
    pub scoring: ScoringSettings,
}

/// JSON-file settings, cached in memory and written back on every update.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Settings at {} unreadable ({err}); using defaults", path.display());
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> AppSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn camera(&self) -> CameraSettings {
        self.get().camera
    }

    pub fn scoring(&self) -> ScoringSettings {
        self.get().scoring
    }

    pub fn update_camera(&self, mut camera: CameraSettings) -> Result<()> {
        camera.jpeg_quality = camera.jpeg_quality.clamp(1, 100);
        self.update(|settings| settings.camera = camera)
    }

    pub fn update_scoring(&self, scoring: ScoringSettings) -> Result<()> {
        self.update(|settings| settings.scoring = scoring)
    }

    fn update(&self, apply: impl FnOnce(&mut AppSettings)) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
