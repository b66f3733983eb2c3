//! Runtime settings
//!
//! Loaded from an optional JSON file next to the binary. Anything that used to
//! be a process-wide toggle (debug bounding boxes) is carried here and passed
//! explicitly into collision and draw calls.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particle capacity of a bullet trail emitter
    pub fn trail_capacity(&self) -> usize {
        match self {
            QualityPreset::Low => 32,
            QualityPreset::Medium => 96,
            QualityPreset::High => 128,
        }
    }

    /// Particle capacity of a unit explosion emitter
    pub fn explosion_capacity(&self) -> usize {
        match self {
            QualityPreset::Low => 48,
            QualityPreset::Medium => 128,
            QualityPreset::High => 256,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle quality preset
    pub quality: QualityPreset,

    // === Effects ===
    /// Bullet trails
    pub trails: bool,
    /// Explosion particles on unit destruction
    pub explosions: bool,

    // === Collision policy ===
    /// Bullets of opposing owners destroy each other on contact
    pub bullet_clash: bool,
    /// Bullets from the same owner also destroy each other
    pub same_owner_collides: bool,

    // === Debug ===
    /// Report world-space bounding boxes for visualization
    pub debug_boxes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            trails: true,
            explosions: true,
            bullet_clash: true,
            same_owner_collides: false,
            debug_boxes: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Effective trail capacity (0 disables trails)
    pub fn trail_capacity(&self) -> usize {
        if self.trails {
            self.quality.trail_capacity()
        } else {
            0
        }
    }

    /// Effective explosion capacity (0 disables explosions)
    pub fn explosion_capacity(&self) -> usize {
        if self.explosions {
            self.quality.explosion_capacity()
        } else {
            0
        }
    }
}
