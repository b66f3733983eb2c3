//! Asset registry
//!
//! Geometry and textures are loaded elsewhere. The simulation only needs the
//! bounding box of each ship model and a way to check that texture handles
//! exist before entities start referencing them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ship models the level provider may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    CamoStellarJet,
    DualStriker,
    GalactixRacer,
    InterstellarRunner,
    MeteorSlicer,
    RedFighter,
    StarMarineTrooper,
    Transtellar,
    UltravioletIntruder,
    Warship,
}

impl ModelId {
    pub const ALL: [ModelId; 10] = [
        ModelId::CamoStellarJet,
        ModelId::DualStriker,
        ModelId::GalactixRacer,
        ModelId::InterstellarRunner,
        ModelId::MeteorSlicer,
        ModelId::RedFighter,
        ModelId::StarMarineTrooper,
        ModelId::Transtellar,
        ModelId::UltravioletIntruder,
        ModelId::Warship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::CamoStellarJet => "CamoStellarJet",
            ModelId::DualStriker => "DualStriker",
            ModelId::GalactixRacer => "GalactixRacer",
            ModelId::InterstellarRunner => "InterstellarRunner",
            ModelId::MeteorSlicer => "MeteorSlicer",
            ModelId::RedFighter => "RedFighter",
            ModelId::StarMarineTrooper => "StarMarineTrooper",
            ModelId::Transtellar => "Transtellar",
            ModelId::UltravioletIntruder => "UltravioletIntruder",
            ModelId::Warship => "Warship",
        }
    }
}

/// Particle and sprite textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureId {
    FireSoft,
    FireStreak,
    Glow,
    SmokeSoft,
    ExplosionA,
    ExplosionB,
}

/// Full size of a model's mesh bounding box along each axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxExtents {
    pub by_x: f32,
    pub by_y: f32,
    pub by_z: f32,
}

impl BoxExtents {
    pub const fn new(by_x: f32, by_y: f32, by_z: f32) -> Self {
        Self { by_x, by_y, by_z }
    }

    /// Half-extents as a vector, centred on the model origin
    pub fn half(&self) -> glam::Vec3 {
        glam::Vec3::new(self.by_x, self.by_y, self.by_z) * 0.5
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("model {} is not registered", .0.as_str())]
    MissingModel(ModelId),
    #[error("texture {0:?} is not registered")]
    MissingTexture(TextureId),
}

/// Registry populated by the asset loader after initialization
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    models: HashMap<ModelId, BoxExtents>,
    textures: HashMap<TextureId, u32>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_model(&mut self, id: ModelId, extents: BoxExtents) {
        self.models.insert(id, extents);
    }

    /// Register a texture with the renderer's opaque handle for it
    pub fn register_texture(&mut self, id: TextureId, handle: u32) {
        self.textures.insert(id, handle);
    }

    pub fn model_box(&self, id: ModelId) -> Result<BoxExtents, AssetError> {
        self.models
            .get(&id)
            .copied()
            .ok_or(AssetError::MissingModel(id))
    }

    pub fn texture(&self, id: TextureId) -> Result<u32, AssetError> {
        self.textures
            .get(&id)
            .copied()
            .ok_or(AssetError::MissingTexture(id))
    }

    /// Check every texture the particle and sprite effects draw with
    pub fn require_effect_textures(&self) -> Result<(), AssetError> {
        for id in [
            TextureId::FireSoft,
            TextureId::Glow,
            TextureId::SmokeSoft,
            TextureId::ExplosionA,
        ] {
            self.texture(id)?;
        }
        Ok(())
    }

    /// Registry with every model and effect texture present.
    ///
    /// Extents approximate the shipped meshes; useful for headless runs and tests.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for id in ModelId::ALL {
            let extents = match id {
                ModelId::Warship => BoxExtents::new(8.0, 2.5, 9.0),
                ModelId::Transtellar => BoxExtents::new(5.0, 1.5, 5.5),
                _ => BoxExtents::new(5.0, 1.5, 4.5),
            };
            registry.register_model(id, extents);
        }
        for (handle, id) in [
            TextureId::FireSoft,
            TextureId::FireStreak,
            TextureId::Glow,
            TextureId::SmokeSoft,
            TextureId::ExplosionA,
            TextureId::ExplosionB,
        ]
        .into_iter()
        .enumerate()
        {
            registry.register_texture(id, handle as u32);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_an_error() {
        let registry = AssetRegistry::new();
        assert_eq!(
            registry.model_box(ModelId::Warship),
            Err(AssetError::MissingModel(ModelId::Warship))
        );
        let msg = AssetError::MissingModel(ModelId::Warship).to_string();
        assert!(msg.contains("Warship"));
    }

    #[test]
    fn test_defaults_cover_effects() {
        let registry = AssetRegistry::with_defaults();
        assert!(registry.require_effect_textures().is_ok());
        for id in ModelId::ALL {
            assert!(registry.model_box(id).is_ok());
        }
    }

    #[test]
    fn test_missing_effect_texture_reported() {
        let mut registry = AssetRegistry::new();
        registry.register_texture(TextureId::FireSoft, 0);
        assert_eq!(
            registry.require_effect_textures(),
            Err(AssetError::MissingTexture(TextureId::Glow))
        );
    }
}
