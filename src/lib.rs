//! Squadron - combat simulation core for a 3D arcade shooter
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (pools, movement, collisions, combat, particles)
//! - `renderer`: Billboard instance data handed to an external renderer
//! - `assets`: Registry of model bounding boxes and texture handles
//! - `settings`: Runtime configuration
//! - `tuning`: Data-driven level parameters

pub mod assets;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use assets::{AssetError, AssetRegistry, BoxExtents, ModelId, TextureId};
pub use settings::{QualityPreset, Settings, SettingsError};
pub use tuning::LevelParameters;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate. Bullet speeds are expressed per tick.
    pub const TICK_RATE: f32 = 60.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playfield Z range; bullets and falling units leave the field past these
    pub const FRAME_TOP: f32 = -60.0;
    pub const FRAME_BOTTOM: f32 = 60.0;

    /// Unit footprint and formation spacing (world units)
    pub const UNIT_WIDTH: f32 = 6.0;
    pub const UNIT_HEIGHT: f32 = 6.0;
    pub const UNIT_SPACE_HORIZONTAL: f32 = 3.0;
    pub const UNIT_SPACE_VERTICAL: f32 = 6.0;

    pub const UNIT_HEALTH: u8 = 100;
    pub const UNIT_ENERGY: u8 = 100;
    pub const PLAYER_HEALTH: u8 = 100;
    pub const PLAYER_ENERGY: u8 = 100;

    /// Seconds a hit keeps the target flashing
    pub const HIT_FLASH_TIME: f64 = 0.1;
    /// Seconds the health/energy bars stay visible after a hit
    pub const STATE_BAR_TIME: f64 = 1.0;

    /// Score impact of a hit, a miss and a shot
    pub const HIT_COST: i32 = 1;
    pub const MISS_COST: i32 = 1;
    pub const SHOOT_COST: i32 = 2;

    /// Oscillation step range drawn on every direction flip
    pub const MOVEMENT_STEP_MIN: f32 = 0.01;
    pub const MOVEMENT_STEP_MAX: f32 = 0.05;
    pub const MOVEMENT_BOUND: f32 = 1.0;

    /// Player kinematics
    pub const PLAYER_MAX_X: f32 = 20.0;
    pub const PLAYER_MAX_Z: f32 = 20.0;
    pub const PLAYER_OFFSET_Z: f32 = 30.0;

    /// Maximum entries per pool
    pub const POOL_CAPACITY: usize = u16::MAX as usize;
}

/// Move `value` toward zero by `step` without crossing it
#[inline]
pub fn approach_zero(value: f32, step: f32) -> f32 {
    if value > 0.0 {
        (value - step).max(0.0)
    } else if value < 0.0 {
        (value + step).min(0.0)
    } else {
        0.0
    }
}
