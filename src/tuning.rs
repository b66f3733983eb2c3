//! Data-driven level parameters
//!
//! Levels are plain values. Each level scales the previous one by a fixed step
//! and the sequence wraps back to the first level after `LEVELS_COUNT`.

use serde::{Deserialize, Serialize};

use crate::assets::ModelId;
use crate::sim::combat::Damage;

/// Per-level multiplicative step
pub const LEVEL_PARAMS_STEP: f32 = 0.05;
/// Number of distinct levels before wrapping
pub const LEVELS_COUNT: u16 = 10;
/// Seconds the level label stays on screen
pub const LEVEL_LABEL_DURATION: f64 = 5.0;

/// Firing parameters shared by the player and enemy units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireParameters {
    /// Per-tick speed gain of a fired bullet
    pub bullet_acceleration: f32,
    /// Initial per-tick speed of a fired bullet
    pub bullet_init_speed: f32,
    /// Seconds between shots
    pub bullet_delay_spawn: f32,
    pub damage_life: f32,
    pub damage_energy: f32,
}

impl FireParameters {
    /// Damage packet carried by bullets, rounded into the 8-bit range
    pub fn damage(&self) -> Damage {
        Damage::new(to_u8(self.damage_life), to_u8(self.damage_energy))
    }

    fn scaled(self, up: f32, down: f32) -> Self {
        Self {
            bullet_acceleration: self.bullet_acceleration * up,
            bullet_init_speed: self.bullet_init_speed * up,
            bullet_delay_spawn: self.bullet_delay_spawn * down,
            damage_life: self.damage_life * up,
            damage_energy: self.damage_energy * up,
        }
    }
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, u8::MAX as f32) as u8
}

/// Enemy formation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitParameters {
    pub fire: FireParameters,
    pub count: u16,
    pub model: ModelId,
    pub max_col: u8,
    pub max_ln: u8,
    /// Z of the first formation line
    pub z_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerParameters {
    pub fire: FireParameters,
    pub model: ModelId,
}

/// A game level and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelParameters {
    pub level: u16,
    /// Simulation time when the level label started displaying
    pub label_started_at: f64,
    pub units: UnitParameters,
    pub player: PlayerParameters,
}

impl LevelParameters {
    /// First level of a run
    pub fn first() -> Self {
        Self {
            level: 0,
            label_started_at: 0.0,
            units: UnitParameters {
                fire: FireParameters {
                    bullet_acceleration: 0.005,
                    bullet_init_speed: 0.8,
                    bullet_delay_spawn: 1.2,
                    damage_life: 5.0,
                    damage_energy: 10.0,
                },
                count: 20,
                model: ModelId::InterstellarRunner,
                max_col: 10,
                max_ln: 2,
                z_offset: 40.0,
            },
            player: PlayerParameters {
                fire: FireParameters {
                    bullet_acceleration: 0.01,
                    bullet_init_speed: 2.0,
                    bullet_delay_spawn: 0.2,
                    damage_life: 20.0,
                    damage_energy: 10.0,
                },
                model: ModelId::Transtellar,
            },
        }
    }

    /// Advance to the next level, making everything a step harder.
    ///
    /// Wraps back to the first level after the last one.
    pub fn next(&self, now: f64) -> Self {
        if self.level + 1 >= LEVELS_COUNT {
            return Self {
                label_started_at: now,
                ..Self::first()
            };
        }
        let up = 1.0 + LEVEL_PARAMS_STEP;
        let down = 1.0 - LEVEL_PARAMS_STEP;
        Self {
            level: self.level + 1,
            label_started_at: now,
            units: UnitParameters {
                fire: self.units.fire.scaled(up, down),
                ..self.units
            },
            player: PlayerParameters {
                fire: self.player.fire.scaled(up, down),
                ..self.player
            },
        }
    }

    /// Label opacity in [0, 1]; zero once the label duration has passed
    pub fn label_alpha(&self, now: f64) -> f32 {
        let elapsed = now - self.label_started_at;
        if !(0.0..LEVEL_LABEL_DURATION).contains(&elapsed) {
            return 0.0;
        }
        (1.0 - elapsed / LEVEL_LABEL_DURATION).clamp(0.0, 1.0) as f32
    }
}

impl Default for LevelParameters {
    fn default() -> Self {
        Self::first()
    }
}
