//! Game state and events
//!
//! Everything the frame step reads or mutates lives in `GameState`. All
//! randomness is drawn from the one seeded generator held here.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bounds::Aabb;
use super::bullet::{AreaFrame, BulletPool, Owner, new_bullet_pool};
use super::collision::CollisionPolicy;
use super::combat::{GameStats, StatSnapshot};
use super::player::Player;
use super::unit::{UnitId, UnitPool, new_unit_pool, spawn_unit_formation};
use crate::assets::{AssetError, AssetRegistry};
use crate::renderer::{BillboardBatch, Camera};
use crate::settings::Settings;
use crate::tuning::LevelParameters;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    /// The player was destroyed
    GameOver,
}

/// Things that happened during the last tick, for audio and HUD hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    BulletFired { owner: Owner },
    UnitHit { unit: UnitId },
    UnitDestroyed { unit: UnitId },
    PlayerHit,
    PlayerDestroyed,
    BulletsClashed,
    /// A player bullet left the field without hitting anything
    Missed,
    LevelStarted { level: u16 },
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation clock in seconds
    pub time: f64,
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub level: LevelParameters,
    pub settings: Settings,
    pub frame: AreaFrame,
    pub player: Player,
    pub bullets: BulletPool,
    pub units: UnitPool,
    pub stats: GameStats,
    /// Events from the last tick
    pub events: Vec<GameEvent>,
    /// World boxes tested by the last collision pass (debug overlay)
    pub debug_boxes: Vec<Aabb>,
    unit_half: Vec3,
}

impl GameState {
    /// Start a run at the first level
    pub fn new(assets: &AssetRegistry, settings: Settings, seed: u64) -> Result<Self, AssetError> {
        Self::with_level(assets, settings, seed, LevelParameters::first())
    }

    /// Start a run at the given level.
    ///
    /// Fails when the level references a model or effect texture the registry
    /// does not have.
    pub fn with_level(
        assets: &AssetRegistry,
        settings: Settings,
        seed: u64,
        level: LevelParameters,
    ) -> Result<Self, AssetError> {
        assets.require_effect_textures()?;
        let player_half = assets.model_box(level.player.model)?.half();
        let unit_half = assets.model_box(level.units.model)?.half();

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            level,
            settings,
            frame: AreaFrame::default(),
            player: Player::new(level.player.model, player_half, 0.0),
            bullets: new_bullet_pool(),
            units: new_unit_pool(),
            stats: GameStats::new(),
            events: Vec::new(),
            debug_boxes: Vec::new(),
            unit_half,
        };
        state.spawn_formation();
        Ok(state)
    }

    /// Replace the current level with one from the level provider
    pub fn start_level(&mut self, assets: &AssetRegistry, level: LevelParameters) -> Result<(), AssetError> {
        self.unit_half = assets.model_box(level.units.model)?.half();
        self.player.half = assets.model_box(level.player.model)?.half();
        self.player.model = level.player.model;
        self.level = LevelParameters {
            label_started_at: self.time,
            ..level
        };
        self.units.clear();
        self.spawn_formation();
        Ok(())
    }

    /// Move on to the next level once the formation is gone
    pub fn advance_level(&mut self) {
        self.level = self.level.next(self.time);
        self.spawn_formation();
    }

    fn spawn_formation(&mut self) {
        spawn_unit_formation(
            &mut self.units,
            &self.level.units,
            self.unit_half,
            self.time,
            self.settings.explosion_capacity(),
            &mut self.rng,
        );
        log::info!("Level {} started", self.level.level + 1);
        self.events.push(GameEvent::LevelStarted {
            level: self.level.level,
        });
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        CollisionPolicy::from(&self.settings)
    }

    /// Hit/miss/score counters for the HUD
    pub fn snapshot(&self) -> StatSnapshot {
        self.stats.snapshot()
    }

    /// Level label opacity
    pub fn label_alpha(&self) -> f32 {
        self.level.label_alpha(self.time)
    }

    /// Collect every particle billboard for this frame
    pub fn draw_particles(&self, camera: &Camera, batch: &mut BillboardBatch) {
        for bullet in self.bullets.iter() {
            bullet.trail.draw(camera, batch);
        }
        for unit in self.units.iter() {
            unit.explosion.draw(camera, batch);
        }
    }
}
